use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use proforma_core::scenarios::{self, SensitivityInput};
use proforma_core::types::{Percent, ProjectModel};

use crate::input;

/// Arguments for a one-way sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a JSON file holding the model plus sweep specification
    #[arg(long)]
    pub input: Option<String>,
}

/// Wire shape: `{ "model": {...}, "variables": [...], "variations": [...] }`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensitivityRequest {
    model: ProjectModel,
    variables: Vec<String>,
    #[serde(default)]
    variations: Option<Vec<Percent>>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SensitivityRequest = input::read_request(&args.input)?;
    let result = scenarios::run_sensitivity(
        &request.model,
        &SensitivityInput {
            variables: request.variables,
            variations: request.variations,
        },
    )?;
    Ok(serde_json::to_value(result)?)
}
