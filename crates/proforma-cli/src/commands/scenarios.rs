use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use proforma_core::scenarios::{self, ScenarioDefinition};
use proforma_core::types::ProjectModel;

use crate::input;

/// Arguments for named scenario evaluation
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to a JSON file holding the model plus scenario definitions
    #[arg(long)]
    pub input: Option<String>,
}

/// Wire shape: `{ "model": {...}, "scenarios": [...] }`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenariosRequest {
    model: ProjectModel,
    scenarios: Vec<ScenarioDefinition>,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ScenariosRequest = input::read_request(&args.input)?;
    let result = scenarios::run_scenarios(&request.model, &request.scenarios)?;
    Ok(serde_json::to_value(result)?)
}
