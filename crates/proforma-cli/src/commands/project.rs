use clap::Args;
use serde_json::Value;

use proforma_core::projection::run_projection;
use proforma_core::types::ProjectModel;

use crate::input;

/// Arguments for a full project projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to a ProjectModel JSON file (or pipe it via stdin)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model: ProjectModel = input::read_request(&args.input)?;
    let result = run_projection(&model)?;
    Ok(serde_json::to_value(result)?)
}
