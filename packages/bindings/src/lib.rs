use napi::Result as NapiResult;
use napi_derive::napi;

use proforma_core::scenarios::{ScenarioDefinition, SensitivityInput};
use proforma_core::types::ProjectModel;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[napi]
pub fn run_projection(model_json: String) -> NapiResult<String> {
    let model: ProjectModel = serde_json::from_str(&model_json).map_err(to_napi_error)?;
    let output = proforma_core::projection::run_projection(&model).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_sensitivity(model_json: String, input_json: String) -> NapiResult<String> {
    let model: ProjectModel = serde_json::from_str(&model_json).map_err(to_napi_error)?;
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        proforma_core::scenarios::run_sensitivity(&model, &input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_scenarios(model_json: String, scenarios_json: String) -> NapiResult<String> {
    let model: ProjectModel = serde_json::from_str(&model_json).map_err(to_napi_error)?;
    let scenarios: Vec<ScenarioDefinition> =
        serde_json::from_str(&scenarios_json).map_err(to_napi_error)?;
    let output =
        proforma_core::scenarios::run_scenarios(&model, &scenarios).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_model(model_json: String) -> NapiResult<String> {
    let model: ProjectModel = serde_json::from_str(&model_json).map_err(to_napi_error)?;
    match proforma_core::validate::validate_model(&model) {
        Ok(warnings) => serde_json::to_string(&serde_json::json!({
            "valid": true,
            "warnings": warnings,
        }))
        .map_err(to_napi_error),
        Err(proforma_core::ProformaError::InvalidModel(problems)) => {
            serde_json::to_string(&serde_json::json!({
                "valid": false,
                "problems": problems.0,
            }))
            .map_err(to_napi_error)
        }
        Err(e) => Err(to_napi_error(e)),
    }
}
