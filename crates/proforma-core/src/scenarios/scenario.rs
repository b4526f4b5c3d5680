use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ProformaError;
use crate::projection::run_projection;
use crate::scenarios::adjust::{apply_named, NamedDelta};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, ProjectModel};
use crate::ProformaResult;

const PROBABILITY_TOLERANCE: Decimal = dec!(0.001);

/// A named what-if: a set of deltas applied on top of the base model, with an
/// optional occurrence probability (decimal fraction).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<Decimal>,
    pub adjustments: Vec<NamedDelta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub name: String,
    pub npv: Money,
    pub irr: Option<Percent>,
    pub deviation_from_base: Money,
    pub deviation_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAnalysis {
    pub base_npv: Money,
    pub results: Vec<ScenarioResult>,
    /// Present only when every scenario carries a probability and they sum
    /// to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_weighted_npv: Option<Money>,
}

/// Evaluate each scenario through the adjustment layer and the projection
/// façade, reporting NPV/IRR and the deviation from the base run. When all
/// scenarios carry probabilities they must sum to ~1.0 and a
/// probability-weighted NPV is included.
pub fn run_scenarios(
    model: &ProjectModel,
    scenarios: &[ScenarioDefinition],
) -> ProformaResult<ComputationOutput<ScenarioAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if scenarios.is_empty() {
        return Err(ProformaError::InsufficientData(
            "At least one scenario required".into(),
        ));
    }

    let probabilities: Vec<Option<Decimal>> = scenarios.iter().map(|s| s.probability).collect();
    let all_weighted = probabilities.iter().all(|p| p.is_some());
    if all_weighted {
        for (scenario, p) in scenarios.iter().zip(&probabilities) {
            let p = p.unwrap();
            if p < Decimal::ZERO || p > Decimal::ONE {
                return Err(ProformaError::InvalidInput {
                    field: format!("scenario:{}.probability", scenario.name),
                    reason: "Probability must be between 0 and 1".into(),
                });
            }
        }
        let total: Decimal = probabilities.iter().map(|p| p.unwrap()).sum();
        if (total - Decimal::ONE).abs() > PROBABILITY_TOLERANCE {
            return Err(ProformaError::InvalidInput {
                field: "probabilities".into(),
                reason: format!("Probabilities must sum to 1.0 (got {total})"),
            });
        }
    } else if probabilities.iter().any(|p| p.is_some()) {
        warnings.push(
            "Not every scenario carries a probability; weighted NPV not computed".into(),
        );
    }

    let base = run_projection(model)?;
    let base_npv = base.result.indicators.npv;

    let mut results = Vec::with_capacity(scenarios.len());
    let mut weighted_npv = Decimal::ZERO;

    for scenario in scenarios {
        let adjusted = apply_named(model, &scenario.adjustments);
        let outcome = run_projection(&adjusted)?;
        let npv = outcome.result.indicators.npv;

        let deviation = npv - base_npv;
        let deviation_pct = if base_npv.is_zero() {
            if !deviation.is_zero() {
                warnings.push(format!(
                    "Base NPV is zero; deviation percentage undefined for scenario '{}'",
                    scenario.name
                ));
            }
            Decimal::ZERO
        } else {
            deviation / base_npv * dec!(100)
        };

        if let Some(p) = scenario.probability {
            weighted_npv += p * npv;
        }

        results.push(ScenarioResult {
            name: scenario.name.clone(),
            npv,
            irr: outcome.result.indicators.irr,
            deviation_from_base: deviation,
            deviation_pct,
        });
    }

    let output = ScenarioAnalysis {
        base_npv,
        results,
        probability_weighted_npv: all_weighted.then_some(weighted_npv),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Named Scenario Evaluation",
        &serde_json::json!({
            "scenarios": scenarios.iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
            "baseNpv": base_npv.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
