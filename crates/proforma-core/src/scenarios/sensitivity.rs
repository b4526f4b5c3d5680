use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::projection::run_projection;
use crate::scenarios::adjust::{apply_named, AdjustmentTarget, NamedDelta};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, ProjectModel};
use crate::ProformaResult;

/// One-way sensitivity sweep specification. With no variations given, the
/// standard nine-point grid from -20% to +20% in 5% steps is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityInput {
    pub variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variations: Option<Vec<Percent>>,
}

pub fn default_variations() -> Vec<Percent> {
    vec![
        dec!(-20),
        dec!(-15),
        dec!(-10),
        dec!(-5),
        dec!(0),
        dec!(5),
        dec!(10),
        dec!(15),
        dec!(20),
    ]
}

/// Indicator readings for one (variable, variation) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityResult {
    pub variable: String,
    pub variation: Percent,
    pub npv: Money,
    pub irr: Option<Percent>,
}

/// One bar of the tornado chart: the NPV range a single variable spans
/// across its variations, baseline included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TornadoRow {
    pub variable: String,
    pub low_npv: Money,
    pub base_npv: Money,
    pub high_npv: Money,
    pub impact: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityOutput {
    pub base_npv: Money,
    pub results: Vec<SensitivityResult>,
    pub tornado: Vec<TornadoRow>,
}

/// Sweep each recognised variable over the variation grid, one projection per
/// point, and summarise the NPV ranges tornado-style (widest impact first).
/// Unrecognised variable names are skipped with a warning; a variation that
/// pushes the model out of its valid range is skipped the same way.
pub fn run_sensitivity(
    model: &ProjectModel,
    input: &SensitivityInput,
) -> ProformaResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let variations = input
        .variations
        .clone()
        .unwrap_or_else(default_variations);

    let base = run_projection(model)?;
    let base_npv = base.result.indicators.npv;

    let mut results: Vec<SensitivityResult> = Vec::new();
    let mut tornado: Vec<TornadoRow> = Vec::new();

    for variable in &input.variables {
        if AdjustmentTarget::parse(variable).is_none() {
            warnings.push(format!("Unknown sensitivity variable '{variable}' skipped"));
            continue;
        }

        let mut low_npv = base_npv;
        let mut high_npv = base_npv;

        for variation in &variations {
            let adjusted = apply_named(
                model,
                &[NamedDelta {
                    variable: variable.clone(),
                    delta: *variation,
                }],
            );
            let outcome = match run_projection(&adjusted) {
                Ok(out) => out,
                Err(e) => {
                    warnings.push(format!(
                        "Sensitivity run ({variable}, {variation}%) skipped: {e}"
                    ));
                    continue;
                }
            };
            let npv = outcome.result.indicators.npv;
            low_npv = low_npv.min(npv);
            high_npv = high_npv.max(npv);
            results.push(SensitivityResult {
                variable: variable.clone(),
                variation: *variation,
                npv,
                irr: outcome.result.indicators.irr,
            });
        }

        tornado.push(TornadoRow {
            variable: variable.clone(),
            low_npv,
            base_npv,
            high_npv,
            impact: (high_npv - low_npv).abs(),
        });
    }

    tornado.sort_by(|a, b| b.impact.cmp(&a.impact));

    let output = SensitivityOutput {
        base_npv,
        results,
        tornado,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-Way Sensitivity Sweep with Tornado Ranking",
        &serde_json::json!({
            "variables": input.variables,
            "variations": variations.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn model() -> ProjectModel {
        ProjectModel {
            parameters: ProjectParameters {
                construction_years: 0,
                operation_years: 4,
                discount_rate: dec!(10),
                inflation_rate: dec!(0),
                tax_rate: dec!(25),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
            investments: vec![Investment {
                category: InvestmentCategory::Machinery,
                amount: dec!(2000),
                year: 0,
                useful_life: 4,
                salvage_value: dec!(0),
                depreciation_method: DepreciationMethod::StraightLine,
                depreciation_rate: dec!(0),
            }],
            products: vec![Product {
                name: "Widget".into(),
                unit: "piece".into(),
                unit_price: dec!(10),
                price_escalation: dec!(0),
                installed_capacity: dec!(100),
                capacity_unit: "piece/yr".into(),
                production_schedule: (1..=4)
                    .map(|year| ProductionYear {
                        year,
                        capacity_utilization: dec!(100),
                        quantity: dec!(100),
                    })
                    .collect(),
            }],
            operating_costs: vec![OperatingCost {
                category: "misc".into(),
                description: "Misc".into(),
                cost_type: CostType::Fixed,
                amount: dec!(250),
                unit_cost: dec!(0),
                escalation_rate: dec!(0),
                start_year: 1,
            }],
            financings: vec![Financing {
                financing_type: FinancingType::Equity,
                name: "Sponsor".into(),
                amount: dec!(1000),
                interest_rate: dec!(0),
                term_years: 0,
                grace_period: 0,
                disbursement_year: 0,
                repayment_start_year: 1,
            }],
        }
    }

    #[test]
    fn test_sweep_shape() {
        let input = SensitivityInput {
            variables: vec!["price".into(), "costs".into()],
            variations: None,
        };
        let out = run_sensitivity(&model(), &input).unwrap();
        // 2 variables x 9 default variations
        assert_eq!(out.result.results.len(), 18);
        assert_eq!(out.result.tornado.len(), 2);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_zero_variation_matches_baseline() {
        let input = SensitivityInput {
            variables: vec!["price".into()],
            variations: Some(vec![dec!(0)]),
        };
        let out = run_sensitivity(&model(), &input).unwrap();
        assert_eq!(out.result.results[0].npv, out.result.base_npv);
    }

    #[test]
    fn test_npv_monotone_in_price() {
        let input = SensitivityInput {
            variables: vec!["price".into()],
            variations: None,
        };
        let out = run_sensitivity(&model(), &input).unwrap();
        let npvs: Vec<Money> = out.result.results.iter().map(|r| r.npv).collect();
        for pair in npvs.windows(2) {
            assert!(pair[0] <= pair[1], "NPV should rise with price");
        }
    }

    #[test]
    fn test_tornado_sorted_by_impact() {
        let input = SensitivityInput {
            // Price moves revenue (big lever); costs move a 250/yr line item
            variables: vec!["costs".into(), "price".into()],
            variations: None,
        };
        let out = run_sensitivity(&model(), &input).unwrap();
        let tornado = &out.result.tornado;
        assert_eq!(tornado[0].variable, "price");
        assert!(tornado[0].impact >= tornado[1].impact);
        for row in tornado {
            assert!(row.low_npv <= row.base_npv);
            assert!(row.base_npv <= row.high_npv);
            assert_eq!(row.impact, row.high_npv - row.low_npv);
        }
    }

    #[test]
    fn test_unknown_variable_warns_and_skips() {
        let input = SensitivityInput {
            variables: vec!["weather".into()],
            variations: None,
        };
        let out = run_sensitivity(&model(), &input).unwrap();
        assert!(out.result.results.is_empty());
        assert!(out.result.tornado.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }
}
