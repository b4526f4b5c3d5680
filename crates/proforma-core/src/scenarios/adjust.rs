use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{fraction, Percent, ProjectModel};

/// The closed set of model knobs an adjustment can turn. The stringly-typed
/// names used by callers are translated at the edge via [`AdjustmentTarget::parse`];
/// inside the engine only this enum travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentTarget {
    /// Every product's unit price
    UnitPrice,
    /// Every production-schedule row's quantity
    Quantity,
    /// Every operating cost's annual amount
    OperatingCost,
    /// Every investment's amount
    Investment,
    /// The discount rate itself (multiplicative on the rate)
    DiscountRate,
}

impl AdjustmentTarget {
    /// Map a caller-facing variable name onto a target. Unknown names map to
    /// `None` and are ignored by [`apply_named`].
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "revenue" | "price" => Some(AdjustmentTarget::UnitPrice),
            "quantity" | "sales" => Some(AdjustmentTarget::Quantity),
            "costs" | "operatingCosts" => Some(AdjustmentTarget::OperatingCost),
            "investment" => Some(AdjustmentTarget::Investment),
            "discountRate" => Some(AdjustmentTarget::DiscountRate),
            _ => None,
        }
    }
}

/// A percentage delta applied to one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub target: AdjustmentTarget,
    /// Delta in percent; +10 scales the target by 1.1
    pub delta: Percent,
}

/// A delta still carrying its caller-facing variable name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedDelta {
    pub variable: String,
    pub delta: Percent,
}

/// Apply a set of adjustments to a fresh copy of the model. The original is
/// untouched; deltas on disjoint targets compose multiplicatively and
/// independently, so application order does not matter.
pub fn apply_adjustments(model: &ProjectModel, adjustments: &[Adjustment]) -> ProjectModel {
    let mut adjusted = model.clone();

    for adjustment in adjustments {
        let multiplier = Decimal::ONE + fraction(adjustment.delta);
        match adjustment.target {
            AdjustmentTarget::UnitPrice => {
                for product in &mut adjusted.products {
                    product.unit_price *= multiplier;
                }
            }
            AdjustmentTarget::Quantity => {
                for product in &mut adjusted.products {
                    for row in &mut product.production_schedule {
                        row.quantity *= multiplier;
                    }
                }
            }
            AdjustmentTarget::OperatingCost => {
                for cost in &mut adjusted.operating_costs {
                    cost.amount *= multiplier;
                }
            }
            AdjustmentTarget::Investment => {
                for investment in &mut adjusted.investments {
                    investment.amount *= multiplier;
                }
            }
            AdjustmentTarget::DiscountRate => {
                adjusted.parameters.discount_rate *= multiplier;
            }
        }
    }

    adjusted
}

/// Apply caller-named deltas, silently dropping names the engine does not
/// recognise.
pub fn apply_named(model: &ProjectModel, deltas: &[NamedDelta]) -> ProjectModel {
    let adjustments: Vec<Adjustment> = deltas
        .iter()
        .filter_map(|d| {
            AdjustmentTarget::parse(&d.variable).map(|target| Adjustment {
                target,
                delta: d.delta,
            })
        })
        .collect();
    apply_adjustments(model, &adjustments)
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
                operation_years: 2,
                discount_rate: dec!(10),
                inflation_rate: dec!(0),
                tax_rate: dec!(25),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
            investments: vec![Investment {
                category: InvestmentCategory::Equipment,
                amount: dec!(1000),
                year: 0,
                useful_life: 4,
                salvage_value: dec!(0),
                depreciation_method: DepreciationMethod::StraightLine,
                depreciation_rate: dec!(0),
            }],
            products: vec![Product {
                name: "Widget".into(),
                unit: "piece".into(),
                unit_price: dec!(20),
                price_escalation: dec!(0),
                installed_capacity: dec!(100),
                capacity_unit: "piece/yr".into(),
                production_schedule: vec![ProductionYear {
                    year: 1,
                    capacity_utilization: dec!(50),
                    quantity: dec!(50),
                }],
            }],
            operating_costs: vec![OperatingCost {
                category: "misc".into(),
                description: "Misc".into(),
                cost_type: CostType::Fixed,
                amount: dec!(400),
                unit_cost: dec!(0),
                escalation_rate: dec!(0),
                start_year: 1,
            }],
            financings: vec![],
        }
    }

    #[test]
    fn test_price_adjustment() {
        let adjusted = apply_adjustments(
            &model(),
            &[Adjustment {
                target: AdjustmentTarget::UnitPrice,
                delta: dec!(10),
            }],
        );
        assert_eq!(adjusted.products[0].unit_price, dec!(22));
    }

    #[test]
    fn test_discount_rate_adjustment_is_multiplicative() {
        let adjusted = apply_adjustments(
            &model(),
            &[Adjustment {
                target: AdjustmentTarget::DiscountRate,
                delta: dec!(-20),
            }],
        );
        // 10% * 0.8, not 10% - 20pp
        assert_eq!(adjusted.parameters.discount_rate, dec!(8));
    }

    #[test]
    fn test_original_model_untouched() {
        let base = model();
        let _ = apply_adjustments(
            &base,
            &[Adjustment {
                target: AdjustmentTarget::Investment,
                delta: dec!(50),
            }],
        );
        assert_eq!(base.investments[0].amount, dec!(1000));
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let base = model();
        for target in [
            AdjustmentTarget::UnitPrice,
            AdjustmentTarget::Quantity,
            AdjustmentTarget::OperatingCost,
            AdjustmentTarget::Investment,
            AdjustmentTarget::DiscountRate,
        ] {
            let adjusted = apply_adjustments(
                &base,
                &[Adjustment {
                    target,
                    delta: dec!(0),
                }],
            );
            assert_eq!(adjusted, base, "{target:?}");
        }
    }

    #[test]
    fn test_disjoint_deltas_commute() {
        let base = model();
        let a = Adjustment {
            target: AdjustmentTarget::UnitPrice,
            delta: dec!(10),
        };
        let b = Adjustment {
            target: AdjustmentTarget::OperatingCost,
            delta: dec!(-5),
        };
        let ab = apply_adjustments(&apply_adjustments(&base, &[a]), &[b]);
        let ba = apply_adjustments(&apply_adjustments(&base, &[b]), &[a]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_name_routing() {
        assert_eq!(AdjustmentTarget::parse("revenue"), Some(AdjustmentTarget::UnitPrice));
        assert_eq!(AdjustmentTarget::parse("price"), Some(AdjustmentTarget::UnitPrice));
        assert_eq!(AdjustmentTarget::parse("sales"), Some(AdjustmentTarget::Quantity));
        assert_eq!(AdjustmentTarget::parse("operatingCosts"), Some(AdjustmentTarget::OperatingCost));
        assert_eq!(AdjustmentTarget::parse("discountRate"), Some(AdjustmentTarget::DiscountRate));
        assert_eq!(AdjustmentTarget::parse("weather"), None);
    }

    #[test]
    fn test_unknown_names_silently_ignored() {
        let base = model();
        let adjusted = apply_named(
            &base,
            &[
                NamedDelta {
                    variable: "weather".into(),
                    delta: dec!(50),
                },
                NamedDelta {
                    variable: "price".into(),
                    delta: dec!(10),
                },
            ],
        );
        assert_eq!(adjusted.products[0].unit_price, dec!(22));
        assert_eq!(adjusted.operating_costs[0].amount, dec!(400));
    }
}
