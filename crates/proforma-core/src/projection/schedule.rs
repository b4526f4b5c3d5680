use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{fraction, CostType, Money, Percent, ProjectModel};

/// Raw operating figures for one absolute project year, before any statement
/// logic: escalated revenue, the variable/fixed cost split, capital outflows
/// and financing inflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSchedule {
    pub year: u32,
    pub revenue: Money,
    pub variable_costs: Money,
    pub fixed_costs: Money,
    pub capex: Money,
    pub financing_inflows: Money,
}

impl YearSchedule {
    pub fn total_operating_costs(&self) -> Money {
        self.variable_costs + self.fixed_costs
    }
}

/// Compound escalation: `base * (1 + rate)^periods`. Zero periods reproduce
/// the unescalated input exactly.
fn escalate(base: Money, rate: Percent, periods: u32) -> Money {
    let factor_per_year = Decimal::ONE + fraction(rate);
    let mut amount = base;
    for _ in 0..periods {
        amount *= factor_per_year;
    }
    amount
}

/// Revenue for an absolute year: zero during construction, otherwise the sum
/// over products of `quantity * unitPrice` escalated from operating year 1.
/// Operating years without a schedule row produce nothing.
pub fn revenue_for_year(model: &ProjectModel, year: u32) -> Money {
    let construction = model.parameters.construction_years;
    if year <= construction {
        return Decimal::ZERO;
    }
    let operating_year = year - construction;

    model
        .products
        .iter()
        .filter_map(|product| {
            product
                .production_schedule
                .iter()
                .find(|row| row.year == operating_year)
                .map(|row| {
                    escalate(
                        row.quantity * product.unit_price,
                        product.price_escalation,
                        operating_year - 1,
                    )
                })
        })
        .sum()
}

/// Operating costs for an absolute year, split into (variable, fixed).
/// Each cost escalates from its own start year.
pub fn operating_costs_for_year(model: &ProjectModel, year: u32) -> (Money, Money) {
    let construction = model.parameters.construction_years;
    if year <= construction {
        return (Decimal::ZERO, Decimal::ZERO);
    }
    let operating_year = year - construction;

    let mut variable = Decimal::ZERO;
    let mut fixed = Decimal::ZERO;
    for cost in &model.operating_costs {
        if cost.start_year > operating_year {
            continue;
        }
        let contribution = escalate(
            cost.amount,
            cost.escalation_rate,
            operating_year - cost.start_year,
        );
        match cost.cost_type {
            CostType::Variable => variable += contribution,
            CostType::Fixed => fixed += contribution,
        }
    }
    (variable, fixed)
}

/// Capital outflows landing in an absolute year.
pub fn capex_for_year(model: &ProjectModel, year: u32) -> Money {
    model
        .investments
        .iter()
        .filter(|inv| inv.year == year)
        .map(|inv| inv.amount)
        .sum()
}

/// Financing disbursements landing in an absolute year, across all
/// instrument types.
pub fn disbursements_for_year(model: &ProjectModel, year: u32) -> Money {
    model
        .financings
        .iter()
        .filter(|f| f.disbursement_year == year)
        .map(|f| f.amount)
        .sum()
}

/// Evaluate the full horizon, absolute years `0..=construction + operation`.
pub fn evaluate(model: &ProjectModel) -> Vec<YearSchedule> {
    (0..=model.horizon())
        .map(|year| {
            let (variable_costs, fixed_costs) = operating_costs_for_year(model, year);
            YearSchedule {
                year,
                revenue: revenue_for_year(model, year),
                variable_costs,
                fixed_costs,
                capex: capex_for_year(model, year),
                financing_inflows: disbursements_for_year(model, year),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn model_with(products: Vec<Product>, costs: Vec<OperatingCost>) -> ProjectModel {
        ProjectModel {
            parameters: ProjectParameters {
                construction_years: 2,
                operation_years: 5,
                discount_rate: dec!(10),
                inflation_rate: dec!(0),
                tax_rate: dec!(25),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
            investments: vec![
                Investment {
                    category: InvestmentCategory::Buildings,
                    amount: dec!(50000),
                    year: 0,
                    useful_life: 20,
                    salvage_value: dec!(0),
                    depreciation_method: DepreciationMethod::StraightLine,
                    depreciation_rate: dec!(0),
                },
                Investment {
                    category: InvestmentCategory::Machinery,
                    amount: dec!(30000),
                    year: 1,
                    useful_life: 10,
                    salvage_value: dec!(3000),
                    depreciation_method: DepreciationMethod::StraightLine,
                    depreciation_rate: dec!(0),
                },
            ],
            products,
            operating_costs: costs,
            financings: vec![Financing {
                financing_type: FinancingType::Equity,
                name: "Sponsor".into(),
                amount: dec!(80000),
                interest_rate: dec!(0),
                term_years: 0,
                grace_period: 0,
                disbursement_year: 0,
                repayment_start_year: 1,
            }],
        }
    }

    fn widget(price: Money, escalation: Percent, schedule: Vec<(u32, Decimal)>) -> Product {
        Product {
            name: "Widget".into(),
            unit: "piece".into(),
            unit_price: price,
            price_escalation: escalation,
            installed_capacity: dec!(1000),
            capacity_unit: "piece/yr".into(),
            production_schedule: schedule
                .into_iter()
                .map(|(year, quantity)| ProductionYear {
                    year,
                    capacity_utilization: dec!(0),
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_no_revenue_during_construction() {
        let model = model_with(vec![widget(dec!(10), dec!(0), vec![(1, dec!(100))])], vec![]);
        assert_eq!(revenue_for_year(&model, 0), Decimal::ZERO);
        assert_eq!(revenue_for_year(&model, 1), Decimal::ZERO);
        assert_eq!(revenue_for_year(&model, 2), Decimal::ZERO);
        // Operating year 1 = absolute year 3
        assert_eq!(revenue_for_year(&model, 3), dec!(1000));
    }

    #[test]
    fn test_revenue_escalation_anchored_at_first_operating_year() {
        let model = model_with(
            vec![widget(
                dec!(10),
                dec!(5),
                vec![(1, dec!(100)), (2, dec!(100)), (3, dec!(100))],
            )],
            vec![],
        );
        // Operating year 1: no escalation
        assert_eq!(revenue_for_year(&model, 3), dec!(1000));
        // Operating year 2: one year of 5%
        assert_eq!(revenue_for_year(&model, 4), dec!(1050));
        // Operating year 3: compounded
        assert_eq!(revenue_for_year(&model, 5), dec!(1102.50));
    }

    #[test]
    fn test_missing_schedule_years_produce_zero() {
        let model = model_with(
            vec![widget(dec!(10), dec!(0), vec![(1, dec!(100)), (4, dec!(200))])],
            vec![],
        );
        assert_eq!(revenue_for_year(&model, 3), dec!(1000));
        assert_eq!(revenue_for_year(&model, 4), Decimal::ZERO);
        assert_eq!(revenue_for_year(&model, 5), Decimal::ZERO);
        assert_eq!(revenue_for_year(&model, 6), dec!(2000));
    }

    #[test]
    fn test_multiple_products_sum() {
        let model = model_with(
            vec![
                widget(dec!(10), dec!(0), vec![(1, dec!(100))]),
                widget(dec!(4), dec!(0), vec![(1, dec!(500))]),
            ],
            vec![],
        );
        assert_eq!(revenue_for_year(&model, 3), dec!(3000));
    }

    #[test]
    fn test_cost_split_and_escalation() {
        let costs = vec![
            OperatingCost {
                category: "materials".into(),
                description: "Raw materials".into(),
                cost_type: CostType::Variable,
                amount: dec!(1000),
                unit_cost: dec!(1),
                escalation_rate: dec!(10),
                start_year: 1,
            },
            OperatingCost {
                category: "admin".into(),
                description: "Overheads".into(),
                cost_type: CostType::Fixed,
                amount: dec!(500),
                unit_cost: dec!(0),
                escalation_rate: dec!(0),
                start_year: 2,
            },
        ];
        let model = model_with(vec![], costs);

        // Construction: nothing
        assert_eq!(operating_costs_for_year(&model, 1), (dec!(0), dec!(0)));
        // Operating year 1: variable only, unescalated
        assert_eq!(operating_costs_for_year(&model, 3), (dec!(1000), dec!(0)));
        // Operating year 2: variable escalated once, fixed starts at its base
        assert_eq!(operating_costs_for_year(&model, 4), (dec!(1100), dec!(500)));
        // Operating year 3: each escalated from its own anchor
        assert_eq!(operating_costs_for_year(&model, 5), (dec!(1210), dec!(500)));
    }

    #[test]
    fn test_capex_by_year() {
        let model = model_with(vec![], vec![]);
        assert_eq!(capex_for_year(&model, 0), dec!(50000));
        assert_eq!(capex_for_year(&model, 1), dec!(30000));
        assert_eq!(capex_for_year(&model, 2), Decimal::ZERO);
    }

    #[test]
    fn test_disbursements_by_year() {
        let model = model_with(vec![], vec![]);
        assert_eq!(disbursements_for_year(&model, 0), dec!(80000));
        assert_eq!(disbursements_for_year(&model, 1), Decimal::ZERO);
    }

    #[test]
    fn test_evaluate_covers_full_horizon() {
        let model = model_with(vec![widget(dec!(10), dec!(0), vec![(1, dec!(100))])], vec![]);
        let schedules = evaluate(&model);
        assert_eq!(schedules.len(), 8); // years 0..=7
        assert_eq!(schedules[0].year, 0);
        assert_eq!(schedules[7].year, 7);
        assert_eq!(schedules[3].revenue, dec!(1000));
    }
}
