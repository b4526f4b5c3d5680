use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{ModelProblem, ModelProblems, ProformaError};
use crate::types::{FinancingType, Money, Percent, ProjectModel};
use crate::ProformaResult;

const MAX_CONSTRUCTION_YEARS: u32 = 10;
const MAX_OPERATION_YEARS: u32 = 50;

/// Single-pass structural validation of a project model.
///
/// Every violation is collected before returning, so callers surface the
/// complete problem list at once. On success the accumulated list of
/// non-fatal data warnings is returned instead; those describe degenerate
/// but computable inputs.
pub fn validate_model(model: &ProjectModel) -> ProformaResult<Vec<String>> {
    let mut problems: Vec<ModelProblem> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let p = &model.parameters;
    if p.construction_years > MAX_CONSTRUCTION_YEARS {
        push(
            &mut problems,
            "parameters.constructionYears",
            format!("must be at most {MAX_CONSTRUCTION_YEARS}, got {}", p.construction_years),
        );
    }
    if p.operation_years < 1 || p.operation_years > MAX_OPERATION_YEARS {
        push(
            &mut problems,
            "parameters.operationYears",
            format!("must be between 1 and {MAX_OPERATION_YEARS}, got {}", p.operation_years),
        );
    }
    check_percent(&mut problems, "parameters.discountRate", p.discount_rate);
    check_percent(&mut problems, "parameters.inflationRate", p.inflation_rate);
    check_percent(&mut problems, "parameters.taxRate", p.tax_rate);

    for (i, inv) in model.investments.iter().enumerate() {
        let field = |name: &str| format!("investments[{i}].{name}");
        check_non_negative(&mut problems, &field("amount"), inv.amount);
        check_non_negative(&mut problems, &field("salvageValue"), inv.salvage_value);
        if inv.salvage_value > inv.amount {
            push(
                &mut problems,
                &field("salvageValue"),
                format!("salvage ({}) exceeds amount ({})", inv.salvage_value, inv.amount),
            );
        }
        if inv.useful_life < 1 {
            push(&mut problems, &field("usefulLife"), "must be at least 1 year".into());
        }
        check_percent(&mut problems, &field("depreciationRate"), inv.depreciation_rate);
    }

    for (i, product) in model.products.iter().enumerate() {
        let field = |name: &str| format!("products[{i}].{name}");
        check_non_negative(&mut problems, &field("unitPrice"), product.unit_price);
        check_non_negative(&mut problems, &field("installedCapacity"), product.installed_capacity);
        check_percent(&mut problems, &field("priceEscalation"), product.price_escalation);

        let mut seen_years = std::collections::HashSet::new();
        for (j, row) in product.production_schedule.iter().enumerate() {
            let row_field = |name: &str| format!("products[{i}].productionSchedule[{j}].{name}");
            if row.year < 1 || row.year > p.operation_years {
                push(
                    &mut problems,
                    &row_field("year"),
                    format!(
                        "operating year must be between 1 and {}, got {}",
                        p.operation_years, row.year
                    ),
                );
            }
            if !seen_years.insert(row.year) {
                push(
                    &mut problems,
                    &row_field("year"),
                    format!("duplicate schedule year {}", row.year),
                );
            }
            check_non_negative(&mut problems, &row_field("quantity"), row.quantity);
            check_percent(&mut problems, &row_field("capacityUtilization"), row.capacity_utilization);

            // quantity is authoritative, but flag rows that drifted away
            // from installedCapacity x utilization
            let implied = product.installed_capacity * row.capacity_utilization / dec!(100);
            if implied > Decimal::ZERO && row.quantity > Decimal::ZERO {
                let drift = (row.quantity - implied).abs() / implied;
                if drift > dec!(0.01) {
                    warnings.push(format!(
                        "Product '{}' year {}: quantity {} differs from capacity-implied {}",
                        product.name, row.year, row.quantity, implied
                    ));
                }
            }
        }
    }

    for (i, cost) in model.operating_costs.iter().enumerate() {
        let field = |name: &str| format!("operatingCosts[{i}].{name}");
        check_non_negative(&mut problems, &field("amount"), cost.amount);
        check_non_negative(&mut problems, &field("unitCost"), cost.unit_cost);
        check_percent(&mut problems, &field("escalationRate"), cost.escalation_rate);
        if cost.start_year < 1 {
            push(&mut problems, &field("startYear"), "must be at least 1".into());
        }
    }

    for (i, financing) in model.financings.iter().enumerate() {
        let field = |name: &str| format!("financings[{i}].{name}");
        check_non_negative(&mut problems, &field("amount"), financing.amount);
        check_percent(&mut problems, &field("interestRate"), financing.interest_rate);

        match financing.financing_type {
            FinancingType::Loan => {
                if financing.term_years <= financing.grace_period {
                    push(
                        &mut problems,
                        &field("gracePeriod"),
                        format!(
                            "grace period ({}) must be shorter than the term ({})",
                            financing.grace_period, financing.term_years
                        ),
                    );
                }
                if financing.repayment_start_year < 1 {
                    push(&mut problems, &field("repaymentStartYear"), "must be at least 1".into());
                }
                if financing.repayment_start_year < financing.disbursement_year {
                    warnings.push(format!(
                        "Loan '{}' starts repaying in year {} before its disbursement in year {}",
                        financing.name, financing.repayment_start_year, financing.disbursement_year
                    ));
                }
            }
            FinancingType::Equity | FinancingType::Grant => {
                if financing.interest_rate > Decimal::ZERO || financing.term_years > 0 {
                    warnings.push(format!(
                        "Financing '{}' is not a loan; interest, term and grace are ignored",
                        financing.name
                    ));
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(warnings)
    } else {
        Err(ProformaError::InvalidModel(ModelProblems(problems)))
    }
}

fn push(problems: &mut Vec<ModelProblem>, field: &str, reason: String) {
    problems.push(ModelProblem {
        field: field.to_string(),
        reason,
    });
}

fn check_non_negative(problems: &mut Vec<ModelProblem>, field: &str, value: Money) {
    if value < Decimal::ZERO {
        push(problems, field, format!("must be non-negative, got {value}"));
    }
}

fn check_percent(problems: &mut Vec<ModelProblem>, field: &str, value: Percent) {
    if value < Decimal::ZERO || value > dec!(100) {
        push(problems, field, format!("must be between 0 and 100 percent, got {value}"));
    }
}
