pub mod schedule;
pub mod statements;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{loan_amortizations, LoanAmortization};
use crate::depreciation;
use crate::indicators::{self, BreakEvenInputs, FinancialIndicators};
use crate::types::{
    with_metadata, ComputationOutput, CostType, DepreciationMethod, Money, ProjectModel,
};
use crate::validate::validate_model;
use crate::ProformaResult;

pub use schedule::YearSchedule;
pub use statements::{BalanceSheetYear, CashFlowYear, IncomeStatementYear, Statements};

/// Everything a project appraisal needs, produced in one pass: the three
/// statements, per-loan amortisation schedules, the indicator suite, and the
/// derived break-even parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionBundle {
    pub cash_flows: Vec<CashFlowYear>,
    pub income_statements: Vec<IncomeStatementYear>,
    pub balance_sheets: Vec<BalanceSheetYear>,
    pub amortizations: Vec<LoanAmortization>,
    pub indicators: FinancialIndicators,
    pub break_even_inputs: BreakEvenInputs,
}

/// Single entry point of the engine.
///
/// Validates the model (aborting with the full problem list on structural
/// violations), evaluates the yearly schedules, composes the statements, and
/// derives the indicator suite from the net-cash-flow series. Each series is
/// computed exactly once; later stages consume the earlier ones. All
/// recoverable degenerate conditions end up in the envelope's warnings.
pub fn run_projection(model: &ProjectModel) -> ProformaResult<ComputationOutput<ProjectionBundle>> {
    let start = Instant::now();

    let mut warnings = validate_model(model)?;

    let schedules = schedule::evaluate(model);
    let loans = loan_amortizations(&model.financings);
    let (stmts, statement_warnings) = statements::compose(model, &schedules, &loans);
    warnings.extend(statement_warnings);

    for inv in &model.investments {
        if inv.category.is_depreciable()
            && inv.depreciation_method == DepreciationMethod::DecliningBalance
        {
            if let Some(year) = depreciation::salvage_floor_year(
                inv.amount,
                inv.salvage_value,
                inv.useful_life,
                inv.depreciation_rate,
                inv.year,
            ) {
                warnings.push(format!(
                    "Declining-balance asset purchased in year {} reaches its salvage floor in year {year}; later charges are zero",
                    inv.year
                ));
            }
        }
    }

    let net_cash_flows: Vec<Money> = stmts.cash_flows.iter().map(|cf| cf.net_cash_flow).collect();
    let discount_rate = model.parameters.discount_rate;

    let npv = indicators::npv(discount_rate, &net_cash_flows)?;

    let irr = match indicators::irr(&net_cash_flows) {
        Ok(rate) => Some(rate),
        Err(e) => {
            warnings.push(format!("IRR not reported: {e}"));
            None
        }
    };
    let mirr = match indicators::mirr(&net_cash_flows, discount_rate, discount_rate) {
        Ok(rate) => Some(rate),
        Err(e) => {
            warnings.push(format!("MIRR not reported: {e}"));
            None
        }
    };

    let total_net_income: Money = stmts
        .income_statements
        .iter()
        .map(|is| is.net_income)
        .sum();
    let total_investment: Money = model.investments.iter().map(|inv| inv.amount).sum();

    let break_even_inputs = derive_break_even_inputs(model);

    let bundle = ProjectionBundle {
        indicators: FinancialIndicators {
            npv,
            irr,
            mirr,
            payback_simple: indicators::payback_period(&net_cash_flows),
            payback_discounted: indicators::discounted_payback_period(
                &net_cash_flows,
                discount_rate,
            ),
            roi: indicators::roi(total_net_income, total_investment),
            benefit_cost_ratio: indicators::benefit_cost_ratio(&net_cash_flows, discount_rate),
            break_even: indicators::break_even(&break_even_inputs),
        },
        cash_flows: stmts.cash_flows,
        income_statements: stmts.income_statements,
        balance_sheets: stmts.balance_sheets,
        amortizations: loans,
        break_even_inputs,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Project Finance Projection (statements, amortisation, indicators)",
        &serde_json::json!({
            "constructionYears": model.parameters.construction_years,
            "operationYears": model.parameters.operation_years,
            "discountRate": model.parameters.discount_rate.to_string(),
            "taxRate": model.parameters.tax_rate.to_string(),
            "investments": model.investments.len(),
            "products": model.products.len(),
            "operatingCosts": model.operating_costs.len(),
            "financings": model.financings.len(),
        }),
        warnings,
        elapsed,
        bundle,
    ))
}

/// Break-even parameters derived from the model: mean unit price across
/// products, the sum of per-unit costs across variable cost lines, and the
/// sum of first-year fixed amounts. The convention is deliberately exposed in
/// the bundle; callers with a better-defined single-product view can run
/// `indicators::break_even` on their own inputs.
fn derive_break_even_inputs(model: &ProjectModel) -> BreakEvenInputs {
    let unit_price = if model.products.is_empty() {
        Decimal::ZERO
    } else {
        let total: Money = model.products.iter().map(|p| p.unit_price).sum();
        total / Decimal::from(model.products.len() as i64)
    };

    let mut fixed_costs = Decimal::ZERO;
    let mut variable_cost_per_unit = Decimal::ZERO;
    for cost in &model.operating_costs {
        match cost.cost_type {
            CostType::Fixed => fixed_costs += cost.amount,
            CostType::Variable => variable_cost_per_unit += cost.unit_cost,
        }
    }

    BreakEvenInputs {
        fixed_costs,
        unit_price,
        variable_cost_per_unit,
    }
}
