use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{debt_service_for_year, outstanding_principal, LoanAmortization};
use crate::depreciation;
use crate::projection::schedule::YearSchedule;
use crate::types::{fraction, FinancingType, InvestmentCategory, Money, ProjectModel};

/// Share of cumulative working-capital investment held as inventory on the
/// balance sheet. Receivables and payables are not modelled; cash is the
/// plug that makes the accounting identity hold.
const INVENTORY_WORKING_CAPITAL_SHARE: Decimal = dec!(0.6);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowYear {
    pub year: u32,
    pub operating_inflow: Money,
    pub operating_outflow: Money,
    pub investing_outflow: Money,
    pub financing_inflow: Money,
    pub financing_outflow: Money,
    pub net_cash_flow: Money,
    pub cumulative_cash_flow: Money,
    pub discounted_cash_flow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementYear {
    pub year: u32,
    pub revenue: Money,
    pub cost_of_goods_sold: Money,
    pub gross_profit: Money,
    pub operating_expenses: Money,
    pub depreciation: Money,
    pub operating_income: Money,
    pub interest_expense: Money,
    pub taxable_income: Money,
    pub taxes: Money,
    pub net_income: Money,
}

impl IncomeStatementYear {
    fn zeroed(year: u32) -> Self {
        IncomeStatementYear {
            year,
            revenue: Decimal::ZERO,
            cost_of_goods_sold: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            operating_expenses: Decimal::ZERO,
            depreciation: Decimal::ZERO,
            operating_income: Decimal::ZERO,
            interest_expense: Decimal::ZERO,
            taxable_income: Decimal::ZERO,
            taxes: Decimal::ZERO,
            net_income: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetYear {
    pub year: u32,
    pub cash: Money,
    pub receivables: Money,
    pub inventory: Money,
    pub fixed_assets: Money,
    pub accumulated_depreciation: Money,
    pub net_fixed_assets: Money,
    pub total_assets: Money,
    pub long_term_debt: Money,
    pub total_liabilities: Money,
    pub share_capital: Money,
    pub retained_earnings: Money,
    pub total_equity: Money,
}

/// The three parallel annual series. Cash flow and balance sheet cover
/// absolute years `0..=horizon`; the income statement starts at year 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statements {
    pub cash_flows: Vec<CashFlowYear>,
    pub income_statements: Vec<IncomeStatementYear>,
    pub balance_sheets: Vec<BalanceSheetYear>,
}

/// Compose the three statements from the evaluated schedules and loan
/// amortisations. Depreciation, debt service and taxes are computed once per
/// year and shared across all three series, so the statements stay
/// cross-referentially consistent. Returns the statements together with any
/// diagnostics raised while composing (currently: the cash plug clamping at
/// zero).
pub fn compose(
    model: &ProjectModel,
    schedules: &[YearSchedule],
    loans: &[LoanAmortization],
) -> (Statements, Vec<String>) {
    let horizon = model.horizon();
    let mut warnings = Vec::new();

    let tax_rate = fraction(model.parameters.tax_rate);
    let discount_factor_per_year = Decimal::ONE + fraction(model.parameters.discount_rate);

    // Shared per-year figures
    let depreciation_by_year: Vec<Money> = (0..=horizon)
        .map(|year| total_depreciation_charge(model, year))
        .collect();
    let debt_service_by_year: Vec<_> = (0..=horizon)
        .map(|year| debt_service_for_year(loans, year))
        .collect();
    let taxes_by_year: Vec<Money> = (0..=horizon)
        .map(|year| {
            let y = year as usize;
            let taxable = schedules[y].revenue
                - schedules[y].total_operating_costs()
                - depreciation_by_year[y]
                - debt_service_by_year[y].interest;
            taxable.max(Decimal::ZERO) * tax_rate
        })
        .collect();

    // ── Income statement ────────────────────────────────────────────────
    let construction_years = model.parameters.construction_years;
    let mut income_statements = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        if year <= construction_years {
            income_statements.push(IncomeStatementYear::zeroed(year));
            continue;
        }
        let y = year as usize;
        let revenue = schedules[y].revenue;
        let cost_of_goods_sold = schedules[y].variable_costs;
        let gross_profit = revenue - cost_of_goods_sold;
        let operating_expenses = schedules[y].fixed_costs;
        let depreciation = depreciation_by_year[y];
        let operating_income = gross_profit - operating_expenses - depreciation;
        let interest_expense = debt_service_by_year[y].interest;
        let taxable_income = operating_income - interest_expense;
        let taxes = taxes_by_year[y];
        income_statements.push(IncomeStatementYear {
            year,
            revenue,
            cost_of_goods_sold,
            gross_profit,
            operating_expenses,
            depreciation,
            operating_income,
            interest_expense,
            taxable_income,
            taxes,
            net_income: taxable_income - taxes,
        });
    }

    // ── Cash flow ───────────────────────────────────────────────────────
    let mut cash_flows = Vec::with_capacity(horizon as usize + 1);
    let mut cumulative = Decimal::ZERO;
    let mut discount = Decimal::ONE;
    for year in 0..=horizon {
        let y = year as usize;
        let operating_inflow = schedules[y].revenue;
        let operating_outflow = schedules[y].total_operating_costs() + taxes_by_year[y];
        let investing_outflow = schedules[y].capex;
        let financing_inflow = schedules[y].financing_inflows;
        let financing_outflow = debt_service_by_year[y].total();
        let net_cash_flow = operating_inflow - operating_outflow - investing_outflow
            + financing_inflow
            - financing_outflow;
        cumulative += net_cash_flow;
        if year > 0 {
            discount *= discount_factor_per_year;
        }
        cash_flows.push(CashFlowYear {
            year,
            operating_inflow,
            operating_outflow,
            investing_outflow,
            financing_inflow,
            financing_outflow,
            net_cash_flow,
            cumulative_cash_flow: cumulative,
            discounted_cash_flow: net_cash_flow / discount,
        });
    }

    // ── Balance sheet ───────────────────────────────────────────────────
    let mut balance_sheets = Vec::with_capacity(horizon as usize + 1);
    let mut retained_earnings = Decimal::ZERO;
    for year in 0..=horizon {
        if year >= 1 {
            retained_earnings += income_statements[year as usize - 1].net_income;
        }

        let mut fixed_assets = Decimal::ZERO;
        let mut working_capital_invested = Decimal::ZERO;
        let mut accumulated_depreciation = Decimal::ZERO;
        for inv in &model.investments {
            if inv.year > year {
                continue;
            }
            if inv.category == InvestmentCategory::WorkingCapital {
                working_capital_invested += inv.amount;
            } else {
                fixed_assets += inv.amount;
            }
            if inv.category.is_depreciable() {
                accumulated_depreciation += depreciation::accumulated(
                    inv.amount,
                    inv.salvage_value,
                    inv.useful_life,
                    inv.depreciation_rate,
                    inv.depreciation_method,
                    inv.year,
                    year,
                );
            }
        }
        let net_fixed_assets = fixed_assets - accumulated_depreciation;
        let receivables = Decimal::ZERO;
        let inventory = INVENTORY_WORKING_CAPITAL_SHARE * working_capital_invested;

        let long_term_debt: Money = loans
            .iter()
            .map(|loan| outstanding_principal(loan, year))
            .sum();
        let share_capital: Money = model
            .financings
            .iter()
            .filter(|f| f.financing_type == FinancingType::Equity && f.disbursement_year <= year)
            .map(|f| f.amount)
            .sum();

        let total_liabilities = long_term_debt;
        let total_equity = share_capital + retained_earnings;

        // Cash plugs the accounting identity, floored at zero
        let cash_unclamped =
            total_liabilities + total_equity - receivables - inventory - net_fixed_assets;
        let cash = cash_unclamped.max(Decimal::ZERO);
        if cash_unclamped < Decimal::ZERO {
            warnings.push(format!(
                "Year {year}: balance-sheet cash plug clamped to zero (required {cash_unclamped})"
            ));
        }

        balance_sheets.push(BalanceSheetYear {
            year,
            cash,
            receivables,
            inventory,
            fixed_assets,
            accumulated_depreciation,
            net_fixed_assets,
            total_assets: cash + receivables + inventory + net_fixed_assets,
            long_term_debt,
            total_liabilities,
            share_capital,
            retained_earnings,
            total_equity,
        });
    }

    (
        Statements {
            cash_flows,
            income_statements,
            balance_sheets,
        },
        warnings,
    )
}

/// Depreciation charge across all depreciable investments for one year.
pub fn total_depreciation_charge(model: &ProjectModel, year: u32) -> Money {
    model
        .investments
        .iter()
        .filter(|inv| inv.category.is_depreciable())
        .map(|inv| {
            depreciation::annual_charge(
                inv.amount,
                inv.salvage_value,
                inv.useful_life,
                inv.depreciation_rate,
                inv.depreciation_method,
                inv.year,
                year,
            )
        })
        .sum()
}
