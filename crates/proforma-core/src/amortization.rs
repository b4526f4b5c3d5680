use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{fraction, Financing, FinancingType, Money, Percent};

/// A single period in a loan amortisation schedule (equal-principal method).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    /// Loan year, 1-based
    pub year: u32,
    pub beginning_balance: Money,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub ending_balance: Money,
}

/// The full schedule for one named loan, anchored to the absolute project
/// year its first repayment row falls in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanAmortization {
    pub name: String,
    pub principal: Money,
    pub disbursement_year: u32,
    pub repayment_start_year: u32,
    pub schedule: Vec<AmortizationRow>,
}

/// Aggregated principal and interest due in a single project year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtService {
    pub principal: Money,
    pub interest: Money,
}

impl DebtService {
    pub fn total(&self) -> Money {
        self.principal + self.interest
    }
}

/// Build an equal-principal amortisation schedule.
///
/// Interest accrues on the beginning balance each year. During the grace
/// period no principal is repaid; afterwards the principal is spread evenly
/// over the remaining `term_years - grace_period` rows, so interest declines
/// over time. `term_years == 0` produces an empty schedule. A term entirely
/// inside the grace period degrades to a schedule of zero principal (the
/// model validator rejects that combination upstream).
pub fn build_schedule(
    principal: Money,
    annual_rate: Percent,
    term_years: u32,
    grace_period: u32,
) -> Vec<AmortizationRow> {
    let rate = fraction(annual_rate);
    let repayment_years = term_years.saturating_sub(grace_period);
    let principal_per_year = if repayment_years > 0 {
        principal / Decimal::from(repayment_years)
    } else {
        Decimal::ZERO
    };

    let mut rows = Vec::with_capacity(term_years as usize);
    let mut balance = principal;

    for year in 1..=term_years {
        let beginning_balance = balance;
        let interest = beginning_balance * rate;
        let principal_paid = if year <= grace_period {
            Decimal::ZERO
        } else {
            principal_per_year
        };
        let ending_balance = (beginning_balance - principal_paid).max(Decimal::ZERO);

        rows.push(AmortizationRow {
            year,
            beginning_balance,
            payment: principal_paid + interest,
            principal: principal_paid,
            interest,
            ending_balance,
        });

        balance = ending_balance;
    }

    rows
}

/// Build the amortisation schedule for every loan in a financing list.
/// Equity and grants carry no schedule.
pub fn loan_amortizations(financings: &[Financing]) -> Vec<LoanAmortization> {
    financings
        .iter()
        .filter(|f| f.financing_type == FinancingType::Loan)
        .map(|f| LoanAmortization {
            name: f.name.clone(),
            principal: f.amount,
            disbursement_year: f.disbursement_year,
            repayment_start_year: f.repayment_start_year,
            schedule: build_schedule(f.amount, f.interest_rate, f.term_years, f.grace_period),
        })
        .collect()
}

/// Sum principal and interest due across all loans in the given absolute
/// project year. A loan contributes when
/// `year - repayment_start_year` falls in `[0, term_years)`.
pub fn debt_service_for_year(loans: &[LoanAmortization], year: u32) -> DebtService {
    let mut service = DebtService::default();
    for loan in loans {
        if year < loan.repayment_start_year {
            continue;
        }
        let idx = (year - loan.repayment_start_year) as usize;
        if let Some(row) = loan.schedule.get(idx) {
            service.principal += row.principal;
            service.interest += row.interest;
        }
    }
    service
}

/// Remaining principal of one loan at the end of the given absolute year.
/// Before disbursement nothing is outstanding; between disbursement and the
/// first repayment row the full principal is.
pub fn outstanding_principal(loan: &LoanAmortization, year: u32) -> Money {
    if year < loan.disbursement_year {
        return Decimal::ZERO;
    }
    if year < loan.repayment_start_year {
        return loan.principal;
    }
    let idx = (year - loan.repayment_start_year) as usize;
    match loan.schedule.get(idx) {
        Some(row) => row.ending_balance,
        None => Decimal::ZERO,
    }
}
