use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use proforma_core::amortization::build_schedule;

/// Arguments for a standalone loan amortisation schedule
#[derive(Args)]
pub struct AmortizationArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,
    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,
    /// Term in years
    #[arg(long)]
    pub term: u32,
    /// Grace period in years (interest only)
    #[arg(long, default_value = "0")]
    pub grace: u32,
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.term <= args.grace {
        return Err(format!(
            "grace period ({}) must be shorter than the term ({})",
            args.grace, args.term
        )
        .into());
    }

    let schedule = build_schedule(args.principal, args.rate, args.term, args.grace);
    let total_interest: Decimal = schedule.iter().map(|r| r.interest).sum();
    let total_principal: Decimal = schedule.iter().map(|r| r.principal).sum();

    Ok(serde_json::json!({
        "schedule": schedule,
        "totalInterest": total_interest,
        "totalPrincipal": total_principal,
    }))
}
