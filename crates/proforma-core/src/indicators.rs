use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProformaError;
use crate::types::{fraction, Money, Percent, Rate};
use crate::ProformaResult;

const MAX_IRR_ITERATIONS: u32 = 100;
const IRR_RATE_TOLERANCE: Decimal = dec!(0.0001);
const DERIVATIVE_GUARD: Decimal = dec!(0.0000000001);
const BISECTION_LOW: Decimal = dec!(-0.999);
const BISECTION_HIGH: Decimal = dec!(10.0);
const MAX_BISECTION_ITERATIONS: u32 = 200;

// Discount factors outside this band contribute nothing measurable; stopping
// there also keeps the 96-bit decimal arithmetic in range.
const MIN_DISCOUNT: Decimal = dec!(0.000000001);
const MAX_DISCOUNT: Decimal = dec!(1000000000000000);

/// Payback sentinel: the cumulative series never turns non-negative.
pub const NEVER_RECOVERED: Decimal = dec!(-1);

/// Complete indicator suite over a net-cash-flow series (index 0 = year 0).
/// IRR and MIRR are `None` when root-finding did not converge; ratio
/// indicators degrade to zero on empty denominators; break-even returns the
/// `(-1, -1)` sentinel on non-positive contribution margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialIndicators {
    pub npv: Money,
    pub irr: Option<Percent>,
    pub mirr: Option<Percent>,
    pub payback_simple: Decimal,
    pub payback_discounted: Decimal,
    pub roi: Percent,
    pub benefit_cost_ratio: Decimal,
    pub break_even: BreakEvenPoint,
}

/// Parameters the break-even calculation runs on. Derived by the façade from
/// the project model and exposed alongside the result so report writers
/// never re-infer them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenInputs {
    pub fixed_costs: Money,
    pub unit_price: Money,
    pub variable_cost_per_unit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenPoint {
    pub units: Decimal,
    pub revenue: Money,
}

impl BreakEvenPoint {
    /// Sentinel for a non-positive contribution margin.
    pub fn undefined() -> Self {
        BreakEvenPoint {
            units: dec!(-1),
            revenue: dec!(-1),
        }
    }
}

// ---------------------------------------------------------------------------
// Present value
// ---------------------------------------------------------------------------

/// NPV of the cash-flow series at a fractional rate. Discount factors are
/// accumulated iteratively; once the factor leaves the representable band the
/// remaining tail is dropped as immeasurable.
fn npv_at(rate: Rate, cash_flows: &[Money]) -> Money {
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount < MIN_DISCOUNT || discount > MAX_DISCOUNT {
            break;
        }
        result += cf / discount;
    }

    result
}

/// Net Present Value at a percent discount rate. A zero rate returns the
/// plain sum.
pub fn npv(discount_rate: Percent, cash_flows: &[Money]) -> ProformaResult<Money> {
    let rate = fraction(discount_rate);
    if rate <= dec!(-1) {
        return Err(ProformaError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    if rate.is_zero() {
        return Ok(cash_flows.iter().copied().sum());
    }
    Ok(npv_at(rate, cash_flows))
}

// ---------------------------------------------------------------------------
// IRR
// ---------------------------------------------------------------------------

/// Internal Rate of Return, in percent.
///
/// Newton-Raphson from a 10% starting guess, bounded at 100 iterations with a
/// 1e-4 tolerance on the rate step. On derivative collapse or iteration
/// exhaustion a bisection fallback runs over [-0.999, 10.0]; with no sign
/// change in that bracket the series has no findable root and the error is
/// surfaced rather than a garbage rate.
pub fn irr(cash_flows: &[Money]) -> ProformaResult<Percent> {
    if cash_flows.len() < 2 {
        return Err(ProformaError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate: Rate = dec!(0.10);

    for _ in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows);

        if dnpv.abs() < DERIVATIVE_GUARD {
            return bisect(cash_flows);
        }

        let step = npv_val / dnpv;
        rate -= step;

        if rate < BISECTION_LOW {
            rate = BISECTION_LOW;
        } else if rate > BISECTION_HIGH {
            rate = BISECTION_HIGH;
        }

        if step.abs() < IRR_RATE_TOLERANCE {
            return Ok(rate * dec!(100));
        }
    }

    bisect(cash_flows)
}

fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> (Decimal, Decimal) {
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount < MIN_DISCOUNT || discount > MAX_DISCOUNT {
            break;
        }
        npv_val += cf / discount;
        if t > 0 {
            dnpv -= Decimal::from(t as i64) * cf / (discount * one_plus_r);
        }
    }

    (npv_val, dnpv)
}

/// Bisection over a bracketed sign change. Fails with an explicit
/// convergence error when the bracket holds no root.
fn bisect(cash_flows: &[Money]) -> ProformaResult<Percent> {
    let mut lo = BISECTION_LOW;
    let mut hi = BISECTION_HIGH;
    let mut f_lo = npv_at(lo, cash_flows);
    let f_hi = npv_at(hi, cash_flows);

    if (f_lo > Decimal::ZERO) == (f_hi > Decimal::ZERO) {
        return Err(ProformaError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: MAX_IRR_ITERATIONS,
            last_delta: f_lo,
        });
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = npv_at(mid, cash_flows);

        if hi - lo < IRR_RATE_TOLERANCE {
            return Ok(mid * dec!(100));
        }

        if (f_mid > Decimal::ZERO) == (f_lo > Decimal::ZERO) {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Ok(((lo + hi) / dec!(2)) * dec!(100))
}

// ---------------------------------------------------------------------------
// MIRR
// ---------------------------------------------------------------------------

/// Modified IRR, in percent. Negative flows are discounted at the finance
/// rate, positive flows compounded forward at the reinvestment rate. A series
/// with no negative flows returns zero.
pub fn mirr(
    cash_flows: &[Money],
    finance_rate: Percent,
    reinvestment_rate: Percent,
) -> ProformaResult<Percent> {
    if cash_flows.len() < 2 {
        return Err(ProformaError::InsufficientData(
            "MIRR requires at least 2 cash flows".into(),
        ));
    }

    let n = cash_flows.len() - 1;
    let f_rate = fraction(finance_rate);
    let r_rate = fraction(reinvestment_rate);

    let mut pv_negative = Decimal::ZERO;
    let mut fv_positive = Decimal::ZERO;

    let one_plus_f = Decimal::ONE + f_rate;
    let one_plus_r = Decimal::ONE + r_rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_f;
        }
        if *cf < Decimal::ZERO && discount >= MIN_DISCOUNT && discount <= MAX_DISCOUNT {
            pv_negative += cf / discount;
        }
        if *cf > Decimal::ZERO {
            let mut compound = Decimal::ONE;
            for _ in 0..(n - t) {
                compound *= one_plus_r;
            }
            fv_positive += cf * compound;
        }
    }

    if pv_negative.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let ratio = -fv_positive / pv_negative;
    if ratio <= Decimal::ZERO {
        return Ok(dec!(-100));
    }

    let root = nth_root(ratio, n as u32)?;
    Ok((root - Decimal::ONE) * dec!(100))
}

/// Newton's method for the n-th root, avoiding fractional `powd`.
fn nth_root(value: Decimal, n: u32) -> ProformaResult<Decimal> {
    if n == 0 {
        return Err(ProformaError::DivisionByZero {
            context: "nth root with n = 0".into(),
        });
    }
    if n == 1 {
        return Ok(value);
    }

    // Start above the root (Bernoulli bound for value > 1, else 1 itself);
    // Newton on the convex x^n then descends monotonically.
    let n_dec = Decimal::from(n);
    let mut x = if value > Decimal::ONE {
        Decimal::ONE + (value - Decimal::ONE) / n_dec
    } else {
        Decimal::ONE
    };

    for _ in 0..60 {
        let mut x_pow_nm1 = Decimal::ONE;
        for _ in 0..(n - 1) {
            x_pow_nm1 *= x;
        }
        let x_pow_n = x_pow_nm1 * x;

        let denom = n_dec * x_pow_nm1;
        if denom.is_zero() {
            break;
        }

        let step = (x_pow_n - value) / denom;
        x -= step;

        if x <= Decimal::ZERO {
            x = dec!(0.000001);
        }
        if step.abs() < dec!(0.000000000001) {
            break;
        }
    }

    Ok(x)
}

// ---------------------------------------------------------------------------
// Payback
// ---------------------------------------------------------------------------

/// Smallest `p` at which the running cash-flow sum turns non-negative,
/// interpolated linearly across the crossing year. Returns the
/// `NEVER_RECOVERED` sentinel when the cumulative series stays negative.
pub fn payback_period(cash_flows: &[Money]) -> Decimal {
    let mut cumulative = Decimal::ZERO;
    for (t, cf) in cash_flows.iter().enumerate() {
        let previous = cumulative;
        cumulative += cf;
        if cumulative >= Decimal::ZERO {
            if t == 0 || previous >= Decimal::ZERO {
                return Decimal::from(t as i64);
            }
            // previous < 0 <= cumulative, so cf > 0 here
            let fraction_of_year = -previous / *cf;
            return Decimal::from(t as i64 - 1) + fraction_of_year;
        }
    }
    NEVER_RECOVERED
}

/// Payback on the discounted series.
pub fn discounted_payback_period(cash_flows: &[Money], discount_rate: Percent) -> Decimal {
    let rate = fraction(discount_rate);
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut discounted = Vec::with_capacity(cash_flows.len());
    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount < MIN_DISCOUNT || discount > MAX_DISCOUNT {
            break;
        }
        discounted.push(cf / discount);
    }
    payback_period(&discounted)
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Return on investment in percent; zero when nothing was invested.
pub fn roi(total_net_income: Money, total_investment: Money) -> Percent {
    if total_investment.is_zero() {
        return Decimal::ZERO;
    }
    total_net_income / total_investment * dec!(100)
}

/// Benefit-cost ratio: PV of positive flows after year 0 over the initial
/// outlay plus PV of later negative flows. Zero when the cost side is empty.
pub fn benefit_cost_ratio(cash_flows: &[Money], discount_rate: Percent) -> Decimal {
    if cash_flows.is_empty() {
        return Decimal::ZERO;
    }

    let rate = fraction(discount_rate);
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    let mut benefits = Decimal::ZERO;
    let mut costs = cash_flows[0].abs();

    for cf in &cash_flows[1..] {
        discount *= one_plus_r;
        if discount < MIN_DISCOUNT || discount > MAX_DISCOUNT {
            break;
        }
        if *cf > Decimal::ZERO {
            benefits += cf / discount;
        } else {
            costs += cf.abs() / discount;
        }
    }

    if costs.is_zero() {
        return Decimal::ZERO;
    }
    benefits / costs
}

/// Break-even output level: `fixed / (price - variable unit cost)`. A
/// non-positive contribution margin has no break-even; the sentinel marks it.
pub fn break_even(inputs: &BreakEvenInputs) -> BreakEvenPoint {
    let contribution_margin = inputs.unit_price - inputs.variable_cost_per_unit;
    if contribution_margin <= Decimal::ZERO {
        return BreakEvenPoint::undefined();
    }
    let units = inputs.fixed_costs / contribution_margin;
    BreakEvenPoint {
        units,
        revenue: units * inputs.unit_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s1_flows() -> Vec<Money> {
        vec![dec!(-1000), dec!(300), dec!(400), dec!(500), dec!(600)]
    }

    #[test]
    fn test_npv_reference_series() {
        let result = npv(dec!(10), &s1_flows()).unwrap();
        // -1000 + 300/1.1 + 400/1.21 + 500/1.331 + 600/1.4641
        assert!((result - dec!(388.77)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        assert_eq!(npv(dec!(0), &s1_flows()).unwrap(), dec!(800));
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_100() {
        assert!(npv(dec!(-100), &s1_flows()).is_err());
    }

    #[test]
    fn test_irr_reference_series() {
        let rate = irr(&s1_flows()).unwrap();
        assert!((rate - dec!(24.89)).abs() < dec!(0.1), "got {rate}");
    }

    #[test]
    fn test_irr_at_zero() {
        // Flows sum to exactly zero: IRR = 0
        let flows = vec![dec!(-1000), dec!(250), dec!(250), dec!(250), dec!(250)];
        let rate = irr(&flows).unwrap();
        assert!(rate.abs() < dec!(0.1), "got {rate}");
    }

    #[test]
    fn test_irr_zero_crossing_property() {
        let rate = irr(&s1_flows()).unwrap();
        let at_root = npv(rate, &s1_flows()).unwrap();
        assert!(at_root.abs() < dec!(1), "NPV at IRR was {at_root}");

        // NPV is decreasing in the rate for a single-sign-change series
        let below = npv(rate - dec!(5), &s1_flows()).unwrap();
        assert!(below > at_root);
    }

    #[test]
    fn test_irr_all_positive_flows_does_not_converge() {
        let flows = vec![dec!(100), dec!(200), dec!(300)];
        match irr(&flows) {
            Err(ProformaError::ConvergenceFailure { .. }) => {}
            other => panic!("expected ConvergenceFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_irr_requires_two_flows() {
        assert!(irr(&[dec!(-100)]).is_err());
    }

    #[test]
    fn test_irr_steep_series_via_bisection_bracket() {
        // Very high return: root near 200%, far from the Newton guess
        let flows = vec![dec!(-200), dec!(420), dec!(420), dec!(420)];
        let rate = irr(&flows).unwrap();
        let residual = npv(rate, &flows).unwrap();
        assert!(residual.abs() < dec!(1), "NPV at IRR was {residual}");
        assert!(rate > dec!(100));
    }

    #[test]
    fn test_mirr_reference_series() {
        // n=4, both rates 10%. PV_neg = -1000.
        // FV_pos = 300*1.331 + 400*1.21 + 500*1.1 + 600 = 2033.3
        // MIRR = (2033.3/1000)^(1/4) - 1 = 19.42%
        let rate = mirr(&s1_flows(), dec!(10), dec!(10)).unwrap();
        assert!((rate - dec!(19.42)).abs() < dec!(0.1), "got {rate}");
    }

    #[test]
    fn test_mirr_no_negative_flows_is_zero() {
        let flows = vec![dec!(100), dec!(50), dec!(50)];
        assert_eq!(mirr(&flows, dec!(10), dec!(10)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_mirr_below_irr_for_high_return_projects() {
        // Reinvestment at the (lower) discount rate drags MIRR below IRR
        let m = mirr(&s1_flows(), dec!(10), dec!(10)).unwrap();
        let i = irr(&s1_flows()).unwrap();
        assert!(m < i);
    }

    #[test]
    fn test_nth_root() {
        assert!((nth_root(dec!(16), 4).unwrap() - dec!(2)).abs() < dec!(0.000001));
        assert!((nth_root(dec!(2), 2).unwrap() - dec!(1.41421356)).abs() < dec!(0.000001));
        assert!((nth_root(dec!(0.5), 2).unwrap() - dec!(0.70710678)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_simple_payback_interpolates() {
        // Cumulative: -1000, -700, -300, +200 -> 2 + 300/500
        assert_eq!(payback_period(&s1_flows()), dec!(2.6));
    }

    #[test]
    fn test_payback_never_recovered() {
        let flows = vec![dec!(-1000), dec!(100), dec!(100)];
        assert_eq!(payback_period(&flows), NEVER_RECOVERED);
    }

    #[test]
    fn test_payback_immediate() {
        let flows = vec![dec!(50), dec!(100)];
        assert_eq!(payback_period(&flows), Decimal::ZERO);
    }

    #[test]
    fn test_discounted_payback_exceeds_simple() {
        let simple = payback_period(&s1_flows());
        let discounted = discounted_payback_period(&s1_flows(), dec!(10));
        assert!(discounted >= simple, "{discounted} < {simple}");
        assert!(discounted > dec!(3) && discounted < dec!(4));
    }

    #[test]
    fn test_roi() {
        assert_eq!(roi(dec!(250), dec!(1000)), dec!(25));
        assert_eq!(roi(dec!(250), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_benefit_cost_ratio() {
        let bcr = benefit_cost_ratio(&s1_flows(), dec!(10));
        // benefits = PV of 300..600 = 1388.77; costs = 1000
        assert!((bcr - dec!(1.3888)).abs() < dec!(0.001), "got {bcr}");
    }

    #[test]
    fn test_benefit_cost_ratio_zero_costs() {
        let flows = vec![dec!(0), dec!(100), dec!(100)];
        assert_eq!(benefit_cost_ratio(&flows, dec!(10)), Decimal::ZERO);
        assert_eq!(benefit_cost_ratio(&[], dec!(10)), Decimal::ZERO);
    }

    #[test]
    fn test_break_even_reference() {
        let point = break_even(&BreakEvenInputs {
            fixed_costs: dec!(10000),
            unit_price: dec!(100),
            variable_cost_per_unit: dec!(60),
        });
        assert_eq!(point.units, dec!(250));
        assert_eq!(point.revenue, dec!(25000));
    }

    #[test]
    fn test_break_even_non_positive_margin() {
        let point = break_even(&BreakEvenInputs {
            fixed_costs: dec!(10000),
            unit_price: dec!(100),
            variable_cost_per_unit: dec!(100),
        });
        assert_eq!(point, BreakEvenPoint::undefined());

        let inverted = break_even(&BreakEvenInputs {
            fixed_costs: dec!(10000),
            unit_price: dec!(50),
            variable_cost_per_unit: dec!(80),
        });
        assert_eq!(inverted.units, dec!(-1));
        assert_eq!(inverted.revenue, dec!(-1));
    }
}
