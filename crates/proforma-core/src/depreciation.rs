use rust_decimal::Decimal;

use crate::types::{fraction, DepreciationMethod, Money, Percent};

/// Depreciation charge attributable to a single year.
///
/// Straight-line spreads `cost - salvage` evenly over the useful life.
/// Declining balance applies `rate` to the running book value, clamped so the
/// book value never falls below salvage. Outside the
/// `[purchase_year, purchase_year + useful_life)` window the charge is zero,
/// which also covers `useful_life == 0`. A cost at or below salvage
/// depreciates nothing.
///
/// The kernel knows nothing about investment categories; callers filter out
/// non-depreciable assets before asking.
pub fn annual_charge(
    cost: Money,
    salvage_value: Money,
    useful_life: u32,
    rate: Percent,
    method: DepreciationMethod,
    purchase_year: u32,
    query_year: u32,
) -> Money {
    if query_year < purchase_year || query_year - purchase_year >= useful_life {
        return Decimal::ZERO;
    }
    if cost <= salvage_value {
        return Decimal::ZERO;
    }

    match method {
        DepreciationMethod::StraightLine => {
            (cost - salvage_value) / Decimal::from(useful_life)
        }
        DepreciationMethod::DecliningBalance => {
            let r = fraction(rate);
            let mut book_value = cost;
            let mut charge = Decimal::ZERO;
            for _ in purchase_year..=query_year {
                charge = (book_value * r).min(book_value - salvage_value);
                if charge < Decimal::ZERO {
                    charge = Decimal::ZERO;
                }
                book_value -= charge;
            }
            charge
        }
        DepreciationMethod::None => Decimal::ZERO,
    }
}

/// Accumulated depreciation from the purchase year through `query_year`
/// inclusive, clamped to `cost - salvage`.
pub fn accumulated(
    cost: Money,
    salvage_value: Money,
    useful_life: u32,
    rate: Percent,
    method: DepreciationMethod,
    purchase_year: u32,
    query_year: u32,
) -> Money {
    if query_year < purchase_year || cost <= salvage_value {
        return Decimal::ZERO;
    }

    let last = query_year.min(purchase_year + useful_life.saturating_sub(1));
    let mut total = Decimal::ZERO;
    for year in purchase_year..=last {
        total += annual_charge(
            cost,
            salvage_value,
            useful_life,
            rate,
            method,
            purchase_year,
            year,
        );
    }
    total.min(cost - salvage_value)
}

/// First year a declining-balance asset's book value reaches the salvage
/// floor, if that happens before the useful life runs out. Later years then
/// charge nothing; the projection surfaces this as a diagnostic.
pub fn salvage_floor_year(
    cost: Money,
    salvage_value: Money,
    useful_life: u32,
    rate: Percent,
    purchase_year: u32,
) -> Option<u32> {
    if useful_life < 2 || cost <= salvage_value {
        return None;
    }
    for year in purchase_year..purchase_year + useful_life - 1 {
        let accum = accumulated(
            cost,
            salvage_value,
            useful_life,
            rate,
            DepreciationMethod::DecliningBalance,
            purchase_year,
            year,
        );
        if accum >= cost - salvage_value {
            return Some(year);
        }
    }
    None
}
