use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed in percent (`10` means ten percent). The engine is the
/// sole place where the `/100` conversion happens.
pub type Percent = Decimal;

/// Rates expressed as decimal fractions (0.10 = 10%). Internal to the
/// engine's arithmetic; never crosses the serde boundary.
pub type Rate = Decimal;

/// Convert a percent-denominated rate into a decimal fraction.
pub(crate) fn fraction(p: Percent) -> Rate {
    p / dec!(100)
}

// ---------------------------------------------------------------------------
// Project model (input)
// ---------------------------------------------------------------------------

/// Immutable per-run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParameters {
    /// Years of the construction phase (absolute years `0..constructionYears`)
    pub construction_years: u32,
    /// Years of operation; operating year `o` maps to absolute year
    /// `constructionYears + o`
    pub operation_years: u32,
    /// Discount rate in percent
    pub discount_rate: Percent,
    /// Inflation rate in percent (carried on the model; escalation is always
    /// explicit per product/cost)
    pub inflation_rate: Percent,
    /// Corporate tax rate in percent
    pub tax_rate: Percent,
    /// Calendar date of project start (absolute year 0)
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentCategory {
    Land,
    Buildings,
    Machinery,
    Equipment,
    Vehicles,
    Furniture,
    Preproduction,
    WorkingCapital,
    Other,
}

impl InvestmentCategory {
    /// Land and working capital never depreciate, regardless of the stated
    /// method.
    pub fn is_depreciable(&self) -> bool {
        !matches!(
            self,
            InvestmentCategory::Land | InvestmentCategory::WorkingCapital
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    StraightLine,
    DecliningBalance,
    None,
}

/// A single capital expenditure item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub category: InvestmentCategory,
    pub amount: Money,
    /// Absolute year of purchase
    pub year: u32,
    pub useful_life: u32,
    pub salvage_value: Money,
    pub depreciation_method: DepreciationMethod,
    /// Declining-balance rate in percent; ignored by other methods
    pub depreciation_rate: Percent,
}

/// One row of a product's production schedule. Operating years without a row
/// produce zero output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionYear {
    /// Operating year (1-based)
    pub year: u32,
    pub capacity_utilization: Percent,
    /// Authoritative output quantity for the year
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub unit: String,
    pub unit_price: Money,
    /// Annual price escalation in percent, compounded from operating year 1
    pub price_escalation: Percent,
    pub installed_capacity: Decimal,
    pub capacity_unit: String,
    /// Ordered by year; years are unique
    pub production_schedule: Vec<ProductionYear>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Fixed,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingCost {
    pub category: String,
    pub description: String,
    pub cost_type: CostType,
    /// First-year annual amount; escalated from `start_year`
    pub amount: Money,
    /// Per-unit cost; only used for break-even
    pub unit_cost: Money,
    pub escalation_rate: Percent,
    /// First operating year (1-based) the cost applies
    pub start_year: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingType {
    Equity,
    Loan,
    Grant,
}

/// A financing instrument. Interest, term and grace only apply to loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    #[serde(rename = "type")]
    pub financing_type: FinancingType,
    pub name: String,
    pub amount: Money,
    pub interest_rate: Percent,
    pub term_years: u32,
    pub grace_period: u32,
    /// Absolute year the funds arrive
    pub disbursement_year: u32,
    /// Absolute year the first repayment row falls in (loans only)
    pub repayment_start_year: u32,
}

/// Frozen snapshot of a fully-specified investment project. Assembled by the
/// caller, passed by reference into the engine, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    pub parameters: ProjectParameters,
    pub investments: Vec<Investment>,
    pub products: Vec<Product>,
    pub operating_costs: Vec<OperatingCost>,
    pub financings: Vec<Financing>,
}

impl ProjectModel {
    /// Last absolute year of the projection horizon.
    pub fn horizon(&self) -> u32 {
        self.parameters.construction_years + self.parameters.operation_years
    }
}

// ---------------------------------------------------------------------------
// Computation envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope. `warnings` carries recoverable
/// degenerate-case diagnostics; they never affect numeric correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_non_depreciable_categories() {
        assert!(!InvestmentCategory::Land.is_depreciable());
        assert!(!InvestmentCategory::WorkingCapital.is_depreciable());
        assert!(InvestmentCategory::Machinery.is_depreciable());
        assert!(InvestmentCategory::Preproduction.is_depreciable());
    }

    #[test]
    fn test_fraction_conversion() {
        assert_eq!(fraction(dec!(10)), dec!(0.1));
        assert_eq!(fraction(dec!(0)), dec!(0));
        assert_eq!(fraction(dec!(100)), dec!(1));
    }

    #[test]
    fn test_model_round_trips_through_json() {
        let json = r#"{
            "parameters": {
                "constructionYears": 1,
                "operationYears": 5,
                "discountRate": 10,
                "inflationRate": 2,
                "taxRate": 25,
                "startDate": "2026-01-01"
            },
            "investments": [{
                "category": "machinery",
                "amount": 50000,
                "year": 0,
                "usefulLife": 10,
                "salvageValue": 5000,
                "depreciationMethod": "straight_line",
                "depreciationRate": 0
            }],
            "products": [{
                "name": "Widget",
                "unit": "piece",
                "unitPrice": 12.5,
                "priceEscalation": 3,
                "installedCapacity": 10000,
                "capacityUnit": "piece/yr",
                "productionSchedule": [
                    {"year": 1, "capacityUtilization": 60, "quantity": 6000}
                ]
            }],
            "operatingCosts": [{
                "category": "materials",
                "description": "Raw materials",
                "costType": "variable",
                "amount": 30000,
                "unitCost": 5,
                "escalationRate": 2,
                "startYear": 1
            }],
            "financings": [{
                "type": "loan",
                "name": "Term loan",
                "amount": 40000,
                "interestRate": 8,
                "termYears": 5,
                "gracePeriod": 1,
                "disbursementYear": 0,
                "repaymentStartYear": 1
            }]
        }"#;
        let model: ProjectModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.horizon(), 6);
        assert_eq!(model.financings[0].financing_type, FinancingType::Loan);

        let back = serde_json::to_value(&model).unwrap();
        let reparsed: ProjectModel = serde_json::from_value(back).unwrap();
        assert_eq!(model, reparsed);
    }

    #[test]
    fn test_unknown_category_rejected_at_the_boundary() {
        let json = r#"{"category": "spaceships", "amount": 1, "year": 0,
            "usefulLife": 1, "salvageValue": 0,
            "depreciationMethod": "none", "depreciationRate": 0}"#;
        assert!(serde_json::from_str::<Investment>(json).is_err());
    }
}
