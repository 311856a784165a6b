use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted projection: the inputs plus the final balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRun {
    pub id: i64,
    pub initial_balance: Decimal,
    pub periodic_contribution: Decimal,
    pub periodic_rate: Decimal,
    pub contribution_periods: u32,
    pub total_periods: u32,
    pub final_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// For saving new projections (no id or timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProjectionRun {
    pub initial_balance: Decimal,
    pub periodic_contribution: Decimal,
    pub periodic_rate: Decimal,
    pub contribution_periods: u32,
    pub total_periods: u32,
    pub final_balance: Decimal,
}

/// A persisted tax estimate for the shipped federal + state configuration:
/// every input plus the computed AGI, liabilities, and refund/owed figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRun {
    pub id: i64,
    pub wages: Decimal,
    pub short_term_gains: Decimal,
    pub business_profit: Decimal,
    pub retirement_contribution: Decimal,
    pub mortgage_interest: Decimal,
    pub property_tax: Decimal,
    pub credit_eligible_expenses: Decimal,
    pub federal_withholding: Decimal,
    pub state_withholding: Decimal,
    pub agi: Decimal,
    pub federal_liability: Decimal,
    pub federal_refund_or_owed: Decimal,
    pub state_liability: Decimal,
    pub state_refund_or_owed: Decimal,
    pub created_at: DateTime<Utc>,
}

/// For saving new tax estimates (no id or timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxRun {
    pub wages: Decimal,
    pub short_term_gains: Decimal,
    pub business_profit: Decimal,
    pub retirement_contribution: Decimal,
    pub mortgage_interest: Decimal,
    pub property_tax: Decimal,
    pub credit_eligible_expenses: Decimal,
    pub federal_withholding: Decimal,
    pub state_withholding: Decimal,
    pub agi: Decimal,
    pub federal_liability: Decimal,
    pub federal_refund_or_owed: Decimal,
    pub state_liability: Decimal,
    pub state_refund_or_owed: Decimal,
}
