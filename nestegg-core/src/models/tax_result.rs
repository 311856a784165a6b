use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-authority outcome of a tax estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityOutcome {
    pub authority: String,
    pub taxable_income: Decimal,
    pub liability: Decimal,
    /// Withholding minus liability: positive is a refund, negative is an
    /// amount owed.
    pub refund_or_owed: Decimal,
}

/// The complete result of one tax estimate across all configured authorities.
///
/// `outcomes` preserves the authority order the calculator was given;
/// [`liability_for`] and [`refund_or_owed_for`] give a by-name view.
///
/// [`liability_for`]: TaxResult::liability_for
/// [`refund_or_owed_for`]: TaxResult::refund_or_owed_for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub agi: Decimal,
    /// The shared deduction figure: `max(standard, itemized)`.
    pub deductions: Decimal,
    /// Taxable income of the first adjusted-gross-basis authority, or zero
    /// when no such authority is configured.
    pub taxable_income: Decimal,
    pub outcomes: Vec<AuthorityOutcome>,
}

impl TaxResult {
    pub fn outcome_for(
        &self,
        authority: &str,
    ) -> Option<&AuthorityOutcome> {
        self.outcomes.iter().find(|o| o.authority == authority)
    }

    pub fn liability_for(
        &self,
        authority: &str,
    ) -> Option<Decimal> {
        self.outcome_for(authority).map(|o| o.liability)
    }

    pub fn refund_or_owed_for(
        &self,
        authority: &str,
    ) -> Option<Decimal> {
        self.outcome_for(authority).map(|o| o.refund_or_owed)
    }
}
