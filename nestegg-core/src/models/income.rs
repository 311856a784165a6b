use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The scalar inputs to a tax estimate.
///
/// Values are accepted as given; range checking belongs to whatever collects
/// them (a form, CLI flags, an OCR pre-fill step).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeInputs {
    pub wages: Decimal,
    pub short_term_gains: Decimal,
    pub business_profit: Decimal,
    /// Pre-tax retirement contribution (e.g. a 401(k) deferral).
    pub retirement_contribution: Decimal,
    pub mortgage_interest: Decimal,
    pub property_tax: Decimal,
    /// Expenses eligible for an authority's [`CreditRule`], if it has one.
    ///
    /// [`CreditRule`]: super::CreditRule
    pub credit_eligible_expenses: Decimal,
    /// Tax already withheld, keyed by authority name. A missing entry
    /// counts as zero.
    pub withholding: BTreeMap<String, Decimal>,
}

impl IncomeInputs {
    pub fn withholding_for(
        &self,
        authority: &str,
    ) -> Decimal {
        self.withholding
            .get(authority)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}
