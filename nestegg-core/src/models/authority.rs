use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bracket::BracketTable;

/// Which income figure an authority taxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxableIncomeBasis {
    /// Full adjusted gross income less deductions (federal style).
    AdjustedGross,
    /// Wages only, less deductions and the retirement contribution
    /// (state style).
    WagesOnly,
}

impl TaxableIncomeBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdjustedGross => "agi",
            Self::WagesOnly => "wages",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agi" => Some(Self::AdjustedGross),
            "wages" => Some(Self::WagesOnly),
            _ => None,
        }
    }
}

/// A credit subtracted from an authority's liability:
/// `min(eligible expenses, expense_cap) × rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRule {
    pub expense_cap: Decimal,
    pub rate: Decimal,
}

/// One taxing authority: a name, the income basis it taxes, its bracket
/// schedule, and an optional expense credit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthoritySpec {
    pub name: String,
    pub basis: TaxableIncomeBasis,
    pub brackets: BracketTable,
    pub credit: Option<CreditRule>,
}
