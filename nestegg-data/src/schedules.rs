//! The shipped 2024 configuration.
//!
//! These mirror the seed SQL in `nestegg-db-sqlite/seeds` and let front ends
//! run without a database. Tables go through [`BracketTable::new`], so the
//! coverage invariant is machine-checked here too.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use nestegg_core::{
    AuthoritySpec, BracketTable, BracketTier, CreditRule, TaxConfig, TaxableIncomeBasis,
};

pub const TAX_YEAR: i32 = 2024;

/// 2024 standard deduction, married filing jointly.
pub fn standard_deduction_2024() -> Decimal {
    dec!(29200)
}

pub fn tax_config_2024() -> TaxConfig {
    TaxConfig {
        tax_year: TAX_YEAR,
        standard_deduction: standard_deduction_2024(),
    }
}

/// 2024 federal schedule, married filing jointly, with the dependent-care
/// style credit (20% of up to 6000 of eligible expenses).
pub fn federal_2024_mfj() -> AuthoritySpec {
    let brackets = BracketTable::new(vec![
        BracketTier::new(dec!(0), Some(dec!(23200)), dec!(0.10)),
        BracketTier::new(dec!(23200), Some(dec!(94300)), dec!(0.12)),
        BracketTier::new(dec!(94300), Some(dec!(201050)), dec!(0.22)),
        BracketTier::new(dec!(201050), Some(dec!(383900)), dec!(0.24)),
        BracketTier::new(dec!(383900), Some(dec!(487450)), dec!(0.32)),
        BracketTier::new(dec!(487450), Some(dec!(731200)), dec!(0.35)),
        BracketTier::new(dec!(731200), None, dec!(0.37)),
    ])
    .expect("shipped federal schedule is contiguous");

    AuthoritySpec {
        name: "federal".to_string(),
        basis: TaxableIncomeBasis::AdjustedGross,
        brackets,
        credit: Some(CreditRule {
            expense_cap: dec!(6000),
            rate: dec!(0.20),
        }),
    }
}

/// 2024 New York schedule.
pub fn new_york_2024() -> AuthoritySpec {
    let brackets = BracketTable::new(vec![
        BracketTier::new(dec!(0), Some(dec!(17150)), dec!(0.04)),
        BracketTier::new(dec!(17150), Some(dec!(23600)), dec!(0.045)),
        BracketTier::new(dec!(23600), Some(dec!(27900)), dec!(0.0525)),
        BracketTier::new(dec!(27900), Some(dec!(43000)), dec!(0.059)),
        BracketTier::new(dec!(43000), Some(dec!(161550)), dec!(0.0597)),
        BracketTier::new(dec!(161550), Some(dec!(323200)), dec!(0.0633)),
        BracketTier::new(dec!(323200), Some(dec!(2155350)), dec!(0.0685)),
        BracketTier::new(dec!(2155350), None, dec!(0.10)),
    ])
    .expect("shipped New York schedule is contiguous");

    AuthoritySpec {
        name: "state".to_string(),
        basis: TaxableIncomeBasis::WagesOnly,
        brackets,
        credit: None,
    }
}

/// Both shipped authorities in evaluation order: federal first, then state.
pub fn shipped_authorities() -> Vec<AuthoritySpec> {
    vec![federal_2024_mfj(), new_york_2024()]
}
