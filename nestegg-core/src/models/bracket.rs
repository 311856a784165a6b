//! Progressive tax bracket configuration.
//!
//! A [`BracketTable`] is an ordered list of [`BracketTier`]s that must cover
//! `[0, ∞)` with no gaps and no overlaps. The invariant is checked once, at
//! construction, so the calculation code can walk the tiers without
//! re-validating them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One contiguous income range taxed at a single marginal rate.
///
/// `upper_bound` is `None` for the final, unbounded tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTier {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl BracketTier {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }
}

/// Errors raised when a tier list does not form a valid bracket table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table has no tiers")]
    Empty,

    #[error("first tier must start at 0, found {lower_bound}")]
    FirstTierNotZero { lower_bound: Decimal },

    #[error("tier {index} rate {rate} is outside [0, 1]")]
    RateOutOfRange { index: usize, rate: Decimal },

    #[error("tier {index} upper bound {upper_bound} does not exceed its lower bound {lower_bound}")]
    EmptyTierSpan {
        index: usize,
        lower_bound: Decimal,
        upper_bound: Decimal,
    },

    #[error("tier {index} is unbounded but is not the final tier")]
    UnboundedTierBeforeEnd { index: usize },

    #[error("final tier must be unbounded, found upper bound {upper_bound}")]
    FinalTierBounded { upper_bound: Decimal },

    #[error("tier {index} ends at {upper_bound} but the next tier starts at {next_lower_bound}")]
    NonContiguous {
        index: usize,
        upper_bound: Decimal,
        next_lower_bound: Decimal,
    },
}

/// A validated progressive bracket schedule.
///
/// Construct with [`BracketTable::new`]; once built, the tiers are guaranteed
/// to start at 0, be contiguous and non-overlapping, end with a single
/// unbounded tier, and carry rates in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    tiers: Vec<BracketTier>,
}

impl BracketTable {
    /// Validates `tiers` and wraps them into a table.
    ///
    /// # Errors
    ///
    /// Returns a [`BracketTableError`] describing the first violation found.
    pub fn new(tiers: Vec<BracketTier>) -> Result<Self, BracketTableError> {
        if tiers.is_empty() {
            return Err(BracketTableError::Empty);
        }

        let first = &tiers[0];
        if first.lower_bound != Decimal::ZERO {
            return Err(BracketTableError::FirstTierNotZero {
                lower_bound: first.lower_bound,
            });
        }

        let last_index = tiers.len() - 1;
        for (index, tier) in tiers.iter().enumerate() {
            if tier.rate < Decimal::ZERO || tier.rate > Decimal::ONE {
                return Err(BracketTableError::RateOutOfRange {
                    index,
                    rate: tier.rate,
                });
            }

            match tier.upper_bound {
                Some(upper) if upper <= tier.lower_bound => {
                    return Err(BracketTableError::EmptyTierSpan {
                        index,
                        lower_bound: tier.lower_bound,
                        upper_bound: upper,
                    });
                }
                Some(upper) if index == last_index => {
                    return Err(BracketTableError::FinalTierBounded { upper_bound: upper });
                }
                Some(upper) => {
                    let next = &tiers[index + 1];
                    if next.lower_bound != upper {
                        return Err(BracketTableError::NonContiguous {
                            index,
                            upper_bound: upper,
                            next_lower_bound: next.lower_bound,
                        });
                    }
                }
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedTierBeforeEnd { index });
                }
                None => {}
            }
        }

        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[BracketTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
