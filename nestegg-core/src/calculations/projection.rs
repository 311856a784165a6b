//! Savings growth projection.
//!
//! The projection runs in two phases over a single running balance:
//!
//! - **Contribution phase** (periods `1..=contribution_periods`): the periodic
//!   contribution is deposited at the end of the period, then the whole
//!   balance compounds — `balance = (balance + contribution) × (1 + rate)`.
//! - **Growth phase** (remaining periods up to `total_periods`): the balance
//!   compounds with no further deposits.
//!
//! Each emitted balance is rounded to two decimal places, and the rounded
//! value is what carries into the next period.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use nestegg_core::calculations::{ProjectionInput, project};
//! use nestegg_core::ProjectionPhase;
//!
//! let input = ProjectionInput {
//!     initial_balance: dec!(0),
//!     periodic_contribution: dec!(60000),
//!     periodic_rate: dec!(0.07),
//!     contribution_periods: 30,
//!     total_periods: 40,
//! };
//!
//! let points = project(&input).unwrap();
//!
//! assert_eq!(points.len(), 40);
//! assert_eq!(points[0].balance, dec!(64200.00));
//! assert_eq!(points[0].phase, ProjectionPhase::Contribution);
//! assert_eq!(points[30].phase, ProjectionPhase::Growth);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_half_up;
use crate::models::{ProjectionPhase, ProjectionPoint};

/// Errors that can occur when starting a projection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    /// The contribution phase cannot be longer than the whole projection.
    #[error("contribution periods ({contribution_periods}) exceed total periods ({total_periods})")]
    ContributionPeriodsExceedTotal {
        contribution_periods: u32,
        total_periods: u32,
    },
}

/// Inputs for one projection.
///
/// `periodic_rate` is a per-period fraction (0.07 means 7% per period) and
/// may be negative to model a sustained loss; no floor is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub initial_balance: Decimal,
    pub periodic_contribution: Decimal,
    pub periodic_rate: Decimal,
    pub contribution_periods: u32,
    pub total_periods: u32,
}

/// Runs the projection and returns one point per period, in period order.
///
/// `total_periods == 0` yields an empty sequence, and
/// `contribution_periods == total_periods` yields an empty growth phase;
/// both are valid.
///
/// # Errors
///
/// Returns [`ProjectionError::ContributionPeriodsExceedTotal`] when
/// `contribution_periods > total_periods`. This is a contract violation by
/// the caller, reported explicitly rather than clamped.
pub fn project(input: &ProjectionInput) -> Result<Vec<ProjectionPoint>, ProjectionError> {
    if input.contribution_periods > input.total_periods {
        return Err(ProjectionError::ContributionPeriodsExceedTotal {
            contribution_periods: input.contribution_periods,
            total_periods: input.total_periods,
        });
    }

    let growth_factor = Decimal::ONE + input.periodic_rate;
    let mut points = Vec::with_capacity(input.total_periods as usize);
    let mut balance = input.initial_balance;

    for period in 1..=input.contribution_periods {
        balance = round_half_up((balance + input.periodic_contribution) * growth_factor);
        points.push(ProjectionPoint {
            period,
            balance,
            phase: ProjectionPhase::Contribution,
        });
    }

    for period in input.contribution_periods + 1..=input.total_periods {
        balance = round_half_up(balance * growth_factor);
        points.push(ProjectionPoint {
            period,
            balance,
            phase: ProjectionPhase::Growth,
        });
    }

    Ok(points)
}
