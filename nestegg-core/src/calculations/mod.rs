//! Calculation engines.
//!
//! Both engines are pure functions over already-resolved scalar inputs:
//! [`projection`] compounds a savings balance across a contribution phase and
//! a growth-only phase, and [`tax`] runs a marginal bracket computation per
//! configured authority. Neither performs any I/O.

pub mod common;
pub mod projection;
pub mod tax;

pub use projection::{ProjectionError, ProjectionInput, project};
pub use tax::TaxCalculator;
