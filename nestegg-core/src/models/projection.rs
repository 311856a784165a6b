use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a period falls in the contribution phase or the growth-only phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionPhase {
    Contribution,
    Growth,
}

impl ProjectionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::Growth => "growth",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contribution" => Some(Self::Contribution),
            "growth" => Some(Self::Growth),
            _ => None,
        }
    }
}

/// The balance at the end of one period of a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// 1-based period number.
    pub period: u32,
    /// End-of-period balance, rounded to two decimal places.
    pub balance: Decimal,
    pub phase: ProjectionPhase,
}
