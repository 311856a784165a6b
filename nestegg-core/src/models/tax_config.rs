use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-year calculator configuration shared by every authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub tax_year: i32,
    pub standard_deduction: Decimal,
}
