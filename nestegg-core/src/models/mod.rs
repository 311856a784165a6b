mod authority;
mod bracket;
mod income;
mod projection;
mod run;
mod tax_config;
mod tax_result;

pub use authority::{AuthoritySpec, CreditRule, TaxableIncomeBasis};
pub use bracket::{BracketTable, BracketTableError, BracketTier};
pub use income::IncomeInputs;
pub use projection::{ProjectionPhase, ProjectionPoint};
pub use run::{NewProjectionRun, NewTaxRun, ProjectionRun, TaxRun};
pub use tax_config::TaxConfig;
pub use tax_result::{AuthorityOutcome, TaxResult};
