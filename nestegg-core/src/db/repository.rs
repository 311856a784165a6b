use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AuthoritySpec, BracketTable, NewProjectionRun, NewTaxRun, ProjectionRun, TaxConfig, TaxRun,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage boundary for the calculators.
///
/// Holds the per-year configuration (authorities with their bracket
/// schedules) and the saved runs. The engines themselves never touch this;
/// callers load configuration, compute, and persist results.
#[async_trait]
pub trait CalculatorRepository: Send + Sync {
    // Tax configuration
    async fn get_tax_config(&self, tax_year: i32) -> Result<TaxConfig, RepositoryError>;

    // Authorities and their bracket schedules
    async fn get_authority(&self, name: &str) -> Result<AuthoritySpec, RepositoryError>;
    async fn list_authorities(&self) -> Result<Vec<String>, RepositoryError>;
    async fn replace_bracket_tiers(
        &self,
        authority: &str,
        table: &BracketTable,
    ) -> Result<(), RepositoryError>;

    // Saved projections
    async fn create_projection_run(
        &self,
        run: NewProjectionRun,
    ) -> Result<ProjectionRun, RepositoryError>;

    /// Most recent runs first, at most `limit`.
    async fn list_projection_runs(
        &self,
        limit: u32,
    ) -> Result<Vec<ProjectionRun>, RepositoryError>;

    async fn delete_projection_run(&self, id: i64) -> Result<(), RepositoryError>;

    // Saved tax estimates
    async fn create_tax_run(&self, run: NewTaxRun) -> Result<TaxRun, RepositoryError>;

    /// Most recent runs first, at most `limit`.
    async fn list_tax_runs(&self, limit: u32) -> Result<Vec<TaxRun>, RepositoryError>;

    async fn delete_tax_run(&self, id: i64) -> Result<(), RepositoryError>;
}
