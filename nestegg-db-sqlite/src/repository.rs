use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, sqlite::SqlitePool};

use nestegg_core::{
    AuthoritySpec, BracketTable, BracketTier, CalculatorRepository, CreditRule, NewProjectionRun,
    NewTaxRun, ProjectionRun, RepositoryError, TaxConfig, TaxRun, TaxableIncomeBasis,
};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<(), RepositoryError> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .map_err(|e| {
                RepositoryError::Configuration(format!(
                    "cannot read seeds directory '{}': {}",
                    seeds_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path).map_err(|e| {
                RepositoryError::Configuration(format!(
                    "cannot read seed file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    RepositoryError::Database(format!(
                        "seed file '{}' failed: {}",
                        path.display(),
                        e
                    ))
                })?;

            tracing::debug!(seed = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(FromRow)]
struct TaxConfigRow {
    tax_year: i32,
    standard_deduction: String,
}

impl TryFrom<TaxConfigRow> for TaxConfig {
    type Error = RepositoryError;

    fn try_from(row: TaxConfigRow) -> Result<Self, Self::Error> {
        Ok(TaxConfig {
            tax_year: row.tax_year,
            standard_deduction: parse_decimal(&row.standard_deduction)?,
        })
    }
}

#[derive(FromRow)]
struct AuthorityRow {
    name: String,
    basis: String,
    credit_expense_cap: Option<String>,
    credit_rate: Option<String>,
}

#[derive(FromRow)]
struct BracketTierRow {
    lower_bound: String,
    upper_bound: Option<String>,
    rate: String,
}

impl TryFrom<BracketTierRow> for BracketTier {
    type Error = RepositoryError;

    fn try_from(row: BracketTierRow) -> Result<Self, Self::Error> {
        Ok(BracketTier {
            lower_bound: parse_decimal(&row.lower_bound)?,
            upper_bound: parse_optional_decimal(&row.upper_bound)?,
            rate: parse_decimal(&row.rate)?,
        })
    }
}

#[derive(FromRow)]
struct ProjectionRunRow {
    id: i64,
    initial_balance: String,
    periodic_contribution: String,
    periodic_rate: String,
    contribution_periods: i64,
    total_periods: i64,
    final_balance: String,
    created_at: String,
}

impl TryFrom<ProjectionRunRow> for ProjectionRun {
    type Error = RepositoryError;

    fn try_from(row: ProjectionRunRow) -> Result<Self, Self::Error> {
        Ok(ProjectionRun {
            id: row.id,
            initial_balance: parse_decimal(&row.initial_balance)?,
            periodic_contribution: parse_decimal(&row.periodic_contribution)?,
            periodic_rate: parse_decimal(&row.periodic_rate)?,
            contribution_periods: parse_periods(row.contribution_periods)?,
            total_periods: parse_periods(row.total_periods)?,
            final_balance: parse_decimal(&row.final_balance)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct TaxRunRow {
    id: i64,
    wages: String,
    short_term_gains: String,
    business_profit: String,
    retirement_contribution: String,
    mortgage_interest: String,
    property_tax: String,
    credit_eligible_expenses: String,
    federal_withholding: String,
    state_withholding: String,
    agi: String,
    federal_liability: String,
    federal_refund_or_owed: String,
    state_liability: String,
    state_refund_or_owed: String,
    created_at: String,
}

impl TryFrom<TaxRunRow> for TaxRun {
    type Error = RepositoryError;

    fn try_from(row: TaxRunRow) -> Result<Self, Self::Error> {
        Ok(TaxRun {
            id: row.id,
            wages: parse_decimal(&row.wages)?,
            short_term_gains: parse_decimal(&row.short_term_gains)?,
            business_profit: parse_decimal(&row.business_profit)?,
            retirement_contribution: parse_decimal(&row.retirement_contribution)?,
            mortgage_interest: parse_decimal(&row.mortgage_interest)?,
            property_tax: parse_decimal(&row.property_tax)?,
            credit_eligible_expenses: parse_decimal(&row.credit_eligible_expenses)?,
            federal_withholding: parse_decimal(&row.federal_withholding)?,
            state_withholding: parse_decimal(&row.state_withholding)?,
            agi: parse_decimal(&row.agi)?,
            federal_liability: parse_decimal(&row.federal_liability)?,
            federal_refund_or_owed: parse_decimal(&row.federal_refund_or_owed)?,
            state_liability: parse_decimal(&row.state_liability)?,
            state_refund_or_owed: parse_decimal(&row.state_refund_or_owed)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    s.parse::<Decimal>()
        .map_err(|e| RepositoryError::Database(format!("Failed to parse decimal '{}': {}", s, e)))
}

fn parse_optional_decimal(s: &Option<String>) -> Result<Option<Decimal>, RepositoryError> {
    s.as_ref().map(|s| parse_decimal(s)).transpose()
}

fn parse_periods(value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Database(format!("Invalid period count {}", value)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    // SQLite stores timestamps in various formats, try common ones
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

fn credit_rule(row: &AuthorityRow) -> Result<Option<CreditRule>, RepositoryError> {
    match (&row.credit_expense_cap, &row.credit_rate) {
        (Some(cap), Some(rate)) => Ok(Some(CreditRule {
            expense_cap: parse_decimal(cap)?,
            rate: parse_decimal(rate)?,
        })),
        (None, None) => Ok(None),
        _ => Err(RepositoryError::Database(format!(
            "Authority '{}' has a partial credit rule",
            row.name
        ))),
    }
}

#[async_trait]
impl CalculatorRepository for SqliteRepository {
    async fn get_tax_config(
        &self,
        tax_year: i32,
    ) -> Result<TaxConfig, RepositoryError> {
        let row: TaxConfigRow = sqlx::query_as(
            "SELECT tax_year, standard_deduction FROM tax_config WHERE tax_year = ?",
        )
        .bind(tax_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn get_authority(
        &self,
        name: &str,
    ) -> Result<AuthoritySpec, RepositoryError> {
        let row: AuthorityRow = sqlx::query_as(
            "SELECT name, basis, credit_expense_cap, credit_rate
             FROM authorities WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        let basis = TaxableIncomeBasis::parse(&row.basis).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid basis code: {}", row.basis))
        })?;
        let credit = credit_rule(&row)?;

        let tier_rows: Vec<BracketTierRow> = sqlx::query_as(
            "SELECT lower_bound, upper_bound, rate
             FROM bracket_tiers WHERE authority = ? ORDER BY position",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let tiers = tier_rows
            .into_iter()
            .map(BracketTier::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // Stored tiers are re-validated on the way out; a table that fails
        // the coverage invariant never reaches a calculator.
        let brackets = BracketTable::new(tiers).map_err(|e| {
            RepositoryError::Database(format!("Stored schedule for '{}' is invalid: {}", name, e))
        })?;

        Ok(AuthoritySpec {
            name: row.name,
            basis,
            brackets,
            credit,
        })
    }

    async fn list_authorities(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM authorities ORDER BY position")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn replace_bracket_tiers(
        &self,
        authority: &str,
        table: &BracketTable,
    ) -> Result<(), RepositoryError> {
        let known: Option<(String,)> =
            sqlx::query_as("SELECT name FROM authorities WHERE name = ?")
                .bind(authority)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
        if known.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM bracket_tiers WHERE authority = ?")
            .bind(authority)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        for (position, tier) in table.tiers().iter().enumerate() {
            sqlx::query(
                "INSERT INTO bracket_tiers (authority, position, lower_bound, upper_bound, rate)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(authority)
            .bind(position as i64 + 1)
            .bind(tier.lower_bound.to_string())
            .bind(tier.upper_bound.map(|d| d.to_string()))
            .bind(tier.rate.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }

    async fn create_projection_run(
        &self,
        run: NewProjectionRun,
    ) -> Result<ProjectionRun, RepositoryError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let result = sqlx::query(
            "INSERT INTO projection_runs (
                initial_balance, periodic_contribution, periodic_rate,
                contribution_periods, total_periods, final_balance, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(run.initial_balance.to_string())
        .bind(run.periodic_contribution.to_string())
        .bind(run.periodic_rate.to_string())
        .bind(i64::from(run.contribution_periods))
        .bind(i64::from(run.total_periods))
        .bind(run.final_balance.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_projection_run(id).await
    }

    async fn list_projection_runs(
        &self,
        limit: u32,
    ) -> Result<Vec<ProjectionRun>, RepositoryError> {
        let rows: Vec<ProjectionRunRow> = sqlx::query_as(
            "SELECT id, initial_balance, periodic_contribution, periodic_rate,
                    contribution_periods, total_periods, final_balance, created_at
             FROM projection_runs ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn delete_projection_run(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM projection_runs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn create_tax_run(
        &self,
        run: NewTaxRun,
    ) -> Result<TaxRun, RepositoryError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let result = sqlx::query(
            "INSERT INTO tax_runs (
                wages, short_term_gains, business_profit, retirement_contribution,
                mortgage_interest, property_tax, credit_eligible_expenses,
                federal_withholding, state_withholding, agi,
                federal_liability, federal_refund_or_owed,
                state_liability, state_refund_or_owed, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(run.wages.to_string())
        .bind(run.short_term_gains.to_string())
        .bind(run.business_profit.to_string())
        .bind(run.retirement_contribution.to_string())
        .bind(run.mortgage_interest.to_string())
        .bind(run.property_tax.to_string())
        .bind(run.credit_eligible_expenses.to_string())
        .bind(run.federal_withholding.to_string())
        .bind(run.state_withholding.to_string())
        .bind(run.agi.to_string())
        .bind(run.federal_liability.to_string())
        .bind(run.federal_refund_or_owed.to_string())
        .bind(run.state_liability.to_string())
        .bind(run.state_refund_or_owed.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_tax_run(id).await
    }

    async fn list_tax_runs(
        &self,
        limit: u32,
    ) -> Result<Vec<TaxRun>, RepositoryError> {
        let rows: Vec<TaxRunRow> = sqlx::query_as(
            "SELECT id, wages, short_term_gains, business_profit, retirement_contribution,
                    mortgage_interest, property_tax, credit_eligible_expenses,
                    federal_withholding, state_withholding, agi,
                    federal_liability, federal_refund_or_owed,
                    state_liability, state_refund_or_owed, created_at
             FROM tax_runs ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn delete_tax_run(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tax_runs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

impl SqliteRepository {
    async fn get_projection_run(
        &self,
        id: i64,
    ) -> Result<ProjectionRun, RepositoryError> {
        let row: ProjectionRunRow = sqlx::query_as(
            "SELECT id, initial_balance, periodic_contribution, periodic_rate,
                    contribution_periods, total_periods, final_balance, created_at
             FROM projection_runs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn get_tax_run(
        &self,
        id: i64,
    ) -> Result<TaxRun, RepositoryError> {
        let row: TaxRunRow = sqlx::query_as(
            "SELECT id, wages, short_term_gains, business_profit, retirement_contribution,
                    mortgage_interest, property_tax, credit_eligible_expenses,
                    federal_withholding, state_withholding, agi,
                    federal_liability, federal_refund_or_owed,
                    state_liability, state_refund_or_owed, created_at
             FROM tax_runs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
