use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use nestegg_core::{
    BracketTable, BracketTableError, BracketTier, CalculatorRepository, RepositoryError,
};

/// Errors that can occur when loading bracket tier data.
#[derive(Debug, Error)]
pub enum BracketTierLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Schedule for authority '{authority}' is invalid: {source}")]
    InvalidTable {
        authority: String,
        #[source]
        source: BracketTableError,
    },

    #[error("Authority '{0}' not found in database (have you run the seeds?)")]
    AuthorityNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for BracketTierLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketTierLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the bracket tiers CSV file.
///
/// Columns:
/// - `authority`: the authority name the tier belongs to (e.g. `federal`)
/// - `lower_bound`: the tier's lower income bound
/// - `upper_bound`: the tier's upper income bound (empty for unbounded)
/// - `rate`: the marginal rate as a decimal (e.g. 0.10 for 10%)
///
/// Tiers must appear in ascending order per authority; the grouped tiers are
/// run through [`BracketTable::new`] before anything is written.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketTierRecord {
    pub authority: String,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket schedules from CSV files.
///
/// Works against any [`CalculatorRepository`] backend: records are parsed,
/// grouped by authority, validated into whole tables, and then stored with
/// a delete-and-reinsert per authority, so loading is idempotent.
pub struct BracketTierLoader;

impl BracketTierLoader {
    /// Parse bracket tier records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketTierRecord>, BracketTierLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketTierRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records by authority (first-seen order, file order within each
    /// authority) and validate each group into a [`BracketTable`].
    pub fn validate(
        records: &[BracketTierRecord],
    ) -> Result<Vec<(String, BracketTable)>, BracketTierLoaderError> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: std::collections::HashMap<String, Vec<BracketTier>> =
            std::collections::HashMap::new();

        for record in records {
            let tiers = groups.entry(record.authority.clone()).or_insert_with(|| {
                order.push(record.authority.clone());
                Vec::new()
            });
            tiers.push(BracketTier {
                lower_bound: record.lower_bound,
                upper_bound: record.upper_bound,
                rate: record.rate,
            });
        }

        order
            .into_iter()
            .map(|authority| {
                let tiers = groups.remove(&authority).unwrap_or_default();
                let table = BracketTable::new(tiers).map_err(|source| {
                    BracketTierLoaderError::InvalidTable {
                        authority: authority.clone(),
                        source,
                    }
                })?;
                Ok((authority, table))
            })
            .collect()
    }

    /// Validate and store the records, replacing each authority's existing
    /// schedule. Returns the number of tiers written.
    pub async fn load<R: CalculatorRepository + ?Sized>(
        repo: &R,
        records: &[BracketTierRecord],
    ) -> Result<usize, BracketTierLoaderError> {
        let tables = Self::validate(records)?;
        let mut written = 0;

        for (authority, table) in &tables {
            repo.replace_bracket_tiers(authority, table)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => {
                        BracketTierLoaderError::AuthorityNotFound(authority.clone())
                    }
                    other => BracketTierLoaderError::Repository(other),
                })?;
            written += table.len();
        }

        Ok(written)
    }
}
