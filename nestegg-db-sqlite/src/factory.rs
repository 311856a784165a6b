use std::path::PathBuf;

use async_trait::async_trait;

use nestegg_core::db::repository::{CalculatorRepository, RepositoryError};
use nestegg_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`NESTEGG_DB_SQLITE_SEEDS_DIR`** — if set, use this path (override for
///    packagers or custom layouts).
/// 2. **`./seeds`** — if the directory exists in the current working directory.
/// 3. **Crate manifest dir** — `$CARGO_MANIFEST_DIR/seeds` as last resort
///    (dev/tests when run from the build tree).
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NESTEGG_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`nestegg_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use nestegg_core::db::RepositoryRegistry;
/// use nestegg_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A sqlx-style URL — e.g. `"sqlite:nestegg.db?mode=rwc"`.
    /// * `":memory:"` — an ephemeral in-memory database (useful for tests).
    ///
    /// Migrations run first, then seed SQL files are loaded from a directory
    /// resolved at runtime (see [`seeds_dir`]).
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CalculatorRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string).await?;
        repo.run_migrations().await?;
        repo.run_seeds(&seeds_dir()).await?;
        Ok(Box::new(repo))
    }
}
