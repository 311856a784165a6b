use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{CalculatorRepository, RepositoryError};

/// Backend-agnostic connection configuration.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is passed through to that factory
/// unchanged; its meaning is entirely backend-specific.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `nestegg.db`, `:memory:`            |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl DbConfig {
    /// Reads the configuration from `NESTEGG_DB_BACKEND` and
    /// `NESTEGG_DB_URL`, falling back to the defaults for whichever is
    /// unset. Connection details never live in source.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: std::env::var("NESTEGG_DB_BACKEND").unwrap_or(defaults.backend),
            connection_string: std::env::var("NESTEGG_DB_URL")
                .unwrap_or(defaults.connection_string),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// One implementation per database backend. Each backend crate exports a
/// single unit struct that implements this trait and is registered with a
/// [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) a connection and return a ready-to-use repository.
    /// Implementations are free to run migrations or warm connection pools
    /// inside this method.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CalculatorRepository>, RepositoryError>;
}

/// Registry of [`RepositoryFactory`] instances, keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory. A factory with the same
    /// [`RepositoryFactory::backend_name`] is silently replaced.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] — no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CalculatorRepository>, RepositoryError> {
        let factory = self.factories.get(config.backend.as_str()).ok_or_else(|| {
            RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            ))
        })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::models::{
        AuthoritySpec, BracketTable, NewProjectionRun, NewTaxRun, ProjectionRun, TaxConfig,
        TaxRun,
    };

    use super::{DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry};
    use super::CalculatorRepository;

    // The registry tests only exercise routing; no repository method is
    // ever called.
    struct StubRepository;

    #[async_trait]
    impl CalculatorRepository for StubRepository {
        async fn get_tax_config(
            &self,
            _tax_year: i32,
        ) -> Result<TaxConfig, RepositoryError> {
            unimplemented!()
        }
        async fn get_authority(
            &self,
            _name: &str,
        ) -> Result<AuthoritySpec, RepositoryError> {
            unimplemented!()
        }
        async fn list_authorities(&self) -> Result<Vec<String>, RepositoryError> {
            unimplemented!()
        }
        async fn replace_bracket_tiers(
            &self,
            _authority: &str,
            _table: &BracketTable,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn create_projection_run(
            &self,
            _run: NewProjectionRun,
        ) -> Result<ProjectionRun, RepositoryError> {
            unimplemented!()
        }
        async fn list_projection_runs(
            &self,
            _limit: u32,
        ) -> Result<Vec<ProjectionRun>, RepositoryError> {
            unimplemented!()
        }
        async fn delete_projection_run(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn create_tax_run(&self, _run: NewTaxRun) -> Result<TaxRun, RepositoryError> {
            unimplemented!()
        }
        async fn list_tax_runs(&self, _limit: u32) -> Result<Vec<TaxRun>, RepositoryError> {
            unimplemented!()
        }
        async fn delete_tax_run(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
    }

    /// Flips a flag when `create` is reached so tests can prove dispatch.
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RepositoryFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn CalculatorRepository>, RepositoryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(StubRepository))
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl RepositoryFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn CalculatorRepository>, RepositoryError> {
            Err(RepositoryError::Connection(
                "intentional failure".to_string(),
            ))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    #[test]
    fn dbconfig_default_is_sqlite_memory() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, ":memory:");
    }

    #[test]
    fn new_registry_has_no_backends() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn available_backends_is_sorted() {
        let mut reg = RepositoryRegistry::new();
        let (f1, _) = stub_factory("sqlite");
        let (f2, _) = stub_factory("postgres");
        reg.register(f1);
        reg.register(f2);
        assert_eq!(reg.available_backends(), vec!["postgres", "sqlite"]);
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = RepositoryRegistry::new();
        let (old, _) = stub_factory("sqlite");
        let (new, _) = stub_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn create_calls_matching_factory() {
        let mut reg = RepositoryRegistry::new();
        let (factory, called) = stub_factory("sqlite");
        reg.register(factory);

        let result = reg.create(&DbConfig::default()).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert!(
            called.load(Ordering::SeqCst),
            "factory create was not invoked"
        );
    }

    #[tokio::test]
    async fn unknown_backend_returns_configuration_error() {
        let reg = RepositoryRegistry::new();
        let config = DbConfig {
            backend: "nope".to_string(),
            connection_string: "x".to_string(),
        };
        assert!(matches!(
            reg.create(&config).await,
            Err(RepositoryError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn configuration_error_names_requested_and_available_backends() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = stub_factory("sqlite");
        reg.register(f);

        let config = DbConfig {
            backend: "postgres".to_string(),
            connection_string: "x".to_string(),
        };

        match reg.create(&config).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"));
                assert!(msg.contains("sqlite"));
            }
            other => panic!(
                "expected Configuration error, got {:#?}",
                other.map(|_| "Ok(Box<dyn CalculatorRepository>)")
            ),
        }
    }

    #[tokio::test]
    async fn create_propagates_factory_error() {
        let mut reg = RepositoryRegistry::new();
        reg.register(Box::new(FailingFactory));

        let config = DbConfig {
            backend: "failing".to_string(),
            connection_string: "x".to_string(),
        };

        assert!(matches!(
            reg.create(&config).await,
            Err(RepositoryError::Connection(_))
        ));
    }
}
