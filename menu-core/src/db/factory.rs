use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{MenuRepository, RepositoryError};

/// Which backend to open and where its data lives.
///
/// | backend  | connection_string                                  |
/// |----------|----------------------------------------------------|
/// | `sqlite` | `restaurant.db`, `:memory:`, `sqlite:path?mode=rwc` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Name of a registered [`RepositoryFactory`].
    pub backend: String,
    /// Handed to the factory as-is.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "restaurant.db".to_string(),
        }
    }
}

/// Opens a [`MenuRepository`] for one backend. Backend crates export a unit
/// struct implementing this and the binary registers it at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store and return a repository whose tables
    /// already exist.
    async fn create(&self, config: &DbConfig)
    -> Result<Box<dyn MenuRepository>, RepositoryError>;
}

/// Backend factories keyed by [`RepositoryFactory::backend_name`].
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Adds `factory`, replacing any factory registered under the same name.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the repository described by `config`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] if `config.backend` is not
    ///   registered. The message lists the backends that are.
    /// * Whatever the matching factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn MenuRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {}",
                config.backend,
                self.available_backends().join(", ")
            )));
        };
        debug!(backend = %config.backend, "creating repository");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
