use async_trait::async_trait;
use menu_core::db::repository::{MenuRepository, RepositoryError};
use menu_core::db::{DbConfig, RepositoryFactory};
use tracing::info;

use crate::repository::SqliteRepository;

/// Turn a connection string into a sqlx SQLite URL.
///
/// * `":memory:"` becomes `sqlite::memory:`.
/// * Anything already starting with `sqlite:` is used unchanged.
/// * A bare path is treated as a database file.
fn database_url(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        "sqlite::memory:".to_string()
    } else if connection_string.starts_with("sqlite:") {
        connection_string.to_string()
    } else {
        format!("sqlite:{connection_string}")
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`menu_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use menu_core::db::RepositoryRegistry;
/// use menu_db_sqlite::SqliteRepositoryFactory;
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

    /// Open the database described by `config.connection_string` and make
    /// sure both tables exist.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"restaurant.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"`, an ephemeral in-memory database.
    /// * A full sqlx URL such as `"sqlite:restaurant.db?mode=rwc"`.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn MenuRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        info!(database = %config.connection_string, "opened restaurant database");
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use menu_core::db::{DbConfig, RepositoryFactory};
    use pretty_assertions::assert_eq;

    use super::{SqliteRepositoryFactory, database_url};

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn database_url_maps_connection_strings() {
        assert_eq!(database_url(":memory:"), "sqlite::memory:");
        assert_eq!(database_url("restaurant.db"), "sqlite:restaurant.db");
        assert_eq!(
            database_url("sqlite:data/restaurant.db?mode=rwc"),
            "sqlite:data/restaurant.db?mode=rwc"
        );
    }

    /// Full round-trip: factory → SqliteRepository with an in-memory DB.
    #[tokio::test]
    async fn creates_in_memory_repository_with_empty_tables() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = SqliteRepositoryFactory
            .create(&config)
            .await
            .expect("in-memory repository should open");

        assert!(repo.list_dishes().await.expect("Should list dishes").is_empty());
        assert!(repo.list_orders().await.expect("Should list orders").is_empty());
    }
}
