use async_trait::async_trait;

use kd_core::store::{KeyValueStore, StoreConfig, StoreError, StoreFactory};

use crate::store::SqliteStore;

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`kd_core::store::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use kd_core::store::StoreRegistry;
/// use kd_store_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::with_memory();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"kd.db"`. The file is created if missing.
    /// * A sqlx URL, e.g. `"sqlite://kd.db?mode=rwc"`.
    /// * `":memory:"`, an ephemeral database for tests and dry runs.
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn KeyValueStore>, StoreError> {
        let store = SqliteStore::connect(&config.connection_string)
            .await
            .map_err(|e| StoreError::Connection(format!("{e:#}")))?;
        store
            .run_migrations()
            .await
            .map_err(|e| StoreError::Backend(format!("{e:#}")))?;

        tracing::debug!(connection = %config.connection_string, "opened sqlite store");
        Ok(Box::new(store))
    }
}

#[cfg(test)]
mod tests {
    use kd_core::store::{KeyValueStore, StoreConfig, StoreFactory, StoreRegistry};

    use super::SqliteStoreFactory;

    fn memory_config() -> StoreConfig {
        StoreConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteStoreFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_in_memory_store() {
        let result = SqliteStoreFactory.create(&memory_config()).await;
        assert!(
            result.is_ok(),
            "failed to create in-memory store: {:#?}",
            result.err()
        );
    }

    #[tokio::test]
    async fn registry_dispatches_to_sqlite() {
        let mut registry = StoreRegistry::with_memory();
        registry.register(Box::new(SqliteStoreFactory));

        let store = registry.create(&memory_config()).await.unwrap();
        store.set("k", "v").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
