use anyhow::{Context, Result};
use kd_core::store::{CalculatorStore, KeyValueStore, StoreRegistry};
use kd_store_sqlite::SqliteStoreFactory;

use crate::config::StorageConfig;

pub type AppStore = CalculatorStore<Box<dyn KeyValueStore>>;

/// Every storage backend the CLI can open.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::with_memory();
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Opens the configured backend under the configured namespace.
pub async fn open_store(config: &StorageConfig) -> Result<AppStore> {
    let backend = build_registry()
        .create(&config.store_config())
        .await
        .with_context(|| format!("failed to open {} store", config.backend))?;
    Ok(CalculatorStore::with_namespace(backend, config.namespace.clone()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn registry_knows_memory_and_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn unknown_backend_is_reported() {
        let config = StorageConfig {
            backend: "postgres".to_string(),
            ..Default::default()
        };

        let err = open_store(&config).await.err().unwrap();

        assert!(format!("{err:#}").contains("unknown backend 'postgres'"));
    }

    #[tokio::test]
    async fn store_uses_configured_namespace() {
        let config = StorageConfig {
            backend: "memory".to_string(),
            namespace: "test_".to_string(),
            ..Default::default()
        };

        let store = open_store(&config).await.unwrap();

        assert_eq!(store.namespace(), "test_");
    }
}
