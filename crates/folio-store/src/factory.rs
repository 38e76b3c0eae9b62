#[cfg(feature = "store-firestore")]
use crate::FirestoreStore;
#[cfg(feature = "store-memory")]
use crate::MemoryStore;
use crate::{DocumentStore, StoreBackend, StoreError, StoreResult};
use folio_core::Config;
use std::sync::Arc;

/// Create a document store backend based on configuration
pub fn create_store(config: &Config) -> StoreResult<Arc<dyn DocumentStore>> {
    match config.store_backend {
        #[cfg(feature = "store-firestore")]
        StoreBackend::Firestore => {
            let project_id = config.firestore_project_id.as_deref().ok_or_else(|| {
                StoreError::ConfigError("FIRESTORE_PROJECT_ID not configured".to_string())
            })?;
            let api_key = config.firebase_api_key.clone().ok_or_else(|| {
                StoreError::ConfigError("FIREBASE_API_KEY not configured".to_string())
            })?;

            let store = FirestoreStore::new(
                project_id,
                &config.firestore_database,
                api_key,
                config.store_timeout(),
            )?;
            tracing::info!(project_id = %project_id, "Using Firestore document store");
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-firestore"))]
        StoreBackend::Firestore => Err(StoreError::ConfigError(
            "Firestore backend not available (store-firestore feature not enabled)".to_string(),
        )),

        #[cfg(feature = "store-memory")]
        StoreBackend::Memory => {
            tracing::info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }

        #[cfg(not(feature = "store-memory"))]
        StoreBackend::Memory => Err(StoreError::ConfigError(
            "Memory backend not available (store-memory feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "store-memory")]
    #[test]
    fn memory_backend_from_default_config() {
        let store = create_store(&Config::default()).unwrap();
        assert_eq!(store.backend_type(), StoreBackend::Memory);
    }

    #[cfg(feature = "store-firestore")]
    #[test]
    fn firestore_requires_project_id() {
        let config = Config {
            store_backend: StoreBackend::Firestore,
            firebase_api_key: Some("key".to_string()),
            ..Config::default()
        };
        match create_store(&config) {
            Err(StoreError::ConfigError(msg)) => assert!(msg.contains("FIRESTORE_PROJECT_ID")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected a configuration error"),
        }
    }
}
