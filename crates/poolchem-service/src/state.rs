//! Application state shared across handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use poolchem_core::{Error as CoreError, PoolDirectory, Result as CoreResult};
use poolchem_store::Store;
use poolchem_types::{OrgId, Pool, Reading};

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Configuration the server was started with.
    pub config: Config,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            config,
        })
    }
}

/// The dosing engine reads pools and readings straight from the store.
///
/// Each lookup takes the store lock on its own, so the engine's concurrent
/// pool and reading lookups queue on the mutex rather than deadlock.
#[async_trait]
impl PoolDirectory for AppState {
    async fn find_pool(&self, pool_id: &str, org: &OrgId) -> CoreResult<Option<Pool>> {
        let store = self.store.lock().await;
        store
            .get_pool(org, pool_id)
            .map(|pool| pool.map(Pool::from))
            .map_err(CoreError::storage)
    }

    async fn find_reading(&self, reading_id: &str, org: &OrgId) -> CoreResult<Option<Reading>> {
        let store = self.store.lock().await;
        store.get_reading(org, reading_id).map_err(CoreError::storage)
    }

    async fn find_latest_reading(&self, pool_id: &str, org: &OrgId) -> CoreResult<Option<Reading>> {
        let store = self.store.lock().await;
        store
            .get_latest_reading(org, pool_id)
            .map_err(CoreError::storage)
    }
}
