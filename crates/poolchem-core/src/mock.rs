//! In-memory pool directory for testing.
//!
//! [`InMemoryDirectory`] implements [`PoolDirectory`] without a database, so
//! the engine can be exercised in unit tests and doc examples.
//!
//! # Features
//!
//! - **Organization scoping**: records are only visible to their own organization
//! - **Failure injection**: make every lookup fail with [`Error::Storage`]
//! - **Latency simulation**: delay each lookup to observe concurrent fetches

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use poolchem_types::{ChemistrySnapshot, OrgId, Pool, Reading};

use crate::error::{Error, Result};
use crate::traits::PoolDirectory;

/// An in-memory [`PoolDirectory`].
///
/// # Example
///
/// ```
/// use poolchem_core::{InMemoryDirectory, PoolDirectory};
/// use poolchem_types::OrgId;
///
/// #[tokio::main]
/// async fn main() {
///     let org = OrgId::new("org-a");
///     let directory = InMemoryDirectory::builder()
///         .pool("p1", &org, Some(30_000.0))
///         .build();
///
///     assert!(directory.find_pool("p1", &org).await.unwrap().is_some());
///     assert!(directory.find_pool("p1", &OrgId::new("org-b")).await.unwrap().is_none());
/// }
/// ```
#[derive(Default)]
pub struct InMemoryDirectory {
    pools: RwLock<HashMap<String, Pool>>,
    readings: RwLock<Vec<Reading>>,
    lookup_count: AtomicU32,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    /// Simulated lookup latency in milliseconds (0 = no delay).
    lookup_latency_ms: AtomicU64,
}

impl std::fmt::Debug for InMemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDirectory")
            .field("lookup_count", &self.lookup_count.load(Ordering::Relaxed))
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .finish()
    }
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a directory.
    pub fn builder() -> InMemoryDirectoryBuilder {
        InMemoryDirectoryBuilder::new()
    }

    /// Insert or replace a pool.
    pub async fn insert_pool(&self, pool: Pool) {
        self.pools.write().await.insert(pool.id.clone(), pool);
    }

    /// Append a reading.
    pub async fn insert_reading(&self, reading: Reading) {
        self.readings.write().await.push(reading);
    }

    /// Make every subsequent lookup fail.
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Delay every lookup by `latency`.
    pub fn set_lookup_latency(&self, latency: Duration) {
        self.lookup_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of lookups served so far, including failed ones.
    pub fn lookup_count(&self) -> u32 {
        self.lookup_count.load(Ordering::Relaxed)
    }

    async fn check_should_fail(&self) -> Result<()> {
        self.lookup_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.lookup_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.should_fail.load(Ordering::Relaxed) {
            let message = self.fail_message.read().await;
            if message.is_empty() {
                return Err(Error::Storage("Mock failure".to_string()));
            }
            return Err(Error::Storage(message.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl PoolDirectory for InMemoryDirectory {
    async fn find_pool(&self, pool_id: &str, org: &OrgId) -> Result<Option<Pool>> {
        self.check_should_fail().await?;
        Ok(self
            .pools
            .read()
            .await
            .get(pool_id)
            .filter(|p| &p.org_id == org)
            .cloned())
    }

    async fn find_reading(&self, reading_id: &str, org: &OrgId) -> Result<Option<Reading>> {
        self.check_should_fail().await?;
        Ok(self
            .readings
            .read()
            .await
            .iter()
            .find(|r| r.id == reading_id && &r.org_id == org)
            .cloned())
    }

    async fn find_latest_reading(&self, pool_id: &str, org: &OrgId) -> Result<Option<Reading>> {
        self.check_should_fail().await?;
        let readings = self.readings.read().await;
        // Later insertion wins on equal timestamps.
        Ok(readings
            .iter()
            .enumerate()
            .filter(|(_, r)| r.pool_id == pool_id && &r.org_id == org)
            .max_by_key(|(i, r)| (r.captured_at, *i))
            .map(|(_, r)| r.clone()))
    }
}

/// Builder for [`InMemoryDirectory`].
#[derive(Debug, Default)]
pub struct InMemoryDirectoryBuilder {
    pools: HashMap<String, Pool>,
    readings: Vec<Reading>,
    should_fail: bool,
}

impl InMemoryDirectoryBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pool without custom targets.
    #[must_use]
    pub fn pool(self, id: &str, org: &OrgId, volume_l: Option<f64>) -> Self {
        self.pool_record(Pool {
            id: id.to_string(),
            org_id: org.clone(),
            name: format!("Pool {}", id),
            volume_l,
            targets: None,
        })
    }

    /// Add a pool with a raw stored target profile.
    #[must_use]
    pub fn pool_with_targets(self, id: &str, org: &OrgId, volume_l: Option<f64>, targets: Value) -> Self {
        self.pool_record(Pool {
            id: id.to_string(),
            org_id: org.clone(),
            name: format!("Pool {}", id),
            volume_l,
            targets: Some(targets),
        })
    }

    /// Add a fully specified pool.
    #[must_use]
    pub fn pool_record(mut self, pool: Pool) -> Self {
        self.pools.insert(pool.id.clone(), pool);
        self
    }

    /// Add a reading for `pool_id` taken at `captured_at`.
    #[must_use]
    pub fn reading(
        mut self,
        id: &str,
        pool_id: &str,
        org: &OrgId,
        captured_at: OffsetDateTime,
        chemistry: ChemistrySnapshot,
    ) -> Self {
        self.readings.push(Reading {
            id: id.to_string(),
            pool_id: pool_id.to_string(),
            org_id: org.clone(),
            captured_at,
            chemistry,
        });
        self
    }

    /// Make every lookup fail.
    #[must_use]
    pub fn failing(mut self, fail: bool) -> Self {
        self.should_fail = fail;
        self
    }

    /// Build the directory.
    pub fn build(self) -> InMemoryDirectory {
        InMemoryDirectory {
            pools: RwLock::new(self.pools),
            readings: RwLock::new(self.readings),
            should_fail: AtomicBool::new(self.should_fail),
            ..Default::default()
        }
    }
}
