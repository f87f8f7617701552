//! Trait abstractions for the storage collaborator.
//!
//! This module provides the [`PoolDirectory`] trait that abstracts over the
//! SQLite store, the in-memory [`crate::InMemoryDirectory`] used in tests, and
//! any other source of pool and reading records.

use async_trait::async_trait;

use poolchem_types::{OrgId, Pool, Reading};

use crate::error::Result;

/// Lookup of pools and readings, scoped by organization.
///
/// Every method returns `Ok(None)` when the record does not exist *in the
/// given organization*; a record owned by another organization is
/// indistinguishable from a missing one. `Err` is reserved for failures of
/// the directory itself.
///
/// # Example
///
/// ```ignore
/// use poolchem_core::{PoolDirectory, Result};
/// use poolchem_types::OrgId;
///
/// async fn pool_name<D: PoolDirectory>(dir: &D, org: &OrgId, id: &str) -> Result<Option<String>> {
///     Ok(dir.find_pool(id, org).await?.map(|pool| pool.name))
/// }
/// ```
#[async_trait]
pub trait PoolDirectory: Send + Sync {
    /// Find a pool by id.
    async fn find_pool(&self, pool_id: &str, org: &OrgId) -> Result<Option<Pool>>;

    /// Find a reading by id.
    async fn find_reading(&self, reading_id: &str, org: &OrgId) -> Result<Option<Reading>>;

    /// Find the most recent reading for a pool.
    ///
    /// The default implementation returns `Ok(None)` for directories that do
    /// not track reading history.
    async fn find_latest_reading(&self, pool_id: &str, org: &OrgId) -> Result<Option<Reading>> {
        let _ = (pool_id, org);
        Ok(None)
    }
}
