//! Local data persistence for pools and water chemistry readings.
//!
//! This crate provides SQLite-based storage for the records the dosing
//! engine consumes: pools (with their recorded volume and optional custom
//! target profile) and chemistry readings.
//!
//! # Features
//!
//! - Every lookup is scoped by organization
//! - Target profiles are stored as raw JSON and returned untrusted
//! - Query readings by pool and time range, with pagination
//! - Schema version tracking
//!
//! # Example
//!
//! ```
//! use poolchem_store::{NewPool, Store};
//! use poolchem_types::{ChemistrySnapshot, OrgId, Parameter};
//!
//! let store = Store::open_in_memory()?;
//! let org = OrgId::new("acme");
//!
//! let pool = store.create_pool(&org, &NewPool::named("Main").volume(40_000.0))?;
//! let chemistry = ChemistrySnapshot::new().with(Parameter::Ph, 7.4);
//! store.insert_reading(&org, &pool.id, None, &chemistry)?;
//!
//! let latest = store.get_latest_reading(&org, &pool.id)?;
//! assert_eq!(latest.map(|r| r.chemistry.ph), Some(Some(7.4)));
//! # Ok::<(), poolchem_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{NewPool, StoredPool};
pub use queries::ReadingQuery;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/poolchem/data.db`
/// - macOS: `~/Library/Application Support/poolchem/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\poolchem\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("poolchem")
        .join("data.db")
}
