//! Main store implementation.

use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use poolchem_types::{ChemistrySnapshot, OrgId, Reading};

use crate::error::{Error, Result};
use crate::models::{NewPool, StoredPool};
use crate::queries::ReadingQuery;
use crate::schema;

const POOL_COLUMNS: &str = "id, org_id, name, volume_l, targets_json, created_at, updated_at";

const READING_COLUMNS: &str = "id, pool_id, org_id, captured_at, ph, chlorine_free, chlorine_total, \
                               alkalinity, calcium_hardness, cyanuric_acid";

/// SQLite-based store for pools and their chemistry readings.
///
/// Every lookup takes the caller's [`OrgId`]; records of other organizations
/// behave as if they did not exist.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // === Pool operations ===

    /// Create a pool owned by `org`. The identifier is generated.
    pub fn create_pool(&self, org: &OrgId, pool: &NewPool) -> Result<StoredPool> {
        let id = Uuid::new_v4().to_string();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let targets_json = pool.targets.as_ref().map(serde_json::to_string).transpose()?;

        self.conn.execute(
            "INSERT INTO pools (id, org_id, name, volume_l, targets_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            rusqlite::params![id, org.as_str(), pool.name, pool.volume_l, targets_json, now],
        )?;
        info!(pool_id = %id, org = %org, "Created pool {}", pool.name);

        self.get_pool(org, &id)?.ok_or(Error::PoolNotFound(id))
    }

    /// Get a pool by ID.
    pub fn get_pool(&self, org: &OrgId, pool_id: &str) -> Result<Option<StoredPool>> {
        let sql = format!("SELECT {POOL_COLUMNS} FROM pools WHERE id = ?1 AND org_id = ?2");
        let pool = self
            .conn
            .query_row(&sql, [pool_id, org.as_str()], row_to_pool)
            .optional()?;

        Ok(pool)
    }

    /// List the pools of an organization, ordered by name.
    pub fn list_pools(&self, org: &OrgId) -> Result<Vec<StoredPool>> {
        let sql = format!("SELECT {POOL_COLUMNS} FROM pools WHERE org_id = ?1 ORDER BY name, id");
        let mut stmt = self.conn.prepare(&sql)?;

        let pools = stmt
            .query_map([org.as_str()], row_to_pool)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pools)
    }

    /// Replace (or clear) a pool's custom target profile.
    ///
    /// The profile is stored as given. It is validated when a recommendation
    /// is computed, not here.
    pub fn update_pool_targets(
        &self,
        org: &OrgId,
        pool_id: &str,
        targets: Option<&Value>,
    ) -> Result<StoredPool> {
        let targets_json = targets.map(serde_json::to_string).transpose()?;
        let changed = self.conn.execute(
            "UPDATE pools SET targets_json = ?1, updated_at = ?2 WHERE id = ?3 AND org_id = ?4",
            rusqlite::params![
                targets_json,
                OffsetDateTime::now_utc().unix_timestamp(),
                pool_id,
                org.as_str()
            ],
        )?;

        self.updated_pool(org, pool_id, changed)
    }

    /// Replace (or clear) a pool's recorded volume.
    pub fn update_pool_volume(
        &self,
        org: &OrgId,
        pool_id: &str,
        volume_l: Option<f64>,
    ) -> Result<StoredPool> {
        let changed = self.conn.execute(
            "UPDATE pools SET volume_l = ?1, updated_at = ?2 WHERE id = ?3 AND org_id = ?4",
            rusqlite::params![
                volume_l,
                OffsetDateTime::now_utc().unix_timestamp(),
                pool_id,
                org.as_str()
            ],
        )?;

        self.updated_pool(org, pool_id, changed)
    }

    fn updated_pool(&self, org: &OrgId, pool_id: &str, changed: usize) -> Result<StoredPool> {
        if changed == 0 {
            return Err(Error::PoolNotFound(pool_id.to_string()));
        }
        debug!(pool_id, "Updated pool");
        self.get_pool(org, pool_id)?
            .ok_or_else(|| Error::PoolNotFound(pool_id.to_string()))
    }

    // === Reading operations ===

    /// Store a reading for a pool of `org`.
    ///
    /// `captured_at` defaults to now and is kept at second precision.
    pub fn insert_reading(
        &self,
        org: &OrgId,
        pool_id: &str,
        captured_at: Option<OffsetDateTime>,
        chemistry: &ChemistrySnapshot,
    ) -> Result<Reading> {
        if self.get_pool(org, pool_id)?.is_none() {
            return Err(Error::PoolNotFound(pool_id.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let ts = captured_at
            .unwrap_or_else(OffsetDateTime::now_utc)
            .unix_timestamp();
        let captured_at = OffsetDateTime::from_unix_timestamp(ts)
            .map_err(|e| Error::InvalidTimestamp(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO readings (id, pool_id, org_id, captured_at, ph, chlorine_free,
                                   chlorine_total, alkalinity, calcium_hardness, cyanuric_acid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                id,
                pool_id,
                org.as_str(),
                ts,
                chemistry.ph,
                chemistry.chlorine_free,
                chemistry.chlorine_total,
                chemistry.alkalinity,
                chemistry.calcium_hardness,
                chemistry.cyanuric_acid,
            ],
        )?;
        debug!(reading_id = %id, pool_id, "Inserted reading");

        Ok(Reading {
            id,
            pool_id: pool_id.to_string(),
            org_id: org.clone(),
            captured_at,
            chemistry: *chemistry,
        })
    }

    /// Get a reading by ID.
    pub fn get_reading(&self, org: &OrgId, reading_id: &str) -> Result<Option<Reading>> {
        let sql = format!("SELECT {READING_COLUMNS} FROM readings WHERE id = ?1 AND org_id = ?2");
        let reading = self
            .conn
            .query_row(&sql, [reading_id, org.as_str()], row_to_reading)
            .optional()?;

        Ok(reading)
    }

    /// Get the most recent reading of a pool. Ties on `captured_at` go to the
    /// reading inserted last.
    pub fn get_latest_reading(&self, org: &OrgId, pool_id: &str) -> Result<Option<Reading>> {
        let query = ReadingQuery::new().pool(pool_id).limit(1);
        let mut readings = self.query_readings(org, &query)?;
        Ok(readings.pop())
    }

    /// Query readings with filters.
    pub fn query_readings(&self, org: &OrgId, query: &ReadingQuery) -> Result<Vec<Reading>> {
        let (where_clause, params) = query.build_where(org.as_str());
        let sql = query.build_sql(&where_clause);
        debug!("Reading query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let readings = stmt
            .query_map(params_refs.as_slice(), row_to_reading)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    /// Count readings of an organization, optionally for a single pool.
    pub fn count_readings(&self, org: &OrgId, pool_id: Option<&str>) -> Result<u64> {
        let count: i64 = match pool_id {
            Some(id) => self.conn.query_row(
                "SELECT COUNT(*) FROM readings WHERE org_id = ?1 AND pool_id = ?2",
                [org.as_str(), id],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM readings WHERE org_id = ?1",
                [org.as_str()],
                |row| row.get(0),
            )?,
        };

        Ok(count as u64)
    }
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<OffsetDateTime> {
    let ts: i64 = row.get(idx)?;
    OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn row_to_pool(row: &Row<'_>) -> rusqlite::Result<StoredPool> {
    let id: String = row.get(0)?;
    let targets = row
        .get::<_, Option<String>>(4)?
        .map(|text| match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                // Kept as text so profile parsing rejects it and falls back.
                warn!(pool_id = %id, "Stored targets are not valid JSON: {}", e);
                Value::String(text)
            }
        });

    Ok(StoredPool {
        org_id: OrgId::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
        volume_l: row.get(3)?,
        targets,
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
        id,
    })
}

fn row_to_reading(row: &Row<'_>) -> rusqlite::Result<Reading> {
    Ok(Reading {
        id: row.get(0)?,
        pool_id: row.get(1)?,
        org_id: OrgId::new(row.get::<_, String>(2)?),
        captured_at: timestamp(row, 3)?,
        chemistry: ChemistrySnapshot {
            ph: row.get(4)?,
            chlorine_free: row.get(5)?,
            chlorine_total: row.get(6)?,
            alkalinity: row.get(7)?,
            calcium_hardness: row.get(8)?,
            cyanuric_acid: row.get(9)?,
        },
    })
}
