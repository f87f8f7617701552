//! Data models for stored data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use poolchem_types::{OrgId, Pool};

/// A pool stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPool {
    /// Pool identifier (UUID v4).
    pub id: String,
    /// Owning organization.
    pub org_id: OrgId,
    /// Display name.
    pub name: String,
    /// Recorded volume in liters.
    #[serde(rename = "volumeL", default, skip_serializing_if = "Option::is_none")]
    pub volume_l: Option<f64>,
    /// Custom target profile exactly as stored. Not validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Value>,
    /// When the pool was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the pool was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl StoredPool {
    /// Convert to the record the dosing engine consumes.
    pub fn to_pool(&self) -> Pool {
        Pool {
            id: self.id.clone(),
            org_id: self.org_id.clone(),
            name: self.name.clone(),
            volume_l: self.volume_l,
            targets: self.targets.clone(),
        }
    }
}

impl From<StoredPool> for Pool {
    fn from(stored: StoredPool) -> Self {
        Pool {
            id: stored.id,
            org_id: stored.org_id,
            name: stored.name,
            volume_l: stored.volume_l,
            targets: stored.targets,
        }
    }
}

/// Fields needed to create a pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPool {
    /// Display name.
    pub name: String,
    /// Recorded volume in liters.
    #[serde(rename = "volumeL", default)]
    pub volume_l: Option<f64>,
    /// Custom target profile, stored as given.
    #[serde(default)]
    pub targets: Option<Value>,
}

impl NewPool {
    /// A pool with only a name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Set the volume in liters.
    pub fn volume(mut self, liters: f64) -> Self {
        self.volume_l = Some(liters);
        self
    }

    /// Set the raw target profile.
    pub fn targets(mut self, targets: Value) -> Self {
        self.targets = Some(targets);
        self
    }
}
