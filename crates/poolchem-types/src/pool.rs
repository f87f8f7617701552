//! Pool and reading records as handed over by the storage collaborator.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::types::ChemistrySnapshot;

/// Volume assumed for pools without a usable recorded volume, in liters.
pub const DEFAULT_POOL_VOLUME_LITERS: f64 = 50_000.0;

/// Organization (tenant) identifier. Every lookup is scoped by one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OrgId(String);

impl OrgId {
    /// Wrap an organization identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrgId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OrgId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A pool as seen by the dosing engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Pool {
    /// Pool identifier.
    pub id: String,
    /// Owning organization.
    pub org_id: OrgId,
    /// Display name.
    pub name: String,
    /// Recorded volume in liters, if known.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "volumeL", default, skip_serializing_if = "Option::is_none")
    )]
    pub volume_l: Option<f64>,
    /// Custom target profile as stored. Untrusted; see `TargetProfile::parse`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub targets: Option<Value>,
}

/// A stored chemistry reading for a pool.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Reading {
    /// Reading identifier.
    pub id: String,
    /// Pool the reading was taken at.
    pub pool_id: String,
    /// Owning organization.
    pub org_id: OrgId,
    /// When the water was tested.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub captured_at: OffsetDateTime,
    /// Measured values.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub chemistry: ChemistrySnapshot,
}
