//! Target range resolution.

use poolchem_types::{Pool, TargetProfile};
use tracing::{debug, warn};

/// Resolve the effective target profile for a pool.
///
/// A stored profile is used verbatim if it parses; otherwise the default
/// profile applies. Profiles are all-or-nothing: one malformed range discards
/// the whole stored profile.
///
/// ```
/// use poolchem_core::resolve_targets;
/// use poolchem_types::{OrgId, Pool, TargetProfile};
///
/// let pool = Pool {
///     id: "p1".into(),
///     org_id: OrgId::new("org"),
///     name: "Lap pool".into(),
///     volume_l: None,
///     targets: Some(serde_json::json!({ "ph": [7.8, 7.2] })),
/// };
/// assert_eq!(resolve_targets(&pool), TargetProfile::default());
/// ```
pub fn resolve_targets(pool: &Pool) -> TargetProfile {
    let Some(raw) = pool.targets.as_ref() else {
        return TargetProfile::default();
    };

    match TargetProfile::parse(raw) {
        Ok(profile) => {
            debug!(pool_id = %pool.id, "Using custom target profile");
            profile
        }
        Err(e) => {
            warn!(
                pool_id = %pool.id,
                error = %e,
                "Rejected stored target profile, using defaults"
            );
            TargetProfile::default()
        }
    }
}
