//! Dosing recommendation pipeline.
//!
//! [`compute`] is the synchronous, side-effect free core: targets, snapshot,
//! rules, priority sort, response. [`recommend`] wraps it with the pool and
//! reading lookups against a [`PoolDirectory`], issuing both concurrently.
//!
//! # Example
//!
//! ```
//! use poolchem_core::{InMemoryDirectory, recommend};
//! use poolchem_types::{ChemistrySnapshot, DosingRequest, OrgId, Parameter, Priority};
//!
//! #[tokio::main]
//! async fn main() -> poolchem_core::Result<()> {
//!     let org = OrgId::new("acme-pools");
//!     let directory = InMemoryDirectory::builder()
//!         .pool("pool-1", &org, Some(50_000.0))
//!         .build();
//!
//!     let request = DosingRequest::new("pool-1").overrides(
//!         ChemistrySnapshot::new()
//!             .with(Parameter::Ph, 6.5)
//!             .with(Parameter::ChlorineFree, 0.2),
//!     );
//!     let response = recommend(&directory, &org, &request).await?;
//!
//!     assert_eq!(response.recommendations.len(), 2);
//!     assert_eq!(response.recommendations[0].qty, 2500);
//!     assert_eq!(response.recommendations[0].priority, Priority::High);
//!     Ok(())
//! }
//! ```

use poolchem_types::{
    ChemistrySnapshot, DEFAULT_POOL_VOLUME_LITERS, DosingRequest, DosingResponse, OrgId, Pool,
    Reading, TargetProfile,
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::priority::sort_by_priority;
use crate::rules::evaluate;
use crate::snapshot::build_snapshot;
use crate::targets::resolve_targets;
use crate::traits::PoolDirectory;

/// Effective volume of a pool in liters.
///
/// A missing, non-finite, zero or negative recorded volume falls back to
/// [`DEFAULT_POOL_VOLUME_LITERS`], so the result is always positive.
pub fn pool_volume(pool: &Pool) -> f64 {
    match pool.volume_l {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            warn!(pool_id = %pool.id, volume_l = v, "Ignoring unusable pool volume");
            DEFAULT_POOL_VOLUME_LITERS
        }
        None => DEFAULT_POOL_VOLUME_LITERS,
    }
}

/// Compute a dosing response from already-resolved inputs.
///
/// `volume_liters` must be positive; use [`pool_volume`] to obtain it.
pub fn compute(
    snapshot: ChemistrySnapshot,
    targets: TargetProfile,
    volume_liters: f64,
) -> DosingResponse {
    let mut recommendations = evaluate(&snapshot, &targets, volume_liters);
    sort_by_priority(&mut recommendations);

    DosingResponse {
        recommendations,
        current: snapshot,
        targets,
        pool_volume: volume_liters,
    }
}

/// Compute dosing recommendations for a pool.
///
/// The pool is looked up in `org`; if it does not exist there the whole
/// request fails with [`Error::PoolNotFound`]. The base reading is the one
/// named by `request.reading_id` or, when none is named, the pool's most
/// recent reading. A named reading that does not resolve in `org`, or that
/// belongs to a different pool, is treated as no reading.
///
/// # Errors
///
/// Returns [`Error::PoolNotFound`] for an unknown pool and propagates
/// [`Error::Storage`] from the directory.
pub async fn recommend<D>(
    directory: &D,
    org: &OrgId,
    request: &DosingRequest,
) -> Result<DosingResponse>
where
    D: PoolDirectory + ?Sized,
{
    let pool_id = request.pool_id.as_str();

    let reading_lookup = async {
        match request.reading_id.as_deref() {
            Some(reading_id) => directory.find_reading(reading_id, org).await,
            None => directory.find_latest_reading(pool_id, org).await,
        }
    };
    let (pool, reading) = futures::join!(directory.find_pool(pool_id, org), reading_lookup);

    let pool = pool?.ok_or_else(|| Error::PoolNotFound(pool_id.to_string()))?;
    let reading = select_reading(reading?, request, pool_id);

    let targets = resolve_targets(&pool);
    let volume = pool_volume(&pool);
    let snapshot = build_snapshot(&request.overrides, reading.as_ref());

    let response = compute(snapshot, targets, volume);
    info!(
        pool_id,
        org = %org,
        reading_id = reading.as_ref().map(|r| r.id.as_str()),
        recommendations = response.recommendations.len(),
        "Computed dosing recommendations"
    );
    Ok(response)
}

fn select_reading(reading: Option<Reading>, request: &DosingRequest, pool_id: &str) -> Option<Reading> {
    match (reading, request.reading_id.as_deref()) {
        (Some(r), _) if r.pool_id == pool_id => Some(r),
        (Some(r), _) => {
            warn!(
                reading_id = %r.id,
                reading_pool = %r.pool_id,
                pool_id,
                "Reading belongs to a different pool, ignoring"
            );
            None
        }
        (None, Some(reading_id)) => {
            warn!(reading_id, pool_id, "Reading not found, continuing without it");
            None
        }
        (None, None) => {
            debug!(pool_id, "No stored reading for pool");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolchem_types::{Chemical, OrgId, Parameter, Priority};

    fn pool(volume_l: Option<f64>) -> Pool {
        Pool {
            id: "p1".to_string(),
            org_id: OrgId::new("org-a"),
            name: "Test".to_string(),
            volume_l,
            targets: None,
        }
    }

    #[test]
    fn test_pool_volume_defaults() {
        assert_eq!(pool_volume(&pool(None)), 50_000.0);
        assert_eq!(pool_volume(&pool(Some(0.0))), 50_000.0);
        assert_eq!(pool_volume(&pool(Some(-10.0))), 50_000.0);
        assert_eq!(pool_volume(&pool(Some(f64::NAN))), 50_000.0);
        assert_eq!(pool_volume(&pool(Some(f64::INFINITY))), 50_000.0);
        assert_eq!(pool_volume(&pool(Some(32_000.0))), 32_000.0);
    }

    #[test]
    fn test_compute_reference_scenario() {
        let snapshot = ChemistrySnapshot::new()
            .with(Parameter::Ph, 6.5)
            .with(Parameter::ChlorineFree, 0.2);

        let response = compute(snapshot, TargetProfile::default(), 50_000.0);
        assert_eq!(response.recommendations.len(), 2);

        let soda = &response.recommendations[0];
        assert_eq!(soda.chemical, Chemical::SodaAsh);
        assert_eq!(soda.qty, 2500);
        assert_eq!(soda.priority, Priority::High);

        let chlorine = &response.recommendations[1];
        assert_eq!(chlorine.chemical, Chemical::LiquidChlorine);
        assert_eq!(chlorine.qty, 900);
        assert_eq!(chlorine.priority, Priority::High);

        assert_eq!(response.current, snapshot);
        assert_eq!(response.pool_volume, 50_000.0);
    }

    #[test]
    fn test_compute_sorts_across_rules() {
        // Calcium (high) is evaluated after pH (medium) and alkalinity (medium).
        let snapshot = ChemistrySnapshot::new()
            .with(Parameter::Ph, 7.0)
            .with(Parameter::Alkalinity, 60.0)
            .with(Parameter::CalciumHardness, 90.0);

        let response = compute(snapshot, TargetProfile::default(), 50_000.0);
        let chemicals: Vec<_> = response
            .recommendations
            .iter()
            .map(|r| r.chemical)
            .collect();
        assert_eq!(
            chemicals,
            vec![
                Chemical::CalciumChloride,
                Chemical::SodaAsh,
                Chemical::SodiumBicarbonate
            ]
        );
    }

    #[test]
    fn test_compute_empty_snapshot() {
        let response = compute(ChemistrySnapshot::new(), TargetProfile::default(), 50_000.0);
        assert!(response.recommendations.is_empty());
        assert_eq!(
            serde_json::to_value(&response.current).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn test_compute_excess_calcium_only() {
        let snapshot = ChemistrySnapshot::new().with(Parameter::CalciumHardness, 600.0);
        assert!(
            compute(snapshot, TargetProfile::default(), 50_000.0)
                .recommendations
                .is_empty()
        );
    }
}
