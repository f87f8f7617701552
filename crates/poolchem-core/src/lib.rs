//! Dosing recommendation engine for pool water chemistry.
//!
//! Given a pool's current water chemistry and its target ranges, this crate
//! computes which chemicals to add, how much, how urgently, and with which
//! safety warnings. Output is advisory, for a human technician.
//!
//! # Pipeline
//!
//! 1. **Lookup**: the pool and its reading are fetched concurrently from a
//!    [`PoolDirectory`].
//! 2. **Targets**: [`resolve_targets`] validates the pool's stored profile,
//!    falling back to the defaults.
//! 3. **Snapshot**: [`build_snapshot`] merges explicit request values over the
//!    stored reading.
//! 4. **Rules**: [`evaluate`] runs the fixed rule list in [`rules::RULES`].
//! 5. **Ordering**: [`sort_by_priority`] puts high before medium before low.
//!
//! Steps 2-5 are pure and available as [`compute`].
//!
//! # Quick Start
//!
//! ```
//! use poolchem_core::compute;
//! use poolchem_types::{Chemical, ChemistrySnapshot, Parameter, TargetProfile};
//!
//! let snapshot = ChemistrySnapshot::new().with(Parameter::CyanuricAcid, 10.0);
//! let response = compute(snapshot, TargetProfile::default(), 40_000.0);
//!
//! assert_eq!(response.recommendations[0].chemical, Chemical::CyanuricAcid);
//! assert_eq!(response.recommendations[0].qty, 80);
//! ```

pub mod engine;
pub mod error;
pub mod mock;
pub mod priority;
pub mod rules;
pub mod snapshot;
pub mod status;
pub mod targets;
pub mod traits;
pub mod validation;

// Re-export the shared types crate
pub use poolchem_types as types;

// Core exports
pub use engine::{compute, pool_volume, recommend};
pub use error::{Error, Result};
pub use mock::{InMemoryDirectory, InMemoryDirectoryBuilder};
pub use priority::sort_by_priority;
pub use rules::{Rule, evaluate};
pub use snapshot::build_snapshot;
pub use status::{ParameterReport, ParameterStatus, StatusReport, evaluate_status};
pub use targets::resolve_targets;
pub use traits::PoolDirectory;
pub use validation::{ReadingValidator, ValidationResult, ValidationWarning, ValidatorConfig};

#[cfg(test)]
mod proptests {
    use super::*;
    use poolchem_types::{ChemistrySnapshot, Parameter, TargetProfile};
    use proptest::prelude::*;

    fn arb_snapshot() -> impl Strategy<Value = ChemistrySnapshot> {
        (
            prop::option::of(5.0f64..9.5),
            prop::option::of(0.0f64..8.0),
            prop::option::of(0.0f64..10.0),
            prop::option::of(0.0f64..250.0),
            prop::option::of(0.0f64..800.0),
            prop::option::of(0.0f64..150.0),
        )
            .prop_map(|(ph, cf, ct, ta, ch, cya)| ChemistrySnapshot {
                ph,
                chlorine_free: cf,
                chlorine_total: ct,
                alkalinity: ta,
                calcium_hardness: ch,
                cyanuric_acid: cya,
            })
    }

    proptest! {
        /// Scaling the volume scales every dose linearly (up to rounding).
        #[test]
        fn doses_scale_linearly_with_volume(
            snapshot in arb_snapshot(),
            volume in 1_000.0f64..200_000.0,
            factor in 1u32..5,
        ) {
            let targets = TargetProfile::default();
            let factor = f64::from(factor);
            let base = evaluate(&snapshot, &targets, volume);
            let scaled = evaluate(&snapshot, &targets, volume * factor);

            prop_assert_eq!(base.len(), scaled.len());
            for (a, b) in base.iter().zip(scaled.iter()) {
                prop_assert_eq!(a.chemical, b.chemical);
                prop_assert_eq!(a.priority, b.priority);
                // a.qty is within 0.5 of the exact dose, so b.qty is within
                // factor * 0.5 + 0.5 of factor * a.qty.
                let expected = a.qty as f64 * factor;
                prop_assert!(
                    (b.qty as f64 - expected).abs() <= factor * 0.5 + 0.5 + 1e-6,
                    "{} scaled by {} gave {}", a.qty, factor, b.qty
                );
            }
        }

        /// Identical inputs give byte-identical JSON.
        #[test]
        fn compute_is_idempotent(snapshot in arb_snapshot(), volume in 1_000.0f64..200_000.0) {
            let a = compute(snapshot, TargetProfile::default(), volume);
            let b = compute(snapshot, TargetProfile::default(), volume);
            prop_assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );
        }

        /// Output is sorted by priority and keeps rule order within a tier.
        #[test]
        fn output_is_priority_sorted_and_stable(snapshot in arb_snapshot()) {
            let targets = TargetProfile::default();
            let unsorted = evaluate(&snapshot, &targets, 50_000.0);
            let sorted = compute(snapshot, targets, 50_000.0).recommendations;

            for pair in sorted.windows(2) {
                prop_assert!(pair[0].priority.rank() <= pair[1].priority.rank());
            }
            for tier in [0u8, 1, 2] {
                let before: Vec<_> = unsorted.iter().filter(|r| r.priority.rank() == tier).collect();
                let after: Vec<_> = sorted.iter().filter(|r| r.priority.rank() == tier).collect();
                prop_assert_eq!(before, after);
            }
        }

        /// Values exactly on a range boundary never trigger the range-checked rules.
        #[test]
        fn boundary_values_never_fire(use_max in any::<bool>()) {
            let targets = TargetProfile::default();
            for parameter in [
                Parameter::Ph,
                Parameter::Alkalinity,
                Parameter::CalciumHardness,
                Parameter::CyanuricAcid,
            ] {
                let range = targets.range(parameter).copied().unwrap();
                let value = if use_max { range.max } else { range.min };
                let snapshot = ChemistrySnapshot::new().with(parameter, value);
                prop_assert!(evaluate(&snapshot, &targets, 50_000.0).is_empty());
            }
        }
    }
}
