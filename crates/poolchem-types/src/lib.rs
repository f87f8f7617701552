//! Platform-agnostic types for pool water chemistry and dosing.
//!
//! This crate provides the shared vocabulary used by the dosing engine
//! (poolchem-core), the SQLite store (poolchem-store) and the HTTP service
//! (poolchem-service).
//!
//! # Features
//!
//! - Chemistry parameters, target ranges and target profiles
//! - Validated parsing of untrusted stored target profiles
//! - Dosing recommendation, request and response types
//! - Pool and reading records
//!
//! # Example
//!
//! ```
//! use poolchem_types::{ChemistrySnapshot, Parameter, TargetProfile};
//!
//! let targets = TargetProfile::default();
//! let snapshot = ChemistrySnapshot::new().with(Parameter::Ph, 7.5);
//! assert!(targets.ph.contains(snapshot.ph.unwrap()));
//! ```

pub mod dosing;
pub mod error;
pub mod pool;
pub mod types;

pub use dosing::{
    Chemical, DoseUnit, DosingRecommendation, DosingRequest, DosingResponse, Priority,
};
pub use error::{ProfileError, ProfileResult};
pub use pool::{DEFAULT_POOL_VOLUME_LITERS, OrgId, Pool, Reading};
pub use types::{ChemistrySnapshot, ChemistryTargetRange, Parameter, TargetProfile};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // --- TargetProfile parsing tests ---

    fn full_profile() -> serde_json::Value {
        json!({
            "ph": [7.4, 7.6],
            "chlorineFree": [2.0, 4.0],
            "alkalinity": [90, 110],
            "calciumHardness": [250, 350],
            "cyanuricAcid": [40, 60]
        })
    }

    #[test]
    fn test_parse_profile_from_pairs() {
        let profile = TargetProfile::parse(&full_profile()).unwrap();

        assert_eq!(profile.ph, ChemistryTargetRange::new(7.4, 7.6));
        assert_eq!(profile.chlorine_free, ChemistryTargetRange::new(2.0, 4.0));
        assert_eq!(profile.alkalinity, ChemistryTargetRange::new(90.0, 110.0));
        assert_eq!(profile.calcium_hardness, ChemistryTargetRange::new(250.0, 350.0));
        assert_eq!(profile.cyanuric_acid, ChemistryTargetRange::new(40.0, 60.0));
        assert!(profile.chlorine_total.is_none());
    }

    #[test]
    fn test_parse_profile_from_objects() {
        let raw = json!({
            "ph": { "min": 7.3, "max": 7.7 },
            "chlorineFree": { "min": 1, "max": 3 },
            "alkalinity": { "min": 80, "max": 120 },
            "calciumHardness": { "min": 200, "max": 400 },
            "cyanuricAcid": { "min": 30, "max": 80 }
        });

        let profile = TargetProfile::parse(&raw).unwrap();
        assert_eq!(profile.ph, ChemistryTargetRange::new(7.3, 7.7));
    }

    #[test]
    fn test_parse_profile_with_chlorine_total() {
        let mut raw = full_profile();
        raw["chlorineTotal"] = json!([1.0, 5.0]);

        let profile = TargetProfile::parse(&raw).unwrap();
        assert_eq!(
            profile.chlorine_total,
            Some(ChemistryTargetRange::new(1.0, 5.0))
        );
    }

    #[test]
    fn test_parse_profile_malformed_chlorine_total_rejects_whole_profile() {
        let mut raw = full_profile();
        raw["chlorineTotal"] = json!([5.0, 1.0]);

        assert!(matches!(
            TargetProfile::parse(&raw),
            Err(ProfileError::InvertedRange { key: "chlorineTotal", .. })
        ));
    }

    #[test]
    fn test_parse_profile_missing_key() {
        let mut raw = full_profile();
        raw.as_object_mut().unwrap().remove("alkalinity");

        assert_eq!(
            TargetProfile::parse(&raw),
            Err(ProfileError::MissingKey("alkalinity"))
        );
    }

    #[test]
    fn test_parse_profile_null_key_is_missing() {
        let mut raw = full_profile();
        raw["ph"] = serde_json::Value::Null;

        assert_eq!(TargetProfile::parse(&raw), Err(ProfileError::MissingKey("ph")));
    }

    #[test]
    fn test_parse_profile_inverted_range() {
        let mut raw = full_profile();
        raw["ph"] = json!([7.8, 7.2]);

        let err = TargetProfile::parse(&raw).unwrap_err();
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn test_parse_profile_degenerate_range_is_accepted() {
        let mut raw = full_profile();
        raw["ph"] = json!([7.5, 7.5]);

        let profile = TargetProfile::parse(&raw).unwrap();
        assert_eq!(profile.ph.midpoint(), 7.5);
    }

    #[test]
    fn test_parse_profile_wrong_shapes() {
        for bad in [json!(7.2), json!([7.2]), json!([7.2, 7.5, 7.8]), json!({ "min": 7.2 })] {
            let mut raw = full_profile();
            raw["ph"] = bad;
            assert_eq!(
                TargetProfile::parse(&raw),
                Err(ProfileError::NotARange { key: "ph" })
            );
        }
    }

    #[test]
    fn test_parse_profile_non_numeric_bound() {
        let mut raw = full_profile();
        raw["cyanuricAcid"] = json!(["30", 80]);

        assert_eq!(
            TargetProfile::parse(&raw),
            Err(ProfileError::NonNumericBound { key: "cyanuricAcid" })
        );
    }

    #[test]
    fn test_parse_profile_not_an_object() {
        assert_eq!(
            TargetProfile::parse(&json!([1, 2])),
            Err(ProfileError::NotAnObject)
        );
        assert_eq!(
            TargetProfile::parse(&json!("default")),
            Err(ProfileError::NotAnObject)
        );
    }

    #[test]
    fn test_try_new_rejects_non_finite() {
        assert_eq!(
            ChemistryTargetRange::try_new("ph", f64::NAN, 7.8),
            Err(ProfileError::NonFiniteBound { key: "ph" })
        );
        assert_eq!(
            ChemistryTargetRange::try_new("ph", 7.2, f64::INFINITY),
            Err(ProfileError::NonFiniteBound { key: "ph" })
        );
    }

    // --- Default profile tests ---

    #[test]
    fn test_default_profile_table() {
        let profile = TargetProfile::default();
        assert_eq!(profile.ph, ChemistryTargetRange::new(7.2, 7.8));
        assert_eq!(profile.chlorine_free, ChemistryTargetRange::new(1.0, 3.0));
        assert_eq!(profile.alkalinity, ChemistryTargetRange::new(80.0, 120.0));
        assert_eq!(profile.calcium_hardness, ChemistryTargetRange::new(200.0, 400.0));
        assert_eq!(profile.cyanuric_acid, ChemistryTargetRange::new(30.0, 80.0));
        assert!(profile.range(Parameter::ChlorineTotal).is_none());
    }

    #[test]
    fn test_default_profile_parses_back() {
        let json = serde_json::to_value(TargetProfile::default()).unwrap();
        assert_eq!(TargetProfile::parse(&json).unwrap(), TargetProfile::default());
    }

    #[test]
    fn test_profile_serialization_shape() {
        let json = serde_json::to_value(TargetProfile::default()).unwrap();
        assert_eq!(json["ph"], json!({ "min": 7.2, "max": 7.8 }));
        assert_eq!(json["chlorineFree"]["max"], json!(3.0));
        assert!(json.get("chlorineTotal").is_none());
    }

    #[test]
    fn test_range_midpoint_and_contains() {
        let range = ChemistryTargetRange::new(80.0, 120.0);
        assert_eq!(range.midpoint(), 100.0);
        assert!(range.contains(80.0));
        assert!(range.contains(120.0));
        assert!(!range.contains(79.9));
        assert!(!range.contains(f64::NAN));
    }

    // --- Parameter tests ---

    #[test]
    fn test_parameter_keys_match_serde() {
        for parameter in Parameter::ALL {
            assert_eq!(
                serde_json::to_value(parameter).unwrap(),
                json!(parameter.key())
            );
        }
    }

    #[test]
    fn test_parameter_only_total_chlorine_is_informational() {
        let informational: Vec<_> = Parameter::ALL
            .into_iter()
            .filter(|p| !p.drives_dosing())
            .collect();
        assert_eq!(informational, vec![Parameter::ChlorineTotal]);
    }

    #[test]
    fn test_parameter_format_value() {
        assert_eq!(Parameter::Ph.format_value(7.4), "7.4");
        assert_eq!(Parameter::Alkalinity.format_value(80.0), "80 ppm");
    }

    // --- ChemistrySnapshot tests ---

    #[test]
    fn test_empty_snapshot_serializes_as_empty_object() {
        let snapshot = ChemistrySnapshot::new();
        assert!(snapshot.is_empty());
        assert_eq!(serde_json::to_string(&snapshot).unwrap(), "{}");
    }

    #[test]
    fn test_snapshot_serialization_skips_absent() {
        let snapshot = ChemistrySnapshot::new()
            .with(Parameter::Ph, 6.5)
            .with(Parameter::CalciumHardness, 250.0);

        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json, json!({ "ph": 6.5, "calciumHardness": 250.0 }));
    }

    #[test]
    fn test_snapshot_deserialization_treats_null_as_absent() {
        let snapshot: ChemistrySnapshot =
            serde_json::from_str(r#"{"ph": null, "chlorineFree": 1.5}"#).unwrap();
        assert_eq!(snapshot.ph, None);
        assert_eq!(snapshot.chlorine_free, Some(1.5));
    }

    #[test]
    fn test_snapshot_measured_order() {
        let snapshot = ChemistrySnapshot::new()
            .with(Parameter::CyanuricAcid, 20.0)
            .with(Parameter::Ph, 7.0);
        let measured: Vec<_> = snapshot.measured().map(|(p, _)| p).collect();
        assert_eq!(measured, vec![Parameter::Ph, Parameter::CyanuricAcid]);
    }

    #[test]
    fn test_snapshot_set_clears() {
        let mut snapshot = ChemistrySnapshot::new().with(Parameter::Alkalinity, 90.0);
        snapshot.set(Parameter::Alkalinity, None);
        assert!(snapshot.is_empty());
    }

    // --- Dosing type tests ---

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"medium\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_priority_ordering_follows_rank() {
        let mut priorities = vec![Priority::Low, Priority::High, Priority::Medium];
        priorities.sort();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn test_chemical_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(Chemical::MuriaticAcid).unwrap(),
            json!("Muriatic Acid (31% HCl)")
        );
        assert_eq!(
            serde_json::to_value(Chemical::LiquidChlorine).unwrap(),
            json!(Chemical::LiquidChlorine.label())
        );
    }

    #[test]
    fn test_recommendation_serialization() {
        let rec = DosingRecommendation {
            chemical: Chemical::SodaAsh,
            qty: 2500,
            unit: DoseUnit::Grams,
            purpose: "Raise pH from 6.5 to 7.5".to_string(),
            priority: Priority::High,
            warning: None,
        };

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            json,
            json!({
                "chemical": "Soda Ash",
                "qty": 2500,
                "unit": "g",
                "purpose": "Raise pH from 6.5 to 7.5",
                "priority": "high"
            })
        );
    }

    #[test]
    fn test_dosing_request_deserialization() {
        let json = r#"{"poolId":"p1","readingId":"r1","ph":6.8,"alkalinity":null}"#;

        let request: DosingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.pool_id, "p1");
        assert_eq!(request.reading_id.as_deref(), Some("r1"));
        assert_eq!(request.overrides.ph, Some(6.8));
        assert_eq!(request.overrides.alkalinity, None);
    }

    #[test]
    fn test_dosing_request_minimal() {
        let request: DosingRequest = serde_json::from_str(r#"{"poolId":"p1"}"#).unwrap();
        assert_eq!(request, DosingRequest::new("p1"));
        assert!(request.overrides.is_empty());
    }

    #[test]
    fn test_dosing_request_requires_pool_id() {
        assert!(serde_json::from_str::<DosingRequest>(r#"{"ph":7.0}"#).is_err());
    }

    #[test]
    fn test_dosing_response_shape() {
        let response = DosingResponse {
            recommendations: vec![],
            current: ChemistrySnapshot::new(),
            targets: TargetProfile::default(),
            pool_volume: DEFAULT_POOL_VOLUME_LITERS,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["recommendations"], json!([]));
        assert_eq!(json["current"], json!({}));
        assert_eq!(json["poolVolume"], json!(50000.0));
        assert_eq!(json["targets"]["cyanuricAcid"]["min"], json!(30.0));
    }

    // --- Pool / Reading tests ---

    #[test]
    fn test_pool_wire_names() {
        let pool = Pool {
            id: "p1".to_string(),
            org_id: OrgId::new("org-a"),
            name: "Backyard".to_string(),
            volume_l: Some(42_000.0),
            targets: None,
        };

        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["volumeL"], json!(42000.0));
        assert_eq!(json["orgId"], json!("org-a"));
        assert!(json.get("targets").is_none());
    }

    #[test]
    fn test_reading_serialization_roundtrip() {
        use time::macros::datetime;

        let reading = Reading {
            id: "r1".to_string(),
            pool_id: "p1".to_string(),
            org_id: OrgId::new("org-a"),
            captured_at: datetime!(2024-06-01 9:30 UTC),
            chemistry: ChemistrySnapshot::new().with(Parameter::Ph, 7.1),
        };

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["capturedAt"], json!("2024-06-01T09:30:00Z"));
        assert_eq!(json["ph"], json!(7.1));

        let back: Reading = serde_json::from_value(json).unwrap();
        assert_eq!(back, reading);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<f64>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            "[a-zA-Z]{0,12}".prop_map(serde_json::Value::from),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("ph".to_string()),
                        Just("chlorineFree".to_string()),
                        Just("chlorineTotal".to_string()),
                        Just("alkalinity".to_string()),
                        Just("calciumHardness".to_string()),
                        Just("cyanuricAcid".to_string()),
                        Just("min".to_string()),
                        Just("max".to_string()),
                    ],
                    inner,
                    0..4
                )
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Parsing arbitrary JSON never panics, and any accepted profile is well-formed.
        #[test]
        fn parse_profile_never_panics(raw in arb_json()) {
            if let Ok(profile) = TargetProfile::parse(&raw) {
                for parameter in Parameter::ALL {
                    if let Some(range) = profile.range(parameter) {
                        prop_assert!(range.min.is_finite() && range.max.is_finite());
                        prop_assert!(range.min <= range.max);
                    }
                }
            }
        }

        #[test]
        fn range_contains_its_bounds(a in -1000.0f64..1000.0, b in -1000.0f64..1000.0) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let range = ChemistryTargetRange::try_new("ph", min, max).unwrap();
            prop_assert!(range.contains(min));
            prop_assert!(range.contains(max));
            prop_assert!(range.contains(range.midpoint()));
        }
    }
}
