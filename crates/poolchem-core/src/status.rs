//! Parameter status against a target profile.
//!
//! This module categorizes each measured value as low, in range or high
//! relative to the pool's resolved targets. It is informational and never
//! feeds back into dosing.
//!
//! # Example
//!
//! ```
//! use poolchem_core::{ParameterStatus, evaluate_status};
//! use poolchem_types::{ChemistrySnapshot, Parameter, TargetProfile};
//!
//! let snapshot = ChemistrySnapshot::new().with(Parameter::Ph, 7.9);
//! let report = evaluate_status(&snapshot, &TargetProfile::default());
//!
//! assert_eq!(report.status(Parameter::Ph), Some(ParameterStatus::High));
//! assert_eq!(report.status(Parameter::Alkalinity), Some(ParameterStatus::Unmeasured));
//! ```

use serde::{Deserialize, Serialize};

use poolchem_types::{ChemistrySnapshot, ChemistryTargetRange, Parameter, TargetProfile};

/// Where a measured value sits relative to its target range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStatus {
    /// Below the range minimum.
    Low,
    /// Within the range, bounds included.
    InRange,
    /// Above the range maximum.
    High,
    /// No value was measured, or no range is configured.
    Unmeasured,
}

impl ParameterStatus {
    /// Categorize `value` against `range`.
    pub fn of(value: Option<f64>, range: Option<&ChemistryTargetRange>) -> Self {
        match (value, range) {
            (Some(v), Some(r)) if v < r.min => ParameterStatus::Low,
            (Some(v), Some(r)) if v > r.max => ParameterStatus::High,
            (Some(v), Some(r)) if r.contains(v) => ParameterStatus::InRange,
            _ => ParameterStatus::Unmeasured,
        }
    }

    /// Get a short description for display.
    pub fn description(&self) -> &'static str {
        match self {
            ParameterStatus::Low => "Below target",
            ParameterStatus::InRange => "On target",
            ParameterStatus::High => "Above target",
            ParameterStatus::Unmeasured => "Not measured",
        }
    }
}

/// Status of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterReport {
    pub parameter: Parameter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ChemistryTargetRange>,
    pub status: ParameterStatus,
}

/// Status of every parameter of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// One entry per parameter, in reporting order.
    pub parameters: Vec<ParameterReport>,
    /// Total minus free chlorine, when both were measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_chlorine: Option<f64>,
}

impl StatusReport {
    /// Status for a single parameter.
    pub fn status(&self, parameter: Parameter) -> Option<ParameterStatus> {
        self.parameters
            .iter()
            .find(|p| p.parameter == parameter)
            .map(|p| p.status)
    }

    /// Whether every measured parameter with a range is in range.
    pub fn all_in_range(&self) -> bool {
        self.parameters
            .iter()
            .all(|p| matches!(p.status, ParameterStatus::InRange | ParameterStatus::Unmeasured))
    }
}

/// Evaluate every parameter of `snapshot` against `targets`.
pub fn evaluate_status(snapshot: &ChemistrySnapshot, targets: &TargetProfile) -> StatusReport {
    let parameters = Parameter::ALL
        .into_iter()
        .map(|parameter| {
            let value = snapshot.get(parameter);
            let target = targets.range(parameter).copied();
            ParameterReport {
                parameter,
                value,
                target,
                status: ParameterStatus::of(value, target.as_ref()),
            }
        })
        .collect();

    let combined_chlorine = match (snapshot.chlorine_total, snapshot.chlorine_free) {
        (Some(total), Some(free)) => Some((total - free).max(0.0)),
        _ => None,
    };

    StatusReport {
        parameters,
        combined_chlorine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        let range = ChemistryTargetRange::new(80.0, 120.0);
        assert_eq!(ParameterStatus::of(Some(79.9), Some(&range)), ParameterStatus::Low);
        assert_eq!(ParameterStatus::of(Some(80.0), Some(&range)), ParameterStatus::InRange);
        assert_eq!(ParameterStatus::of(Some(120.0), Some(&range)), ParameterStatus::InRange);
        assert_eq!(ParameterStatus::of(Some(120.1), Some(&range)), ParameterStatus::High);
        assert_eq!(ParameterStatus::of(None, Some(&range)), ParameterStatus::Unmeasured);
        assert_eq!(ParameterStatus::of(Some(f64::NAN), Some(&range)), ParameterStatus::Unmeasured);
    }

    #[test]
    fn test_total_chlorine_without_range_is_unmeasured() {
        let snapshot = ChemistrySnapshot::new().with(Parameter::ChlorineTotal, 3.0);
        let report = evaluate_status(&snapshot, &TargetProfile::default());
        assert_eq!(
            report.status(Parameter::ChlorineTotal),
            Some(ParameterStatus::Unmeasured)
        );
    }

    #[test]
    fn test_report_covers_all_parameters() {
        let report = evaluate_status(&ChemistrySnapshot::new(), &TargetProfile::default());
        assert_eq!(report.parameters.len(), Parameter::ALL.len());
        assert!(report.all_in_range());
        assert!(report.combined_chlorine.is_none());
    }

    #[test]
    fn test_combined_chlorine() {
        let snapshot = ChemistrySnapshot::new()
            .with(Parameter::ChlorineFree, 1.5)
            .with(Parameter::ChlorineTotal, 2.0);
        let report = evaluate_status(&snapshot, &TargetProfile::default());
        assert_eq!(report.combined_chlorine, Some(0.5));

        // Test-kit noise never reports negative combined chlorine.
        let snapshot = ChemistrySnapshot::new()
            .with(Parameter::ChlorineFree, 2.0)
            .with(Parameter::ChlorineTotal, 1.8);
        let report = evaluate_status(&snapshot, &TargetProfile::default());
        assert_eq!(report.combined_chlorine, Some(0.0));
    }

    #[test]
    fn test_out_of_range_report() {
        let snapshot = ChemistrySnapshot::new()
            .with(Parameter::Ph, 6.9)
            .with(Parameter::CalciumHardness, 600.0);
        let report = evaluate_status(&snapshot, &TargetProfile::default());
        assert_eq!(report.status(Parameter::Ph), Some(ParameterStatus::Low));
        assert_eq!(
            report.status(Parameter::CalciumHardness),
            Some(ParameterStatus::High)
        );
        assert!(!report.all_in_range());
    }

    #[test]
    fn test_report_serialization() {
        let snapshot = ChemistrySnapshot::new().with(Parameter::Ph, 7.5);
        let report = evaluate_status(&snapshot, &TargetProfile::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["parameters"][0]["parameter"], "ph");
        assert_eq!(json["parameters"][0]["status"], "inRange");
        assert_eq!(json["parameters"][0]["target"]["min"], 7.2);
        assert!(json["parameters"][1].get("value").is_none());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(ParameterStatus::InRange.description(), "On target");
        assert_eq!(ParameterStatus::Unmeasured.description(), "Not measured");
    }
}
