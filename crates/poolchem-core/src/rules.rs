//! Dosing rules.
//!
//! Each rule is a pure function of the snapshot, the resolved targets and the
//! pool volume, and emits at most one recommendation. [`RULES`] fixes the
//! evaluation order, which is also the tie-break order within a priority tier.
//!
//! The dose constants are calibration constants for the listed products and
//! are reproduced exactly; do not tune them here.
//!
//! | Rule | Fires when | Chemical | Dose |
//! |------|------------|----------|------|
//! | pH | out of range and more than 0.2 from midpoint | Soda Ash / Muriatic Acid | 100 g / 150 ml per 0.2 per 10,000 L |
//! | Free chlorine | more than 0.5 ppm below midpoint | Liquid Chlorine | 1 ml per 0.1 ppm per 1,000 L |
//! | Alkalinity | out of range and more than 20 ppm from midpoint | Sodium Bicarbonate / Muriatic Acid | 15 g / 150 ml per 10 ppm per 10,000 L |
//! | Calcium hardness | more than 50 ppm below midpoint | Calcium Chloride | 10 g per 10 ppm per 10,000 L |
//! | Cyanuric acid | below range minimum | Cyanuric Acid | 10 g per 10 ppm per 10,000 L |
//!
//! Calcium hardness and cyanuric acid are one-directional: excess is never
//! corrected. Total chlorine is informational and has no rule.

use poolchem_types::{
    Chemical, ChemistrySnapshot, DoseUnit, DosingRecommendation, Parameter, Priority,
    TargetProfile,
};
use tracing::debug;

/// Signature shared by every dosing rule: snapshot, targets, pool volume in liters.
pub type Rule = fn(&ChemistrySnapshot, &TargetProfile, f64) -> Option<DosingRecommendation>;

/// All rules, in evaluation order.
pub const RULES: [Rule; 5] = [
    ph_rule,
    chlorine_rule,
    alkalinity_rule,
    calcium_rule,
    cyanuric_acid_rule,
];

/// pH correction deadband around the midpoint.
pub const PH_DEADBAND: f64 = 0.2;
/// Free chlorine shortfall below the midpoint that triggers a dose, in ppm.
pub const CHLORINE_THRESHOLD: f64 = 0.5;
/// Alkalinity correction deadband around the midpoint, in ppm.
pub const ALKALINITY_DEADBAND: f64 = 20.0;
/// Calcium hardness shortfall below the midpoint that triggers a dose, in ppm.
pub const CALCIUM_THRESHOLD: f64 = 50.0;

/// Warning attached to every acid dose for pH.
pub const ACID_PH_WARNING: &str = "Add slowly to deep end, never mix with chlorine";
/// Warning attached to acid doses for alkalinity.
pub const ACID_ALKALINITY_WARNING: &str = "Lower TA gradually over several days";
/// Warning attached to stabilizer doses.
pub const STABILIZER_WARNING: &str = "Dissolve in bucket first, add to skimmer";

/// Run every rule in order and collect the recommendations that fire.
///
/// The result is in rule order; see [`crate::sort_by_priority`] for the
/// presentation order.
pub fn evaluate(
    snapshot: &ChemistrySnapshot,
    targets: &TargetProfile,
    volume_liters: f64,
) -> Vec<DosingRecommendation> {
    RULES
        .iter()
        .filter_map(|rule| rule(snapshot, targets, volume_liters))
        .collect()
}

/// Raise or lower pH toward the midpoint of the target range.
pub fn ph_rule(
    snapshot: &ChemistrySnapshot,
    targets: &TargetProfile,
    volume_liters: f64,
) -> Option<DosingRecommendation> {
    let ph = snapshot.ph?;
    let range = targets.ph;
    if range.contains(ph) {
        return None;
    }

    let mid = range.midpoint();
    let diff = mid - ph;
    let scale = volume_liters / 10_000.0;

    if diff > PH_DEADBAND {
        Some(DosingRecommendation {
            chemical: Chemical::SodaAsh,
            qty: round_qty((diff / 0.2) * scale * 100.0),
            unit: DoseUnit::Grams,
            purpose: purpose("Raise", Parameter::Ph, ph, mid),
            priority: if ph < 7.0 { Priority::High } else { Priority::Medium },
            warning: None,
        })
    } else if diff < -PH_DEADBAND {
        Some(DosingRecommendation {
            chemical: Chemical::MuriaticAcid,
            qty: round_qty((diff.abs() / 0.2) * scale * 150.0),
            unit: DoseUnit::Milliliters,
            purpose: purpose("Lower", Parameter::Ph, ph, mid),
            priority: if ph > 8.0 { Priority::High } else { Priority::Medium },
            warning: Some(ACID_PH_WARNING.to_string()),
        })
    } else {
        debug!(ph, mid, "pH out of range but inside deadband");
        None
    }
}

/// Raise free chlorine toward the midpoint.
///
/// There is no range-membership check: a value at the range minimum is still
/// dosed if it sits more than 0.5 ppm below the midpoint. Free chlorine is
/// never lowered.
pub fn chlorine_rule(
    snapshot: &ChemistrySnapshot,
    targets: &TargetProfile,
    volume_liters: f64,
) -> Option<DosingRecommendation> {
    let chlorine = snapshot.chlorine_free?;
    let mid = targets.chlorine_free.midpoint();
    let diff = mid - chlorine;
    if diff <= CHLORINE_THRESHOLD {
        return None;
    }

    Some(DosingRecommendation {
        chemical: Chemical::LiquidChlorine,
        qty: round_qty((diff / 0.1) * (volume_liters / 1_000.0)),
        unit: DoseUnit::Milliliters,
        purpose: purpose("Raise", Parameter::ChlorineFree, chlorine, mid),
        priority: if chlorine < 0.5 {
            Priority::High
        } else {
            Priority::Medium
        },
        warning: None,
    })
}

/// Raise or lower total alkalinity toward the midpoint.
pub fn alkalinity_rule(
    snapshot: &ChemistrySnapshot,
    targets: &TargetProfile,
    volume_liters: f64,
) -> Option<DosingRecommendation> {
    let alkalinity = snapshot.alkalinity?;
    let range = targets.alkalinity;
    if range.contains(alkalinity) {
        return None;
    }

    let mid = range.midpoint();
    let diff = mid - alkalinity;
    if diff.abs() <= ALKALINITY_DEADBAND {
        debug!(alkalinity, mid, "Alkalinity out of range but inside deadband");
        return None;
    }

    let scale = volume_liters / 10_000.0;
    let rec = if diff > 0.0 {
        DosingRecommendation {
            chemical: Chemical::SodiumBicarbonate,
            qty: round_qty((diff / 10.0) * scale * 15.0),
            unit: DoseUnit::Grams,
            purpose: purpose("Raise", Parameter::Alkalinity, alkalinity, mid),
            priority: Priority::Medium,
            warning: None,
        }
    } else {
        DosingRecommendation {
            chemical: Chemical::MuriaticAcid,
            qty: round_qty((diff.abs() / 10.0) * scale * 150.0),
            unit: DoseUnit::Milliliters,
            purpose: purpose("Lower", Parameter::Alkalinity, alkalinity, mid),
            priority: Priority::Low,
            warning: Some(ACID_ALKALINITY_WARNING.to_string()),
        }
    };
    Some(rec)
}

/// Raise calcium hardness toward the midpoint. Excess hardness is left alone.
pub fn calcium_rule(
    snapshot: &ChemistrySnapshot,
    targets: &TargetProfile,
    volume_liters: f64,
) -> Option<DosingRecommendation> {
    let hardness = snapshot.calcium_hardness?;
    let range = targets.calcium_hardness;
    if range.contains(hardness) {
        return None;
    }

    let mid = range.midpoint();
    let diff = mid - hardness;
    if diff <= CALCIUM_THRESHOLD {
        return None;
    }

    Some(DosingRecommendation {
        chemical: Chemical::CalciumChloride,
        qty: round_qty((diff / 10.0) * (volume_liters / 10_000.0) * 10.0),
        unit: DoseUnit::Grams,
        purpose: purpose("Raise", Parameter::CalciumHardness, hardness, mid),
        priority: if hardness < 100.0 {
            Priority::High
        } else {
            Priority::Low
        },
        warning: None,
    })
}

/// Raise cyanuric acid up to the range minimum. Excess stabilizer is left alone.
pub fn cyanuric_acid_rule(
    snapshot: &ChemistrySnapshot,
    targets: &TargetProfile,
    volume_liters: f64,
) -> Option<DosingRecommendation> {
    let cya = snapshot.cyanuric_acid?;
    let min = targets.cyanuric_acid.min;
    if cya >= min {
        return None;
    }

    let diff = min - cya;
    Some(DosingRecommendation {
        chemical: Chemical::CyanuricAcid,
        qty: round_qty((diff / 10.0) * (volume_liters / 10_000.0) * 10.0),
        unit: DoseUnit::Grams,
        purpose: purpose("Raise", Parameter::CyanuricAcid, cya, min),
        priority: if cya < 20.0 {
            Priority::Medium
        } else {
            Priority::Low
        },
        warning: Some(STABILIZER_WARNING.to_string()),
    })
}

/// Round a dose to the nearest whole unit. Negative or NaN doses clamp to 0.
fn round_qty(raw: f64) -> u64 {
    raw.round() as u64
}

fn purpose(verb: &str, parameter: Parameter, from: f64, to: f64) -> String {
    format!(
        "{} {} from {} to {}",
        verb,
        parameter,
        parameter.format_value(display_round(from)),
        parameter.format_value(display_round(to))
    )
}

fn display_round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
