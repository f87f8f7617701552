//! Dosing recommendation types and the request/response contract.

use core::cmp::Ordering;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{ChemistrySnapshot, TargetProfile};

/// Urgency tier of a recommendation.
///
/// Ordering follows the explicit ordinal from [`Priority::rank`]:
/// `High < Medium < Low`, so an ascending sort puts the most urgent first.
///
/// ```
/// use poolchem_types::Priority;
///
/// assert!(Priority::High < Priority::Medium);
/// assert!(Priority::Medium < Priority::Low);
/// assert_eq!(Priority::Low.rank(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Priority {
    /// Act before swimming.
    High = 0,
    /// Act today.
    Medium = 1,
    /// Act at the next service visit.
    Low = 2,
}

impl Priority {
    /// Sort ordinal: 0 for high, 1 for medium, 2 for low.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A corrective chemical the engine can recommend.
///
/// Serialized as its product label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Chemical {
    /// Sodium carbonate, raises pH.
    #[cfg_attr(feature = "serde", serde(rename = "Soda Ash"))]
    SodaAsh,
    /// Hydrochloric acid, lowers pH and alkalinity.
    #[cfg_attr(feature = "serde", serde(rename = "Muriatic Acid (31% HCl)"))]
    MuriaticAcid,
    /// Sodium hypochlorite solution, raises free chlorine.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "Liquid Chlorine (10-12% sodium hypochlorite)")
    )]
    LiquidChlorine,
    /// Raises total alkalinity.
    #[cfg_attr(feature = "serde", serde(rename = "Sodium Bicarbonate"))]
    SodiumBicarbonate,
    /// Raises calcium hardness.
    #[cfg_attr(feature = "serde", serde(rename = "Calcium Chloride"))]
    CalciumChloride,
    /// Stabilizer, raises cyanuric acid.
    #[cfg_attr(feature = "serde", serde(rename = "Cyanuric Acid (stabilizer)"))]
    CyanuricAcid,
}

impl Chemical {
    /// Product label shown to technicians.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Chemical::SodaAsh => "Soda Ash",
            Chemical::MuriaticAcid => "Muriatic Acid (31% HCl)",
            Chemical::LiquidChlorine => "Liquid Chlorine (10-12% sodium hypochlorite)",
            Chemical::SodiumBicarbonate => "Sodium Bicarbonate",
            Chemical::CalciumChloride => "Calcium Chloride",
            Chemical::CyanuricAcid => "Cyanuric Acid (stabilizer)",
        }
    }
}

impl fmt::Display for Chemical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit a dose quantity is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DoseUnit {
    /// Grams, for granular products.
    #[cfg_attr(feature = "serde", serde(rename = "g"))]
    Grams,
    /// Milliliters, for liquid products.
    #[cfg_attr(feature = "serde", serde(rename = "ml"))]
    Milliliters,
}

impl DoseUnit {
    /// Short unit symbol.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            DoseUnit::Grams => "g",
            DoseUnit::Milliliters => "ml",
        }
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One dosing suggestion for a technician.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DosingRecommendation {
    /// Chemical to add.
    pub chemical: Chemical,
    /// Quantity, rounded to the nearest whole unit.
    pub qty: u64,
    /// Unit of `qty`.
    pub unit: DoseUnit,
    /// Human-readable before/after description.
    pub purpose: String,
    /// Urgency tier.
    pub priority: Priority,
    /// Safety note, if the chemical needs one.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub warning: Option<String>,
}

/// Body of a dosing recommendation request.
///
/// Explicit chemistry values are flattened into the top-level object and take
/// precedence over the stored reading.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DosingRequest {
    /// Pool to compute recommendations for.
    pub pool_id: String,
    /// Stored reading to use as the base snapshot.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub reading_id: Option<String>,
    /// Explicit values supplied with the request.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub overrides: ChemistrySnapshot,
}

impl DosingRequest {
    /// Create a request for `pool_id` with no reading and no explicit values.
    pub fn new(pool_id: impl Into<String>) -> Self {
        Self {
            pool_id: pool_id.into(),
            ..Default::default()
        }
    }

    /// Use the stored reading `reading_id` as the base snapshot.
    #[must_use]
    pub fn reading(mut self, reading_id: impl Into<String>) -> Self {
        self.reading_id = Some(reading_id.into());
        self
    }

    /// Supply explicit chemistry values.
    #[must_use]
    pub fn overrides(mut self, overrides: ChemistrySnapshot) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Result of a dosing recommendation request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DosingResponse {
    /// Recommendations, most urgent first.
    pub recommendations: Vec<DosingRecommendation>,
    /// Chemistry values the recommendations were computed from.
    pub current: ChemistrySnapshot,
    /// Target profile the recommendations were computed against.
    pub targets: TargetProfile,
    /// Pool volume in liters, after defaulting.
    pub pool_volume: f64,
}
