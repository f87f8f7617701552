//! Core types for pool water chemistry.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProfileError, ProfileResult};

/// A water chemistry parameter tracked for a pool.
///
/// The declaration order is the order parameters are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Parameter {
    /// pH (dimensionless).
    Ph,
    /// Free available chlorine in ppm.
    ChlorineFree,
    /// Total chlorine in ppm. Informational only.
    ChlorineTotal,
    /// Total alkalinity in ppm.
    Alkalinity,
    /// Calcium hardness in ppm.
    CalciumHardness,
    /// Cyanuric acid (stabilizer) in ppm.
    CyanuricAcid,
}

impl Parameter {
    /// Every parameter, in reporting order.
    pub const ALL: [Parameter; 6] = [
        Parameter::Ph,
        Parameter::ChlorineFree,
        Parameter::ChlorineTotal,
        Parameter::Alkalinity,
        Parameter::CalciumHardness,
        Parameter::CyanuricAcid,
    ];

    /// The JSON key used for this parameter on the wire.
    ///
    /// ```
    /// use poolchem_types::Parameter;
    ///
    /// assert_eq!(Parameter::ChlorineFree.key(), "chlorineFree");
    /// assert_eq!(Parameter::Ph.key(), "ph");
    /// ```
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::ChlorineFree => "chlorineFree",
            Parameter::ChlorineTotal => "chlorineTotal",
            Parameter::Alkalinity => "alkalinity",
            Parameter::CalciumHardness => "calciumHardness",
            Parameter::CyanuricAcid => "cyanuricAcid",
        }
    }

    /// Measurement unit, or `None` for pH.
    #[must_use]
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Parameter::Ph => None,
            _ => Some("ppm"),
        }
    }

    /// Whether a target range for this parameter can drive a dosing rule.
    ///
    /// Total chlorine is reported but never dosed against.
    #[must_use]
    pub fn drives_dosing(&self) -> bool {
        !matches!(self, Parameter::ChlorineTotal)
    }

    /// Format a value of this parameter with its unit, e.g. `"80 ppm"`.
    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        match self.unit() {
            Some(unit) => format!("{} {}", value, unit),
            None => format!("{}", value),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Ph => write!(f, "pH"),
            Parameter::ChlorineFree => write!(f, "free chlorine"),
            Parameter::ChlorineTotal => write!(f, "total chlorine"),
            Parameter::Alkalinity => write!(f, "total alkalinity"),
            Parameter::CalciumHardness => write!(f, "calcium hardness"),
            Parameter::CyanuricAcid => write!(f, "cyanuric acid"),
        }
    }
}

/// A closed target interval `[min, max]` for one parameter.
///
/// Membership is boundary-inclusive: a value equal to `min` or `max` is in range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChemistryTargetRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl ChemistryTargetRange {
    /// Create a range without validation. Intended for constants.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Create a validated range for the parameter identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NonFiniteBound`] if either bound is NaN or infinite,
    /// or [`ProfileError::InvertedRange`] if `min > max`.
    pub fn try_new(key: &'static str, min: f64, max: f64) -> ProfileResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ProfileError::NonFiniteBound { key });
        }
        if min > max {
            return Err(ProfileError::InvertedRange { key, min, max });
        }
        Ok(Self { min, max })
    }

    /// Whether `value` lies inside the range, bounds included.
    ///
    /// ```
    /// use poolchem_types::ChemistryTargetRange;
    ///
    /// let range = ChemistryTargetRange::new(7.2, 7.8);
    /// assert!(range.contains(7.2));
    /// assert!(range.contains(7.8));
    /// assert!(!range.contains(7.9));
    /// ```
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Midpoint of the range, the value every correction aims for.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Default pH range.
pub const DEFAULT_PH: ChemistryTargetRange = ChemistryTargetRange::new(7.2, 7.8);
/// Default free chlorine range (ppm).
pub const DEFAULT_CHLORINE_FREE: ChemistryTargetRange = ChemistryTargetRange::new(1.0, 3.0);
/// Default total alkalinity range (ppm).
pub const DEFAULT_ALKALINITY: ChemistryTargetRange = ChemistryTargetRange::new(80.0, 120.0);
/// Default calcium hardness range (ppm).
pub const DEFAULT_CALCIUM_HARDNESS: ChemistryTargetRange = ChemistryTargetRange::new(200.0, 400.0);
/// Default cyanuric acid range (ppm).
pub const DEFAULT_CYANURIC_ACID: ChemistryTargetRange = ChemistryTargetRange::new(30.0, 80.0);

/// The set of target ranges a pool is maintained against.
///
/// A stored custom profile replaces the default as a whole. Use
/// [`TargetProfile::parse`] to turn untrusted stored JSON into a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TargetProfile {
    /// pH target.
    pub ph: ChemistryTargetRange,
    /// Free chlorine target.
    pub chlorine_free: ChemistryTargetRange,
    /// Total alkalinity target.
    pub alkalinity: ChemistryTargetRange,
    /// Calcium hardness target.
    pub calcium_hardness: ChemistryTargetRange,
    /// Cyanuric acid target.
    pub cyanuric_acid: ChemistryTargetRange,
    /// Total chlorine target, informational only.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub chlorine_total: Option<ChemistryTargetRange>,
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TargetProfile {
    /// The default profile used when a pool carries no valid custom profile.
    pub const DEFAULT: TargetProfile = TargetProfile {
        ph: DEFAULT_PH,
        chlorine_free: DEFAULT_CHLORINE_FREE,
        alkalinity: DEFAULT_ALKALINITY,
        calcium_hardness: DEFAULT_CALCIUM_HARDNESS,
        cyanuric_acid: DEFAULT_CYANURIC_ACID,
        chlorine_total: None,
    };

    /// The range configured for `parameter`, if any.
    #[must_use]
    pub fn range(&self, parameter: Parameter) -> Option<&ChemistryTargetRange> {
        match parameter {
            Parameter::Ph => Some(&self.ph),
            Parameter::ChlorineFree => Some(&self.chlorine_free),
            Parameter::ChlorineTotal => self.chlorine_total.as_ref(),
            Parameter::Alkalinity => Some(&self.alkalinity),
            Parameter::CalciumHardness => Some(&self.calcium_hardness),
            Parameter::CyanuricAcid => Some(&self.cyanuric_acid),
        }
    }

    /// Parse and validate a stored profile.
    ///
    /// Every dosing parameter must be present as either a `[min, max]` array or a
    /// `{"min": .., "max": ..}` object with finite numeric bounds and `min <= max`.
    /// `chlorineTotal` is optional, but if present it must be well-formed too.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] describing the first structural problem found.
    ///
    /// # Examples
    ///
    /// ```
    /// use poolchem_types::TargetProfile;
    ///
    /// let raw = serde_json::json!({
    ///     "ph": [7.4, 7.6],
    ///     "chlorineFree": [2.0, 4.0],
    ///     "alkalinity": { "min": 90, "max": 110 },
    ///     "calciumHardness": [250, 350],
    ///     "cyanuricAcid": [40, 60]
    /// });
    /// let profile = TargetProfile::parse(&raw).unwrap();
    /// assert_eq!(profile.ph.min, 7.4);
    /// assert_eq!(profile.alkalinity.max, 110.0);
    ///
    /// assert!(TargetProfile::parse(&serde_json::json!({ "ph": [7.4, 7.6] })).is_err());
    /// ```
    pub fn parse(value: &Value) -> ProfileResult<Self> {
        let object = value.as_object().ok_or(ProfileError::NotAnObject)?;

        let required = |parameter: Parameter| -> ProfileResult<ChemistryTargetRange> {
            let key = parameter.key();
            match object.get(key) {
                None | Some(Value::Null) => Err(ProfileError::MissingKey(key)),
                Some(raw) => parse_range(key, raw),
            }
        };

        let chlorine_total = match object.get(Parameter::ChlorineTotal.key()) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(parse_range(Parameter::ChlorineTotal.key(), raw)?),
        };

        Ok(Self {
            ph: required(Parameter::Ph)?,
            chlorine_free: required(Parameter::ChlorineFree)?,
            alkalinity: required(Parameter::Alkalinity)?,
            calcium_hardness: required(Parameter::CalciumHardness)?,
            cyanuric_acid: required(Parameter::CyanuricAcid)?,
            chlorine_total,
        })
    }
}

fn parse_range(key: &'static str, raw: &Value) -> ProfileResult<ChemistryTargetRange> {
    let (min, max) = match raw {
        Value::Array(items) if items.len() == 2 => (&items[0], &items[1]),
        Value::Object(fields) => match (fields.get("min"), fields.get("max")) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(ProfileError::NotARange { key }),
        },
        _ => return Err(ProfileError::NotARange { key }),
    };

    let bound = |v: &Value| v.as_f64().ok_or(ProfileError::NonNumericBound { key });
    ChemistryTargetRange::try_new(key, bound(min)?, bound(max)?)
}

/// Current water chemistry values for a pool.
///
/// Each value is optional; an absent value means the parameter was not measured
/// and every rule for it is skipped. Absent values are omitted when serialized,
/// so an empty snapshot serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ChemistrySnapshot {
    /// pH.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub ph: Option<f64>,
    /// Free chlorine in ppm.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub chlorine_free: Option<f64>,
    /// Total chlorine in ppm.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub chlorine_total: Option<f64>,
    /// Total alkalinity in ppm.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub alkalinity: Option<f64>,
    /// Calcium hardness in ppm.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub calcium_hardness: Option<f64>,
    /// Cyanuric acid in ppm.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub cyanuric_acid: Option<f64>,
}

impl ChemistrySnapshot {
    /// Create an empty snapshot (nothing measured).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for `parameter`.
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::ChlorineFree => self.chlorine_free,
            Parameter::ChlorineTotal => self.chlorine_total,
            Parameter::Alkalinity => self.alkalinity,
            Parameter::CalciumHardness => self.calcium_hardness,
            Parameter::CyanuricAcid => self.cyanuric_acid,
        }
    }

    /// Set (or clear) the value for `parameter`.
    pub fn set(&mut self, parameter: Parameter, value: Option<f64>) {
        let slot = match parameter {
            Parameter::Ph => &mut self.ph,
            Parameter::ChlorineFree => &mut self.chlorine_free,
            Parameter::ChlorineTotal => &mut self.chlorine_total,
            Parameter::Alkalinity => &mut self.alkalinity,
            Parameter::CalciumHardness => &mut self.calcium_hardness,
            Parameter::CyanuricAcid => &mut self.cyanuric_acid,
        };
        *slot = value;
    }

    /// Builder-style setter.
    ///
    /// ```
    /// use poolchem_types::{ChemistrySnapshot, Parameter};
    ///
    /// let snapshot = ChemistrySnapshot::new()
    ///     .with(Parameter::Ph, 7.4)
    ///     .with(Parameter::ChlorineFree, 1.5);
    /// assert_eq!(snapshot.get(Parameter::Ph), Some(7.4));
    /// assert_eq!(snapshot.get(Parameter::Alkalinity), None);
    /// ```
    #[must_use]
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        self.set(parameter, Some(value));
        self
    }

    /// Iterate over measured parameters and their values, in reporting order.
    pub fn measured(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        Parameter::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|v| (p, v)))
    }

    /// Whether no parameter was measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measured().next().is_none()
    }
}
