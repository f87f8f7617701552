//! Plausibility validation for chemistry readings.
//!
//! This module flags values that cannot come from a real water test (a pH of
//! 17, negative ppm) and suspicious combinations such as total chlorine below
//! free chlorine. The dosing engine never validates; callers that accept
//! readings from the outside run the validator first.
//!
//! # Example
//!
//! ```
//! use poolchem_core::ReadingValidator;
//! use poolchem_types::{ChemistrySnapshot, Parameter};
//!
//! let validator = ReadingValidator::default();
//!
//! let snapshot = ChemistrySnapshot::new()
//!     .with(Parameter::Ph, 7.4)
//!     .with(Parameter::ChlorineFree, 2.0)
//!     .with(Parameter::ChlorineTotal, 2.3);
//!
//! let result = validator.validate(&snapshot);
//! assert!(result.is_valid);
//! assert!(!result.has_warnings());
//! ```

use serde::{Deserialize, Serialize};

use poolchem_types::{ChemistrySnapshot, Parameter};

use crate::error::{Error, Result};

/// Warning types for validation issues.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new warning types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ValidationWarning {
    /// A value is NaN or infinite.
    NotFinite { parameter: Parameter },
    /// pH is outside the 0-14 scale.
    PhOutOfScale { value: f64 },
    /// A ppm value is negative.
    Negative { parameter: Parameter, value: f64 },
    /// A ppm value exceeds the plausible maximum.
    TooHigh {
        parameter: Parameter,
        value: f64,
        max: f64,
    },
    /// Total chlorine reads lower than free chlorine.
    TotalBelowFree { total: f64, free: f64 },
    /// Combined chlorine (total minus free) is high enough to need shocking.
    CombinedChlorineHigh { value: f64, max: f64 },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::NotFinite { parameter } => {
                write!(f, "{} is not a finite number", parameter)
            }
            ValidationWarning::PhOutOfScale { value } => {
                write!(f, "pH {} is outside the 0-14 scale", value)
            }
            ValidationWarning::Negative { parameter, value } => {
                write!(f, "{} {} ppm is negative", parameter, value)
            }
            ValidationWarning::TooHigh {
                parameter,
                value,
                max,
            } => {
                write!(f, "{} {} ppm exceeds maximum {} ppm", parameter, value, max)
            }
            ValidationWarning::TotalBelowFree { total, free } => {
                write!(
                    f,
                    "Total chlorine {} ppm is below free chlorine {} ppm - check the test kit",
                    total, free
                )
            }
            ValidationWarning::CombinedChlorineHigh { value, max } => {
                write!(
                    f,
                    "Combined chlorine {} ppm exceeds {} ppm - consider shocking",
                    value, max
                )
            }
        }
    }
}

/// Result of validating a reading.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the reading passed validation.
    pub is_valid: bool,
    /// List of warnings (may be non-empty even if valid).
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a successful validation result with no warnings.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            warnings: Vec::new(),
        }
    }

    /// Create an invalid result with the given warnings.
    pub fn invalid(warnings: Vec<ValidationWarning>) -> Self {
        Self {
            is_valid: false,
            warnings,
        }
    }

    /// Create a valid result with warnings.
    pub fn valid_with_warnings(warnings: Vec<ValidationWarning>) -> Self {
        Self {
            is_valid: true,
            warnings,
        }
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Join all warnings into one message.
    pub fn message(&self) -> String {
        self.warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Turn an invalid result into [`Error::InvalidReading`]. A valid result
    /// yields its soft warnings.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(Error::InvalidReading(self.message()))
        }
    }
}

/// Configuration for reading validation.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum plausible free or total chlorine (ppm).
    pub chlorine_max: f64,
    /// Maximum plausible total alkalinity (ppm).
    pub alkalinity_max: f64,
    /// Maximum plausible calcium hardness (ppm).
    pub calcium_hardness_max: f64,
    /// Maximum plausible cyanuric acid (ppm).
    pub cyanuric_acid_max: f64,
    /// Combined chlorine above which a warning is raised (ppm).
    pub combined_chlorine_max: f64,
    /// Treat total chlorine below free chlorine as a warning.
    pub warn_on_total_below_free: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            chlorine_max: 50.0, // Above shock levels
            alkalinity_max: 1000.0,
            calcium_hardness_max: 2000.0,
            cyanuric_acid_max: 500.0,
            combined_chlorine_max: 0.5,
            warn_on_total_below_free: true,
        }
    }
}

impl ValidatorConfig {
    /// Create new validator config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum chlorine value (ppm).
    #[must_use]
    pub fn chlorine_max(mut self, max: f64) -> Self {
        self.chlorine_max = max;
        self
    }

    /// Set maximum total alkalinity (ppm).
    #[must_use]
    pub fn alkalinity_max(mut self, max: f64) -> Self {
        self.alkalinity_max = max;
        self
    }

    /// Set maximum calcium hardness (ppm).
    #[must_use]
    pub fn calcium_hardness_max(mut self, max: f64) -> Self {
        self.calcium_hardness_max = max;
        self
    }

    /// Set maximum cyanuric acid (ppm).
    #[must_use]
    pub fn cyanuric_acid_max(mut self, max: f64) -> Self {
        self.cyanuric_acid_max = max;
        self
    }

    /// Set the combined chlorine warning level (ppm).
    #[must_use]
    pub fn combined_chlorine_max(mut self, max: f64) -> Self {
        self.combined_chlorine_max = max;
        self
    }

    /// Set whether to warn when total chlorine reads below free chlorine.
    #[must_use]
    pub fn warn_on_total_below_free(mut self, warn: bool) -> Self {
        self.warn_on_total_below_free = warn;
        self
    }

    /// Create a config for salt-water and commercial pools, which run higher
    /// chlorine and stabilizer levels.
    pub fn relaxed() -> Self {
        Self {
            chlorine_max: 100.0,
            alkalinity_max: 2000.0,
            calcium_hardness_max: 5000.0,
            cyanuric_acid_max: 1000.0,
            combined_chlorine_max: 1.0,
            warn_on_total_below_free: false,
        }
    }

    fn max_for(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Ph => None,
            Parameter::ChlorineFree | Parameter::ChlorineTotal => Some(self.chlorine_max),
            Parameter::Alkalinity => Some(self.alkalinity_max),
            Parameter::CalciumHardness => Some(self.calcium_hardness_max),
            Parameter::CyanuricAcid => Some(self.cyanuric_acid_max),
        }
    }
}

/// Validator for chemistry readings.
#[derive(Debug, Clone, Default)]
pub struct ReadingValidator {
    config: ValidatorConfig,
}

impl ReadingValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate the measured values of a snapshot. Absent values are not checked.
    pub fn validate(&self, snapshot: &ChemistrySnapshot) -> ValidationResult {
        let mut warnings = Vec::new();

        for (parameter, value) in snapshot.measured() {
            if !value.is_finite() {
                warnings.push(ValidationWarning::NotFinite { parameter });
                continue;
            }

            if parameter == Parameter::Ph {
                if !self.is_ph_valid(value) {
                    warnings.push(ValidationWarning::PhOutOfScale { value });
                }
                continue;
            }

            if value < 0.0 {
                warnings.push(ValidationWarning::Negative { parameter, value });
            } else if let Some(max) = self.config.max_for(parameter)
                && value > max
            {
                warnings.push(ValidationWarning::TooHigh {
                    parameter,
                    value,
                    max,
                });
            }
        }

        // Chlorine relationship (only meaningful when both are plausible)
        if let (Some(free), Some(total)) = (snapshot.chlorine_free, snapshot.chlorine_total)
            && free.is_finite()
            && total.is_finite()
            && free >= 0.0
            && total >= 0.0
        {
            if total < free {
                if self.config.warn_on_total_below_free {
                    warnings.push(ValidationWarning::TotalBelowFree { total, free });
                }
            } else if total - free > self.config.combined_chlorine_max {
                warnings.push(ValidationWarning::CombinedChlorineHigh {
                    value: total - free,
                    max: self.config.combined_chlorine_max,
                });
            }
        }

        if warnings.is_empty() {
            return ValidationResult::valid();
        }

        let has_critical = warnings.iter().any(|w| {
            matches!(
                w,
                ValidationWarning::NotFinite { .. }
                    | ValidationWarning::PhOutOfScale { .. }
                    | ValidationWarning::Negative { .. }
                    | ValidationWarning::TooHigh { .. }
            )
        });

        if has_critical {
            ValidationResult::invalid(warnings)
        } else {
            ValidationResult::valid_with_warnings(warnings)
        }
    }

    /// Quick check if a pH value is on the 0-14 scale.
    pub fn is_ph_valid(&self, ph: f64) -> bool {
        (0.0..=14.0).contains(&ph)
    }
}
