// Numerical settings shared by the transformations of the data model
use crate::error::{NucDataError, Result};
use serde::{Deserialize, Serialize};

/// Default relative tolerance used when linearising tabulated functions.
pub const DEFAULT_LINEARISATION_TOLERANCE: f64 = 1e-3;

/// Default tolerance when checking that a density integrates to one.
pub const DEFAULT_NORMALISATION_TOLERANCE: f64 = 1e-10;

/// Default tolerance when checking that transition probabilities sum to one.
pub const DEFAULT_PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Numerical settings for the engine.
///
/// The engine keeps no global configuration: a `Config` is built by the
/// caller (usually with [`Config::default`] or from a JSON document) and
/// handed to the operations that need it. Missing JSON fields fall back to
/// the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relative tolerance for [`TabulatedFunction::linearise`](crate::TabulatedFunction::linearise).
    pub linearisation_tolerance: f64,
    /// Allowed deviation of a normalised density integral from one.
    pub normalisation_tolerance: f64,
    /// Allowed deviation of summed transition probabilities from one.
    pub probability_tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            linearisation_tolerance: DEFAULT_LINEARISATION_TOLERANCE,
            normalisation_tolerance: DEFAULT_NORMALISATION_TOLERANCE,
            probability_tolerance: DEFAULT_PROBABILITY_TOLERANCE,
        }
    }
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON and check that every tolerance is a
    /// positive finite number.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| NucDataError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every tolerance is a positive finite number.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("linearisation_tolerance", self.linearisation_tolerance),
            ("normalisation_tolerance", self.normalisation_tolerance),
            ("probability_tolerance", self.probability_tolerance),
        ];
        for (name, value) in fields {
            if !(value > 0.0 && value.is_finite()) {
                return Err(NucDataError::Config(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
