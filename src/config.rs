//! Engine configuration.
//!
//! The clinical constants that steer rounding and breakthrough dosing. The
//! defaults are the values of the Semmelweis opioid rotation protocol; a
//! caller may deserialize an alternative set for another protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "PalliCalc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming a directory with `conversions.json` and `formulary.json`.
pub const REFERENCE_DIR_ENV: &str = "PALLICALC_REFERENCE_DIR";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "pallicalc=info"
}

/// Tunable constants for the rounding and breakthrough stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum relative error accepted for an all-equal schedule.
    pub symmetric_tolerance: f64,
    /// Hard ceiling on rounding above the calculated dose.
    pub round_up_cap: f64,
    /// Breakthrough single dose is this fraction (1/n) of the daily total.
    pub breakthrough_divisor: f64,
    /// Two tablet sums closer than this are the same dose.
    pub exact_match_epsilon: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid engine config: {field} = {value}")]
pub struct ConfigError {
    pub field: &'static str,
    pub value: f64,
}

impl EngineConfig {
    /// Reject constants that would make rounding or rescue dosing meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = |v: f64| (0.0..=1.0).contains(&v);
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let checks = [
            ("symmetric_tolerance", self.symmetric_tolerance, fraction(self.symmetric_tolerance)),
            ("round_up_cap", self.round_up_cap, fraction(self.round_up_cap)),
            ("breakthrough_divisor", self.breakthrough_divisor, positive(self.breakthrough_divisor)),
            ("exact_match_epsilon", self.exact_match_epsilon, positive(self.exact_match_epsilon)),
        ];
        match checks.into_iter().find(|(_, _, ok)| !ok) {
            Some((field, value, _)) => Err(ConfigError { field, value }),
            None => Ok(()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symmetric_tolerance: 0.10,
            round_up_cap: 0.15,
            breakthrough_divisor: 6.0,
            exact_match_epsilon: 0.001,
        }
    }
}
