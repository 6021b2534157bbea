//! Regimen conversion: current opioids → target drug, schedule, rescue dose
//! and warnings.
//!
//! ```text
//! entries ─▶ TDD ─▶ OME ─▶ Σ ─▶ reduction (renal floor)
//!                                 │
//!           ┌─────────────────────┼──────────────────────┐
//!        methadone             patch              tablets / injectable
//!        tiers + tablets       mcg/hr + patches   from_ome + schedule
//!           └─────────────────────┴──────────────────────┘
//!                                 │
//!                      breakthrough ─▶ warnings ─▶ TargetResult
//! ```

pub mod pipeline;
pub mod request;
pub mod validation;

use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::conversion::ConversionError;

pub use pipeline::{compute_target_regimen, RegimenPipeline};
pub use request::ConversionRequest;

/// Reasons a regimen cannot be converted. All are raised before any result
/// is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegimenError {
    /// No conversion path for a drug/route pair (`ConversionError::NotFound`).
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("Invalid frequency: {0} administrations per day")]
    InvalidFrequency(u32),

    #[error("Entry {entry}: expected {expected} doses, got {actual}")]
    DoseCountMismatch {
        entry: Uuid,
        expected: usize,
        actual: usize,
    },

    #[error("Entry {entry}: invalid dose {dose}")]
    InvalidDose { entry: Uuid, dose: f64 },

    #[error("Reduction must be between 0 and 100%, got {0}")]
    InvalidReduction(f64),

    #[error("GFR must be a non-negative number, got {0}")]
    InvalidGfr(f64),

    #[error("{0} cannot be used as a target drug")]
    BlockedTargetDrug(String),

    #[error("{0} cannot be converted as a current drug")]
    BlockedSourceDrug(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Route;

    #[test]
    fn conversion_error_passes_through() {
        let err: RegimenError = ConversionError::NotFound {
            drug: "methadone".into(),
            route: Route::Oral,
        }
        .into();
        assert_eq!(err.to_string(), "No conversion entry for methadone (oral)");
    }

    #[test]
    fn blocked_target_message() {
        let err = RegimenError::BlockedTargetDrug("pethidine".into());
        assert_eq!(err.to_string(), "pethidine cannot be used as a target drug");
    }
}
