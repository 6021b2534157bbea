//! Dose ↔ Oral Morphine Equivalent conversions.
//!
//! Three converters share the OME reference unit:
//! 1. Linear factor table for most drug/route pairs
//! 2. Piecewise-linear fentanyl patch interpolation (mcg/hr ↔ OME)
//! 3. Dose-banded methadone ratios (OME → methadone only)

pub mod fentanyl;
pub mod methadone;
pub mod table;

use thiserror::Error;

use crate::models::Route;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("No conversion entry for {drug} ({route})")]
    NotFound { drug: String, route: Route },

    #[error("Invalid conversion table: {0}")]
    InvalidTable(String),
}

pub use fentanyl::{FentanylPatchAnchor, FentanylPatchInterpolator};
pub use methadone::{MethadoneTier, MethadoneTierConverter};
pub use table::{ConversionEntry, ConversionTable};

/// Apply a cross-tolerance reduction to an OME value.
pub fn apply_reduction(ome: f64, reduction_pct: f64) -> f64 {
    ome * (1.0 - reduction_pct / 100.0)
}
