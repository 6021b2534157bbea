//! Injected reference data: conversion factors, patch anchors, methadone
//! tiers and the drug formulary.
//!
//! The engine never reaches for module-level tables. Callers pass a
//! `ReferenceData`, either the bundled Hungarian default or one loaded from a
//! directory holding `conversions.json` and `formulary.json`.

pub mod formulary;

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conversion::{
    ConversionEntry, ConversionError, ConversionTable, FentanylPatchInterpolator,
    MethadoneTierConverter,
};

pub use formulary::{BrandEntry, DisplayName, DrugDefinition, Formulary};

pub const CONVERSIONS_FILE: &str = "conversions.json";
pub const FORMULARY_FILE: &str = "formulary.json";

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to read reference data {0}: {1}")]
    Io(String, String),

    #[error("Failed to parse {0}: {1}")]
    Json(String, String),

    #[error(transparent)]
    InvalidTable(#[from] ConversionError),
}

/// On-disk layout of `conversions.json`.
#[derive(Debug, Serialize, Deserialize)]
struct ConversionsFile {
    linear: Vec<ConversionEntry>,
    fentanyl_patch: FentanylPatchInterpolator,
    methadone_tiers: MethadoneTierConverter,
}

/// Everything the regimen pipeline looks up. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    pub conversions: ConversionTable,
    pub patch: FentanylPatchInterpolator,
    pub methadone: MethadoneTierConverter,
    pub formulary: Formulary,
}

static STANDARD: LazyLock<ReferenceData> = LazyLock::new(|| ReferenceData {
    conversions: ConversionTable::standard(),
    patch: FentanylPatchInterpolator::standard(),
    methadone: MethadoneTierConverter::standard(),
    formulary: Formulary::standard(),
});

impl ReferenceData {
    /// Bundled Hungarian protocol and market data.
    pub fn standard() -> &'static ReferenceData {
        &STANDARD
    }

    /// Load reference data from `conversions.json` and `formulary.json`.
    pub fn load(dir: &Path) -> Result<Self, ReferenceError> {
        let conversions_path = dir.join(CONVERSIONS_FILE);
        let formulary_path = dir.join(FORMULARY_FILE);

        let conversions_json = std::fs::read_to_string(&conversions_path).map_err(|e| {
            ReferenceError::Io(conversions_path.display().to_string(), e.to_string())
        })?;
        let formulary_json = std::fs::read_to_string(&formulary_path).map_err(|e| {
            ReferenceError::Io(formulary_path.display().to_string(), e.to_string())
        })?;

        let data = Self::from_json(&conversions_json, &formulary_json)?;
        tracing::info!(
            dir = %dir.display(),
            conversions = data.conversions.entries().len(),
            drugs = data.formulary.drugs.len(),
            "Reference data loaded"
        );
        Ok(data)
    }

    /// Parse reference data from the two JSON documents.
    pub fn from_json(conversions_json: &str, formulary_json: &str) -> Result<Self, ReferenceError> {
        let file: ConversionsFile = serde_json::from_str(conversions_json)
            .map_err(|e| ReferenceError::Json(CONVERSIONS_FILE.into(), e.to_string()))?;
        let formulary: Formulary = serde_json::from_str(formulary_json)
            .map_err(|e| ReferenceError::Json(FORMULARY_FILE.into(), e.to_string()))?;

        Ok(Self {
            conversions: ConversionTable::new(file.linear)?,
            patch: file.fentanyl_patch,
            methadone: file.methadone_tiers,
            formulary,
        })
    }

    /// Write the two reference documents into `dir`, creating it if needed.
    /// `load` on the same directory yields an equal value.
    pub fn write(&self, dir: &Path) -> Result<(), ReferenceError> {
        let file = ConversionsFile {
            linear: self.conversions.entries().to_vec(),
            fentanyl_patch: self.patch.clone(),
            methadone_tiers: self.methadone.clone(),
        };
        std::fs::create_dir_all(dir)
            .map_err(|e| ReferenceError::Io(dir.display().to_string(), e.to_string()))?;
        write_json(&dir.join(CONVERSIONS_FILE), &file)?;
        write_json(&dir.join(FORMULARY_FILE), &self.formulary)?;
        tracing::info!(dir = %dir.display(), "Reference data written");
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReferenceError> {
    let name = path.display().to_string();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ReferenceError::Json(name.clone(), e.to_string()))?;
    std::fs::write(path, json + "\n").map_err(|e| ReferenceError::Io(name, e.to_string()))
}
