use serde::{Deserialize, Serialize};

use super::ConversionError;
use crate::models::Route;

/// Linear conversion factors for one drug/route pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEntry {
    pub drug: String,
    pub route: Route,
    pub factor_to_ome: f64,
    pub factor_from_ome: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    "mg".to_string()
}

/// Linear OME factor table. Fentanyl patches and methadone are deliberately
/// absent: they have dedicated converters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionTable {
    entries: Vec<ConversionEntry>,
}

impl ConversionTable {
    pub fn new(entries: Vec<ConversionEntry>) -> Result<Self, ConversionError> {
        for entry in &entries {
            let valid = entry.factor_to_ome.is_finite()
                && entry.factor_to_ome > 0.0
                && entry.factor_from_ome.is_finite()
                && entry.factor_from_ome > 0.0;
            if !valid {
                return Err(ConversionError::InvalidTable(format!(
                    "non-positive factor for {} ({})",
                    entry.drug, entry.route
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Hungarian palliative protocol factors.
    pub fn standard() -> Self {
        let row = |drug: &str, route, to, from| ConversionEntry {
            drug: drug.to_string(),
            route,
            factor_to_ome: to,
            factor_from_ome: from,
            unit: default_unit(),
        };
        Self {
            entries: vec![
                row("morphine", Route::Oral, 1.0, 1.0),
                row("morphine", Route::ScIv, 3.0, 0.333),
                row("oxycodone", Route::Oral, 1.5, 0.667),
                row("oxycodone", Route::ScIv, 3.0, 0.333),
                row("hydromorphone", Route::Oral, 5.0, 0.2),
                row("hydromorphone", Route::ScIv, 15.0, 0.067),
                row("tramadol", Route::Oral, 0.1, 10.0),
                row("tramadol", Route::Iv, 0.1, 10.0),
                row("codeine", Route::Oral, 0.1, 10.0),
                row("dihydrocodeine", Route::Oral, 0.1, 10.0),
                row("fentanyl", Route::ScIv, 100.0, 0.01),
                row("fentanyl", Route::OralMucosal, 50.0, 0.02),
                // Naloxone acts locally in the gut; potency follows oxycodone.
                row("oxycodone-naloxone", Route::Oral, 1.5, 0.667),
            ],
        }
    }

    pub fn entries(&self) -> &[ConversionEntry] {
        &self.entries
    }

    pub fn find(&self, drug: &str, route: Route) -> Option<&ConversionEntry> {
        self.entries
            .iter()
            .find(|e| e.route == route && e.drug.eq_ignore_ascii_case(drug))
    }

    fn require(&self, drug: &str, route: Route) -> Result<&ConversionEntry, ConversionError> {
        self.find(drug, route).ok_or_else(|| ConversionError::NotFound {
            drug: drug.to_string(),
            route,
        })
    }

    /// Total daily dose → OME mg/day.
    pub fn to_ome(&self, drug: &str, route: Route, tdd: f64) -> Result<f64, ConversionError> {
        Ok(tdd * self.require(drug, route)?.factor_to_ome)
    }

    /// OME mg/day → total daily dose of `drug` by `route`.
    pub fn from_ome(&self, drug: &str, route: Route, ome: f64) -> Result<f64, ConversionError> {
        Ok(ome * self.require(drug, route)?.factor_from_ome)
    }
}
