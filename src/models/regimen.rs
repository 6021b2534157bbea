use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BmiCategory, Gender, Route};

/// Drug ids are matched as lowercase, trimmed strings everywhere downstream.
pub fn canonical_drug_id(drug: &str) -> String {
    drug.trim().to_ascii_lowercase()
}

/// One row of the patient's current opioid regimen.
///
/// `doses` holds one amount per administration, so `doses.len()` equals
/// `frequency`. Patches are the exception: `frequency` is 1 and the single
/// value is the patch strength in mcg/hr.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpioidInput {
    /// Generated when the caller does not supply one.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// `None` while the row is still being filled in.
    #[serde(default)]
    pub drug: Option<String>,
    #[serde(default)]
    pub route: Option<Route>,
    /// Administrations per day.
    pub frequency: u32,
    pub doses: Vec<f64>,
    #[serde(default)]
    pub is_asymmetric: bool,
}

impl OpioidInput {
    /// Equal doses at every administration.
    pub fn symmetric(drug: &str, route: Route, dose: f64, frequency: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            drug: Some(drug.to_string()),
            route: Some(route),
            frequency,
            doses: vec![dose; frequency as usize],
            is_asymmetric: false,
        }
    }

    /// Individually specified doses, one per administration.
    pub fn asymmetric(drug: &str, route: Route, doses: Vec<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            drug: Some(drug.to_string()),
            route: Some(route),
            frequency: doses.len() as u32,
            doses,
            is_asymmetric: true,
        }
    }

    /// A transdermal fentanyl patch of the given strength.
    pub fn fentanyl_patch(mcg_per_hr: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            drug: Some("fentanyl".to_string()),
            route: Some(Route::Patch),
            frequency: 1,
            doses: vec![mcg_per_hr],
            is_asymmetric: false,
        }
    }

    /// Drug and route, when both have been chosen.
    pub fn selection(&self) -> Option<(&str, Route)> {
        match (self.drug.as_deref(), self.route) {
            (Some(drug), Some(route)) if !drug.is_empty() => Some((drug, route)),
            _ => None,
        }
    }

    /// Total daily dose: the sum when asymmetric, otherwise first dose times
    /// frequency. For patches this is the strength in mcg/hr.
    pub fn total_daily_dose(&self) -> f64 {
        if self.route == Some(Route::Patch) {
            return self.doses.first().copied().unwrap_or(0.0);
        }
        if self.is_asymmetric {
            self.doses.iter().sum()
        } else {
            self.doses.first().copied().unwrap_or(0.0) * f64::from(self.frequency)
        }
    }
}

/// What the current regimen should be converted into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetParams {
    pub drug: String,
    pub route: Route,
    /// Administrations per day. Ignored for patches.
    pub frequency: u32,
    /// Requested cross-tolerance reduction, 0–100.
    pub reduction_pct: f64,
    #[serde(default)]
    pub gfr: Option<f64>,
    #[serde(default)]
    pub bmi: Option<BmiCategory>,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Time-of-day labels for the schedule; positions without a label get `#n`.
    #[serde(default)]
    pub dose_labels: Vec<String>,
}

impl TargetParams {
    pub fn new(drug: &str, route: Route, frequency: u32, reduction_pct: f64) -> Self {
        Self {
            drug: drug.to_string(),
            route,
            frequency,
            reduction_pct,
            gfr: None,
            bmi: None,
            gender: None,
            dose_labels: Vec::new(),
        }
    }

    /// Copy with the drug id in canonical form.
    pub fn canonical(&self) -> Self {
        Self {
            drug: canonical_drug_id(&self.drug),
            ..self.clone()
        }
    }

    pub fn with_gfr(mut self, gfr: f64) -> Self {
        self.gfr = Some(gfr);
        self
    }

    pub fn with_bmi(mut self, bmi: BmiCategory) -> Self {
        self.bmi = Some(bmi);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.dose_labels = labels.into_iter().map(Into::into).collect();
        self
    }
}
