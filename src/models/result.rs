use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dose::{DoseDistribution, PatchCombination, TabletCount};
use super::enums::{DoseUnit, Route};
use crate::warnings::WarningItem;

/// OME contribution of one regimen row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugOme {
    pub entry_id: Uuid,
    pub drug: String,
    pub route: Route,
    /// Total daily dose in the row's own unit (mcg/hr for patches).
    pub tdd: f64,
    pub ome: f64,
}

/// Rescue dose for breakthrough pain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakthrough {
    pub drug: String,
    pub route: Route,
    pub single_dose: f64,
    pub max_daily: f64,
    /// Empty when the dose is not tablet-rounded.
    pub tablets: Vec<TabletCount>,
}

/// Outcome of one regimen conversion. Built once by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetResult {
    pub total_ome: f64,
    pub reduced_ome: f64,
    /// Theoretical daily dose before rounding.
    pub target_dose: f64,
    /// Daily dose actually delivered by the schedule or patches.
    pub actual_dose: f64,
    pub dose_unit: DoseUnit,
    pub dose_schedule: Vec<DoseDistribution>,
    pub patch_combination: Vec<PatchCombination>,
    pub rounding_delta_pct: f64,
    pub breakthrough: Option<Breakthrough>,
    pub warnings: Vec<WarningItem>,
    pub target_drug: String,
    pub target_route: Route,
    pub target_frequency: u32,
    /// Reduction actually applied, after the renal floor.
    pub reduction_pct: f64,
    pub is_methadone: bool,
    pub per_drug_ome: Vec<DrugOme>,
}

impl TargetResult {
    pub fn has_warning(&self, message_key: &str) -> bool {
        self.warnings.iter().any(|w| w.message_key == message_key)
    }
}
