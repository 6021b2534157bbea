use serde::{Deserialize, Serialize};

/// A quantity of one tablet strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TabletCount {
    pub strength_mg: f64,
    pub count: u32,
}

impl TabletCount {
    pub fn total_mg(&self) -> f64 {
        self.strength_mg * f64::from(self.count)
    }
}

/// One scheduled administration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseDistribution {
    pub label: String,
    pub total_mg: f64,
    /// Empty for injectable routes, where the dose is drawn up exactly.
    pub tablets: Vec<TabletCount>,
}

impl DoseDistribution {
    pub fn tablet_count(&self) -> u32 {
        self.tablets.iter().map(|t| t.count).sum()
    }
}

/// One patch size applied `count` times concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchCombination {
    pub mcg_per_hr: f64,
    pub count: u32,
}

/// Total delivery rate of a set of concurrent patches.
pub fn patch_total_mcg_per_hr(patches: &[PatchCombination]) -> f64 {
    patches
        .iter()
        .map(|p| p.mcg_per_hr * f64::from(p.count))
        .sum()
}

/// Number of individual patches to apply.
pub fn patch_count(patches: &[PatchCombination]) -> u32 {
    patches.iter().map(|p| p.count).sum()
}

/// Whether the combination uses a given strength, e.g. the 12 mcg/hr patch
/// that only one brand supplies.
pub fn uses_patch_size(patches: &[PatchCombination], mcg_per_hr: f64) -> bool {
    patches
        .iter()
        .any(|p| (p.mcg_per_hr - mcg_per_hr).abs() < f64::EPSILON && p.count > 0)
}

/// Total tablets swallowed per day across a schedule.
pub fn daily_tablet_count(schedule: &[DoseDistribution]) -> u32 {
    schedule.iter().map(DoseDistribution::tablet_count).sum()
}
