use std::time::Instant;

use crate::config::EngineConfig;
use crate::conversion::{apply_reduction, ConversionError};
use crate::models::{
    canonical_drug_id, patch_total_mcg_per_hr, Breakthrough, DoseDistribution, DoseUnit, DrugOme,
    DrugRole, OpioidInput, PatchCombination, Route, TabletCount, TargetParams, TargetResult,
};
use crate::reference::ReferenceData;
use crate::rounding::distribution::label_at;
use crate::rounding::{combine_patches, distribute, round_down, tablet_total};
use crate::warnings::{aggregate, rules, WarningItem};

use super::validation::{validate_entry, validate_target};
use super::RegimenError;

const METHADONE: &str = "methadone";
const FENTANYL: &str = "fentanyl";
/// Patch rescue doses are given as oral morphine.
const PATCH_RESCUE_DRUG: &str = "morphine";

/// Convert a regimen against the given reference data with the default
/// clinical constants.
pub fn compute_target_regimen(
    reference: &ReferenceData,
    regimen: &[OpioidInput],
    target: &TargetParams,
) -> Result<TargetResult, RegimenError> {
    RegimenPipeline::new(reference).compute(regimen, target)
}

/// Orchestrates conversion, rounding, rescue dosing and warnings for one
/// regimen. Holds no state between calls.
pub struct RegimenPipeline<'a> {
    reference: &'a ReferenceData,
    config: EngineConfig,
}

/// Summed contribution of the current regimen.
struct SourceOme {
    total: f64,
    breakdown: Vec<DrugOme>,
    warnings: Vec<WarningItem>,
}

/// Target dose before and after rounding.
struct RoundedDose {
    target: f64,
    actual: f64,
    unit: DoseUnit,
    schedule: Vec<DoseDistribution>,
    patches: Vec<PatchCombination>,
}

impl<'a> RegimenPipeline<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self {
            reference,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn compute(
        &self,
        regimen: &[OpioidInput],
        target: &TargetParams,
    ) -> Result<TargetResult, RegimenError> {
        self.run(regimen, target).inspect_err(|e| {
            tracing::warn!(
                target_drug = %target.drug,
                target_route = %target.route,
                error = %e,
                "Regimen conversion refused"
            );
        })
    }

    fn run(&self, regimen: &[OpioidInput], target: &TargetParams) -> Result<TargetResult, RegimenError> {
        let start = Instant::now();
        self.config.validate()?;
        let target = &target.canonical();
        validate_target(&self.reference.formulary, target)?;

        // Step 1: current regimen → OME
        let source = self.source_ome(regimen)?;

        // Step 2: cross-tolerance reduction
        let reduction_pct = rules::effective_reduction(target.reduction_pct, target.gfr);
        let reduced_ome = apply_reduction(source.total, reduction_pct);
        tracing::debug!(
            total_ome = source.total,
            requested_pct = target.reduction_pct,
            effective_pct = reduction_pct,
            reduced_ome,
            "Reduction applied"
        );

        // Steps 3-4: patient and target-drug warnings
        let mut warnings = source.warnings;
        warnings.extend(rules::gfr_warnings(target.gfr));
        warnings.extend(rules::gfr_drug_advice(&target.drug, target.gfr));
        warnings.extend(rules::drug_warnings(&target.drug, DrugRole::Target));
        warnings.extend(rules::route_warnings(&target.drug, target.route));
        warnings.extend(rules::patient_warnings(target.bmi, target.gender));

        // Step 5: OME → target drug, rounded to what can be given
        let dose = self.target_dose(target, reduced_ome)?;
        if target.route != Route::Patch {
            warnings.extend(self.dose_limit_warnings(target, &dose));
        }
        let rounding_delta_pct = if dose.target > 0.0 {
            (dose.actual - dose.target) / dose.target * 100.0
        } else {
            0.0
        };

        // Step 6: breakthrough
        let breakthrough = self.breakthrough(target, reduced_ome, dose.actual);
        if let Some(rescue) = &breakthrough {
            warnings.extend(rules::escalation_warning(rescue.max_daily));
        }

        let warnings = aggregate(warnings);

        tracing::info!(
            entries = source.breakdown.len(),
            target_drug = %target.drug,
            target_route = %target.route,
            total_ome = round2(source.total),
            reduced_ome = round2(reduced_ome),
            actual_dose = round2(dose.actual),
            warnings = warnings.len(),
            processing_us = start.elapsed().as_micros() as u64,
            "Regimen conversion complete"
        );

        Ok(TargetResult {
            total_ome: round2(source.total),
            reduced_ome: round2(reduced_ome),
            target_dose: round2(dose.target),
            actual_dose: round2(dose.actual),
            dose_unit: dose.unit,
            dose_schedule: dose
                .schedule
                .into_iter()
                .map(|d| DoseDistribution {
                    total_mg: round2(d.total_mg),
                    ..d
                })
                .collect(),
            patch_combination: dose.patches,
            rounding_delta_pct: round1(rounding_delta_pct),
            breakthrough,
            warnings,
            target_drug: target.drug.clone(),
            target_route: target.route,
            target_frequency: target.frequency,
            reduction_pct: round1(reduction_pct),
            is_methadone: target.drug == METHADONE,
            per_drug_ome: source.breakdown,
        })
    }

    // -----------------------------------------------------------------------
    // Source side
    // -----------------------------------------------------------------------

    fn source_ome(&self, regimen: &[OpioidInput]) -> Result<SourceOme, RegimenError> {
        let mut total = 0.0;
        let mut breakdown = Vec::new();
        let mut warnings = Vec::new();

        for entry in regimen {
            let Some((drug, route)) = entry.selection() else {
                continue;
            };
            let drug = canonical_drug_id(drug);
            let drug = drug.as_str();
            validate_entry(&self.reference.formulary, entry, drug, route)?;

            let tdd = entry.total_daily_dose();
            if tdd <= 0.0 {
                continue;
            }

            let ome = self.entry_ome(drug, route, tdd)?;
            tracing::debug!(entry = %entry.id, %drug, %route, tdd, ome, "Entry converted");

            total += ome;
            breakdown.push(DrugOme {
                entry_id: entry.id,
                drug: drug.to_string(),
                route,
                tdd: round2(tdd),
                ome: round2(ome),
            });
            warnings.extend(rules::drug_warnings(drug, DrugRole::Source));
            warnings.extend(rules::route_warnings(drug, route));
        }

        Ok(SourceOme {
            total,
            breakdown,
            warnings,
        })
    }

    fn entry_ome(&self, drug: &str, route: Route, tdd: f64) -> Result<f64, RegimenError> {
        if route == Route::Patch {
            if drug != FENTANYL {
                return Err(not_found(drug, route));
            }
            return Ok(self.reference.patch.mcg_to_ome(tdd));
        }
        Ok(self.reference.conversions.to_ome(drug, route, tdd)?)
    }

    // -----------------------------------------------------------------------
    // Target side
    // -----------------------------------------------------------------------

    fn target_dose(&self, target: &TargetParams, reduced_ome: f64) -> Result<RoundedDose, RegimenError> {
        let drug = target.drug.as_str();
        let route = target.route;

        let dose = if drug == METHADONE {
            if route != Route::Oral {
                return Err(not_found(drug, route));
            }
            let tdd = self.reference.methadone.ome_to_methadone(reduced_ome);
            self.tablet_dose(target, tdd)
        } else if route == Route::Patch {
            if drug != FENTANYL {
                return Err(not_found(drug, route));
            }
            let mcg = self.reference.patch.ome_to_mcg(reduced_ome);
            let sizes = self.reference.formulary.tablet_sizes(FENTANYL, Route::Patch);
            let patches = combine_patches(mcg, &sizes);
            RoundedDose {
                target: mcg,
                actual: patch_total_mcg_per_hr(&patches),
                unit: DoseUnit::McgPerHr,
                schedule: Vec::new(),
                patches,
            }
        } else if route.is_injectable() {
            let tdd = self.reference.conversions.from_ome(drug, route, reduced_ome)?;
            let per_dose = tdd / f64::from(target.frequency);
            RoundedDose {
                target: tdd,
                actual: tdd,
                unit: DoseUnit::Mg,
                schedule: (0..target.frequency as usize)
                    .map(|i| DoseDistribution {
                        label: label_at(&target.dose_labels, i),
                        total_mg: per_dose,
                        tablets: Vec::new(),
                    })
                    .collect(),
                patches: Vec::new(),
            }
        } else {
            let tdd = self.reference.conversions.from_ome(drug, route, reduced_ome)?;
            self.tablet_dose(target, tdd)
        };

        tracing::debug!(
            %drug,
            %route,
            target_dose = dose.target,
            actual_dose = dose.actual,
            administrations = dose.schedule.len(),
            patches = dose.patches.len(),
            "Target dose rounded"
        );
        Ok(dose)
    }

    /// Schedule against the drug's tablet strengths; exact when it has none.
    fn tablet_dose(&self, target: &TargetParams, tdd: f64) -> RoundedDose {
        let sizes = self
            .reference
            .formulary
            .tablet_sizes(&target.drug, target.route);
        let (schedule, actual) = if sizes.is_empty() {
            (Vec::new(), tdd)
        } else {
            let schedule = distribute(
                tdd,
                target.frequency,
                &sizes,
                &target.dose_labels,
                &self.config,
            );
            let actual: f64 = schedule.iter().map(|d| d.total_mg).sum();
            (schedule, actual)
        };
        RoundedDose {
            target: tdd,
            actual,
            unit: DoseUnit::Mg,
            schedule,
            patches: Vec::new(),
        }
    }

    fn dose_limit_warnings(&self, target: &TargetParams, dose: &RoundedDose) -> Vec<WarningItem> {
        let formulary = &self.reference.formulary;
        let ceiling = rules::max_daily_dose_warning(
            &target.drug,
            dose.actual,
            formulary.max_daily_dose(&target.drug),
        );
        let minimum = formulary
            .minimum_dose(&target.drug, target.route)
            .and_then(|min| {
                dose.schedule
                    .iter()
                    .find_map(|d| rules::min_dose_warning(&target.drug, d.total_mg, Some(min)))
            });
        ceiling.into_iter().chain(minimum).collect()
    }

    // -----------------------------------------------------------------------
    // Breakthrough
    // -----------------------------------------------------------------------

    fn breakthrough(&self, target: &TargetParams, reduced_ome: f64, actual: f64) -> Option<Breakthrough> {
        let formulary = &self.reference.formulary;
        let divisor = self.config.breakthrough_divisor;

        let (drug, route, raw, sizes) = if target.route == Route::Patch {
            (
                PATCH_RESCUE_DRUG.to_string(),
                Route::Oral,
                reduced_ome / divisor,
                formulary.ir_tablet_sizes(PATCH_RESCUE_DRUG),
            )
        } else if target.route.is_injectable() {
            (target.drug.clone(), target.route, actual / divisor, Vec::new())
        } else {
            let sizes = formulary.ir_tablet_sizes(&target.drug);
            if sizes.is_empty() {
                (target.drug.clone(), target.route, actual / divisor, sizes)
            } else {
                let drug = formulary.ir_drug(&target.drug).to_string();
                (drug, Route::Oral, actual / divisor, sizes)
            }
        };

        let (single, tablets): (f64, Vec<TabletCount>) = if sizes.is_empty() {
            (raw, Vec::new())
        } else {
            let tablets = round_down(raw, &sizes);
            (tablet_total(&tablets), tablets)
        };
        if !(single > 0.0) {
            return None;
        }

        tracing::debug!(%drug, %route, single_dose = single, "Breakthrough dose");
        Some(Breakthrough {
            drug,
            route,
            single_dose: round2(single),
            max_daily: round2(single * divisor),
            tablets,
        })
    }
}

fn not_found(drug: &str, route: Route) -> RegimenError {
    ConversionError::NotFound {
        drug: drug.to_string(),
        route,
    }
    .into()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
