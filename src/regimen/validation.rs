use crate::models::{OpioidInput, Route, TargetParams};
use crate::reference::Formulary;

use super::RegimenError;

/// Checks on the target that must pass before any dose is computed.
pub fn validate_target(formulary: &Formulary, target: &TargetParams) -> Result<(), RegimenError> {
    if formulary.is_blocked_as_target(&target.drug) {
        return Err(RegimenError::BlockedTargetDrug(target.drug.clone()));
    }
    if !(0.0..=100.0).contains(&target.reduction_pct) {
        return Err(RegimenError::InvalidReduction(target.reduction_pct));
    }
    if let Some(gfr) = target.gfr {
        if !gfr.is_finite() || gfr < 0.0 {
            return Err(RegimenError::InvalidGfr(gfr));
        }
    }
    if target.route != Route::Patch && target.frequency == 0 {
        return Err(RegimenError::InvalidFrequency(target.frequency));
    }
    Ok(())
}

/// Shape checks for one selected regimen row.
pub fn validate_entry(
    formulary: &Formulary,
    entry: &OpioidInput,
    drug: &str,
    route: Route,
) -> Result<(), RegimenError> {
    if formulary.is_blocked_as_source(drug) {
        return Err(RegimenError::BlockedSourceDrug(drug.to_string()));
    }
    if entry.frequency == 0 {
        return Err(RegimenError::InvalidFrequency(entry.frequency));
    }

    let expected = if route == Route::Patch {
        if entry.frequency != 1 {
            return Err(RegimenError::InvalidFrequency(entry.frequency));
        }
        1
    } else {
        entry.frequency as usize
    };
    if entry.doses.len() != expected {
        return Err(RegimenError::DoseCountMismatch {
            entry: entry.id,
            expected,
            actual: entry.doses.len(),
        });
    }

    if let Some(&dose) = entry.doses.iter().find(|d| !d.is_finite() || **d < 0.0) {
        return Err(RegimenError::InvalidDose {
            entry: entry.id,
            dose,
        });
    }
    Ok(())
}
