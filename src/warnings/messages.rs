//! Message keys. The engine emits keys only; wording and translation live
//! with the caller.

use crate::models::DrugRole;

pub const GFR_BELOW_30: &str = "warning.gfr.below30";
pub const GFR_BELOW_10: &str = "warning.gfr.below10";

pub const GFR_DRUG_AVOID: &str = "warning.gfr.drug.avoid";
pub const GFR_DRUG_CONTRAINDICATED: &str = "warning.gfr.drug.contraindicated";
pub const GFR_DRUG_CAUTION: &str = "warning.gfr.drug.caution";
pub const GFR_DRUG_PREFERRED: &str = "warning.gfr.drug.preferred";

pub const BMI_LOW: &str = "warning.bmi.low";
pub const BMI_HIGH: &str = "warning.bmi.high";
pub const GENDER_FEMALE: &str = "warning.gender.female";

pub const DRUG_METHADONE: &str = "warning.drug.methadone";
pub const DRUG_OXYCODONE_NALOXONE_HEPATIC: &str = "warning.drug.oxycodone_naloxone.hepatic";
pub const DRUG_FENTANYL_MUCOSAL: &str = "warning.drug.fentanyl.mucosal";
pub const PATCH_ONSET: &str = "patch.onset";

pub const DRUG_TRAMADOL_MAX: &str = "warning.drug.tramadol.max";
pub const DRUG_MIN_DOSE: &str = "warning.drug.minDose";
pub const DRUG_OXYCODONE_MIN_OXYCONTIN: &str = "warning.drug.oxycodone.minOxyContin";

pub const BREAKTHROUGH_ESCALATION: &str = "warning.breakthrough.escalation";

/// `warning.drug.<drug>.source` / `.target` for drugs whose warning depends on
/// which side of the rotation they are on.
pub fn drug_role_key(drug: &str, role: DrugRole) -> String {
    format!("warning.drug.{}.{}", drug, role.as_str())
}

/// Per-drug ceiling key. Only tramadol carries a ceiling today.
pub fn max_daily_key(drug: &str) -> String {
    format!("warning.drug.{drug}.max")
}

/// Minimum-strength key: oxycodone names its smallest retard brand.
pub fn min_dose_key(drug: &str) -> &'static str {
    if drug == "oxycodone" {
        DRUG_OXYCODONE_MIN_OXYCONTIN
    } else {
        DRUG_MIN_DOSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_keys() {
        assert_eq!(drug_role_key("pethidine", DrugRole::Source), "warning.drug.pethidine.source");
        assert_eq!(drug_role_key("nalbuphine", DrugRole::Target), "warning.drug.nalbuphine.target");
    }

    #[test]
    fn tramadol_max_key_matches_constant() {
        assert_eq!(max_daily_key("tramadol"), DRUG_TRAMADOL_MAX);
    }

    #[test]
    fn min_dose_key_by_drug() {
        assert_eq!(min_dose_key("oxycodone"), DRUG_OXYCODONE_MIN_OXYCONTIN);
        assert_eq!(min_dose_key("morphine"), DRUG_MIN_DOSE);
    }
}
