use crate::models::{BmiCategory, DrugRole, Gender, GfrRisk, Route, Severity};

use super::messages;
use super::types::WarningItem;

/// Below this GFR (ml/min) every renal rule applies.
const GFR_IMPAIRED: f64 = 30.0;
/// Below this GFR the stricter renal floor applies.
const GFR_SEVERE: f64 = 10.0;

// ---------------------------------------------------------------------------
// Renal function
// ---------------------------------------------------------------------------

/// Smallest cross-tolerance reduction (%) allowed for a GFR.
pub fn min_reduction(gfr: Option<f64>) -> f64 {
    match gfr {
        Some(g) if g < GFR_SEVERE => 50.0,
        Some(g) if g < GFR_IMPAIRED => 25.0,
        _ => 0.0,
    }
}

/// Reduction actually applied: the request, floored by the renal minimum.
pub fn effective_reduction(requested_pct: f64, gfr: Option<f64>) -> f64 {
    requested_pct.max(min_reduction(gfr))
}

fn renal_impaired(gfr: Option<f64>) -> bool {
    matches!(gfr, Some(g) if g < GFR_IMPAIRED)
}

/// General renal warnings, independent of the drug.
pub fn gfr_warnings(gfr: Option<f64>) -> Vec<WarningItem> {
    let mut warnings = Vec::new();
    if !renal_impaired(gfr) {
        return warnings;
    }
    warnings.push(WarningItem::new(Severity::Danger, messages::GFR_BELOW_30));
    if matches!(gfr, Some(g) if g < GFR_SEVERE) {
        warnings.push(WarningItem::new(Severity::Danger, messages::GFR_BELOW_10));
    }
    warnings
}

/// Renal risk class of a drug (metabolite accumulation).
pub fn gfr_risk(drug: &str) -> GfrRisk {
    match drug {
        "morphine" | "codeine" | "dihydrocodeine" => GfrRisk::Avoid,
        "pethidine" => GfrRisk::Contraindicated,
        "oxycodone" | "hydromorphone" | "tramadol" | "oxycodone-naloxone" => GfrRisk::Caution,
        "fentanyl" | "methadone" => GfrRisk::Preferred,
        _ => GfrRisk::Normal,
    }
}

/// Target-drug advice when renal function is impaired.
pub fn gfr_drug_advice(drug: &str, gfr: Option<f64>) -> Vec<WarningItem> {
    if !renal_impaired(gfr) {
        return Vec::new();
    }
    let (severity, key) = match gfr_risk(drug) {
        GfrRisk::Avoid => (Severity::Danger, messages::GFR_DRUG_AVOID),
        GfrRisk::Contraindicated => (Severity::Danger, messages::GFR_DRUG_CONTRAINDICATED),
        GfrRisk::Caution => (Severity::Caution, messages::GFR_DRUG_CAUTION),
        GfrRisk::Preferred => (Severity::Preferred, messages::GFR_DRUG_PREFERRED),
        GfrRisk::Normal => return Vec::new(),
    };
    vec![WarningItem::new(severity, key).with_param("drug", drug)]
}

// ---------------------------------------------------------------------------
// Patient parameters
// ---------------------------------------------------------------------------

pub fn bmi_warnings(bmi: Option<BmiCategory>) -> Vec<WarningItem> {
    match bmi {
        Some(BmiCategory::Low) => vec![WarningItem::new(Severity::Caution, messages::BMI_LOW)],
        Some(BmiCategory::High) => vec![WarningItem::new(Severity::Caution, messages::BMI_HIGH)],
        Some(BmiCategory::Normal) | None => Vec::new(),
    }
}

pub fn gender_warnings(gender: Option<Gender>) -> Vec<WarningItem> {
    match gender {
        Some(Gender::Female) => vec![WarningItem::new(Severity::Caution, messages::GENDER_FEMALE)],
        _ => Vec::new(),
    }
}

pub fn patient_warnings(bmi: Option<BmiCategory>, gender: Option<Gender>) -> Vec<WarningItem> {
    bmi_warnings(bmi)
        .into_iter()
        .chain(gender_warnings(gender))
        .collect()
}

// ---------------------------------------------------------------------------
// Drug-specific
// ---------------------------------------------------------------------------

/// Warnings tied to the drug itself, on either side of the rotation.
pub fn drug_warnings(drug: &str, role: DrugRole) -> Vec<WarningItem> {
    match drug {
        "methadone" => vec![WarningItem::new(Severity::Danger, messages::DRUG_METHADONE)],
        "nalbuphine" | "pethidine" => vec![WarningItem::new(
            Severity::Danger,
            &messages::drug_role_key(drug, role),
        )],
        "oxycodone-naloxone" => vec![WarningItem::new(
            Severity::Info,
            messages::DRUG_OXYCODONE_NALOXONE_HEPATIC,
        )],
        _ => Vec::new(),
    }
}

/// Warnings tied to a drug/route pair.
pub fn route_warnings(drug: &str, route: Route) -> Vec<WarningItem> {
    match (drug, route) {
        ("fentanyl", Route::OralMucosal) => vec![WarningItem::new(
            Severity::Caution,
            messages::DRUG_FENTANYL_MUCOSAL,
        )],
        ("fentanyl", Route::Patch) => vec![WarningItem::new(Severity::Info, messages::PATCH_ONSET)],
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Dose limits
// ---------------------------------------------------------------------------

/// Daily dose above the drug's ceiling.
pub fn max_daily_dose_warning(
    drug: &str,
    daily_mg: f64,
    max_daily_mg: Option<f64>,
) -> Option<WarningItem> {
    let max = max_daily_mg?;
    (daily_mg > max).then(|| {
        WarningItem::new(Severity::Danger, &messages::max_daily_key(drug))
            .with_param("dose", daily_mg.round())
            .with_param("max", max)
    })
}

/// A single administration smaller than the smallest available strength.
pub fn min_dose_warning(drug: &str, dose_mg: f64, min_mg: Option<f64>) -> Option<WarningItem> {
    let min = min_mg?;
    (dose_mg > 0.0 && dose_mg < min).then(|| {
        WarningItem::new(Severity::Caution, messages::min_dose_key(drug))
            .with_param("calculated", (dose_mg * 10.0).round() / 10.0)
            .with_param("min", min)
    })
}

/// Reminder to reassess the baseline when rescue doses are in use.
pub fn escalation_warning(breakthrough_max_daily: f64) -> Option<WarningItem> {
    (breakthrough_max_daily > 0.0)
        .then(|| WarningItem::new(Severity::Info, messages::BREAKTHROUGH_ESCALATION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::ParamValue;

    fn keys(warnings: &[WarningItem]) -> Vec<&str> {
        warnings.iter().map(|w| w.message_key.as_str()).collect()
    }

    #[test]
    fn min_reduction_bands() {
        assert_eq!(min_reduction(None), 0.0);
        assert_eq!(min_reduction(Some(60.0)), 0.0);
        assert_eq!(min_reduction(Some(30.0)), 0.0);
        assert_eq!(min_reduction(Some(29.9)), 25.0);
        assert_eq!(min_reduction(Some(10.0)), 25.0);
        assert_eq!(min_reduction(Some(9.9)), 50.0);
        assert_eq!(min_reduction(Some(0.0)), 50.0);
    }

    #[test]
    fn effective_reduction_floors_request() {
        assert_eq!(effective_reduction(25.0, Some(8.0)), 50.0);
        assert_eq!(effective_reduction(75.0, Some(8.0)), 75.0);
        assert_eq!(effective_reduction(0.0, None), 0.0);
    }

    #[test]
    fn gfr_general_warnings() {
        assert!(gfr_warnings(None).is_empty());
        assert!(gfr_warnings(Some(45.0)).is_empty());
        assert_eq!(keys(&gfr_warnings(Some(20.0))), vec![messages::GFR_BELOW_30]);
        assert_eq!(
            keys(&gfr_warnings(Some(5.0))),
            vec![messages::GFR_BELOW_30, messages::GFR_BELOW_10]
        );
    }

    #[test]
    fn gfr_risk_matrix() {
        assert_eq!(gfr_risk("morphine"), GfrRisk::Avoid);
        assert_eq!(gfr_risk("dihydrocodeine"), GfrRisk::Avoid);
        assert_eq!(gfr_risk("pethidine"), GfrRisk::Contraindicated);
        assert_eq!(gfr_risk("oxycodone-naloxone"), GfrRisk::Caution);
        assert_eq!(gfr_risk("methadone"), GfrRisk::Preferred);
        assert_eq!(gfr_risk("nalbuphine"), GfrRisk::Normal);
    }

    #[test]
    fn gfr_drug_advice_severities() {
        let avoid = gfr_drug_advice("morphine", Some(20.0));
        assert_eq!(avoid[0].severity, Severity::Danger);
        assert_eq!(avoid[0].message_key, messages::GFR_DRUG_AVOID);
        assert_eq!(avoid[0].params.get("drug"), Some(&ParamValue::from("morphine")));

        let preferred = gfr_drug_advice("fentanyl", Some(20.0));
        assert_eq!(preferred[0].severity, Severity::Preferred);

        let caution = gfr_drug_advice("hydromorphone", Some(20.0));
        assert_eq!(caution[0].severity, Severity::Caution);

        assert!(gfr_drug_advice("morphine", Some(40.0)).is_empty());
        assert!(gfr_drug_advice("morphine", None).is_empty());
        assert!(gfr_drug_advice("nalbuphine", Some(5.0)).is_empty());
    }

    #[test]
    fn bmi_and_gender() {
        assert_eq!(keys(&bmi_warnings(Some(BmiCategory::Low))), vec![messages::BMI_LOW]);
        assert_eq!(keys(&bmi_warnings(Some(BmiCategory::High))), vec![messages::BMI_HIGH]);
        assert!(bmi_warnings(Some(BmiCategory::Normal)).is_empty());
        assert!(bmi_warnings(None).is_empty());
        assert_eq!(keys(&gender_warnings(Some(Gender::Female))), vec![messages::GENDER_FEMALE]);
        assert!(gender_warnings(Some(Gender::Male)).is_empty());
        assert_eq!(
            patient_warnings(Some(BmiCategory::Low), Some(Gender::Female)).len(),
            2
        );
    }

    #[test]
    fn drug_identity() {
        assert_eq!(
            keys(&drug_warnings("methadone", DrugRole::Target)),
            vec![messages::DRUG_METHADONE]
        );
        assert_eq!(
            keys(&drug_warnings("nalbuphine", DrugRole::Source)),
            vec!["warning.drug.nalbuphine.source"]
        );
        assert_eq!(
            keys(&drug_warnings("pethidine", DrugRole::Target)),
            vec!["warning.drug.pethidine.target"]
        );
        let hepatic = drug_warnings("oxycodone-naloxone", DrugRole::Source);
        assert_eq!(hepatic[0].severity, Severity::Info);
        assert!(drug_warnings("morphine", DrugRole::Target).is_empty());
    }

    #[test]
    fn fentanyl_routes() {
        assert_eq!(
            keys(&route_warnings("fentanyl", Route::OralMucosal)),
            vec![messages::DRUG_FENTANYL_MUCOSAL]
        );
        assert_eq!(keys(&route_warnings("fentanyl", Route::Patch)), vec![messages::PATCH_ONSET]);
        assert!(route_warnings("fentanyl", Route::ScIv).is_empty());
        assert!(route_warnings("morphine", Route::Oral).is_empty());
    }

    #[test]
    fn tramadol_ceiling() {
        let warning = max_daily_dose_warning("tramadol", 450.4, Some(400.0)).unwrap();
        assert_eq!(warning.severity, Severity::Danger);
        assert_eq!(warning.message_key, messages::DRUG_TRAMADOL_MAX);
        assert_eq!(warning.params.get("dose"), Some(&ParamValue::Number(450.0)));
        assert_eq!(warning.params.get("max"), Some(&ParamValue::Number(400.0)));
        assert!(max_daily_dose_warning("tramadol", 400.0, Some(400.0)).is_none());
        assert!(max_daily_dose_warning("morphine", 900.0, None).is_none());
    }

    #[test]
    fn minimum_strength() {
        let warning = min_dose_warning("oxycodone", 7.46, Some(10.0)).unwrap();
        assert_eq!(warning.message_key, messages::DRUG_OXYCODONE_MIN_OXYCONTIN);
        assert_eq!(warning.params.get("calculated"), Some(&ParamValue::Number(7.5)));
        let morphine = min_dose_warning("morphine", 5.0, Some(10.0)).unwrap();
        assert_eq!(morphine.message_key, messages::DRUG_MIN_DOSE);
        assert!(min_dose_warning("morphine", 0.0, Some(10.0)).is_none());
        assert!(min_dose_warning("morphine", 10.0, Some(10.0)).is_none());
        assert!(min_dose_warning("codeine", 5.0, None).is_none());
    }

    #[test]
    fn escalation() {
        assert!(escalation_warning(30.0).is_some());
        assert!(escalation_warning(0.0).is_none());
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn renal_floor_is_idempotent(requested in 0.0..100.0f64, gfr in 0.0..120.0f64) {
            let once = effective_reduction(requested, Some(gfr));
            let twice = effective_reduction(once, Some(gfr));
            prop_assert_eq!(once, twice);
            prop_assert!(once >= min_reduction(Some(gfr)));
        }
    }
}
