use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DoseUnit, Route};

/// Localised drug name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
    pub hu: String,
    pub en: String,
}

/// A marketed product resolving to a generic drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandEntry {
    pub name: String,
    pub drug: String,
    #[serde(default)]
    pub route_hint: Option<Route>,
    #[serde(default)]
    pub form: Option<String>,
}

/// Everything the engine needs to know about one drug on the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugDefinition {
    pub id: String,
    pub display_name: DisplayName,
    pub routes: Vec<Route>,
    #[serde(default = "default_unit")]
    pub unit: DoseUnit,
    #[serde(default)]
    pub brands: Vec<BrandEntry>,
    /// Long-acting strengths per route (mcg/hr for patches).
    #[serde(default)]
    pub tablet_sizes: BTreeMap<Route, Vec<f64>>,
    /// Immediate-release strengths for breakthrough dosing.
    #[serde(default)]
    pub ir_tablet_sizes: BTreeMap<Route, Vec<f64>>,
    #[serde(default)]
    pub min_dose: BTreeMap<Route, f64>,
    #[serde(default)]
    pub max_daily_dose: Option<f64>,
    #[serde(default)]
    pub is_warning_drug: bool,
    #[serde(default)]
    pub blocked_as_target: bool,
    #[serde(default)]
    pub blocked_as_source: bool,
    /// Drug whose IR tablets are used when this one has none.
    #[serde(default)]
    pub ir_substitute: Option<String>,
}

fn default_unit() -> DoseUnit {
    DoseUnit::Mg
}

/// The drug list of one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formulary {
    pub drugs: Vec<DrugDefinition>,
}

impl Formulary {
    pub fn new(drugs: Vec<DrugDefinition>) -> Self {
        Self { drugs }
    }

    pub fn find_drug(&self, id: &str) -> Option<&DrugDefinition> {
        self.drugs.iter().find(|d| d.id.eq_ignore_ascii_case(id))
    }

    /// Resolve a brand name (case-insensitive, surrounding whitespace ignored).
    pub fn find_by_brand(&self, name: &str) -> Option<(&DrugDefinition, &BrandEntry)> {
        let wanted = name.trim().to_lowercase();
        self.drugs.iter().find_map(|drug| {
            drug.brands
                .iter()
                .find(|b| b.name.to_lowercase() == wanted)
                .map(|brand| (drug, brand))
        })
    }

    pub fn brands(&self) -> impl Iterator<Item = (&DrugDefinition, &BrandEntry)> {
        self.drugs
            .iter()
            .flat_map(|drug| drug.brands.iter().map(move |brand| (drug, brand)))
    }

    pub fn routes(&self, drug: &str) -> &[Route] {
        self.find_drug(drug)
            .map(|d| d.routes.as_slice())
            .unwrap_or(&[])
    }

    /// Long-acting strengths, ascending. Empty when unknown.
    pub fn tablet_sizes(&self, drug: &str, route: Route) -> Vec<f64> {
        self.find_drug(drug)
            .and_then(|d| d.tablet_sizes.get(&route))
            .map(|sizes| ascending(sizes))
            .unwrap_or_default()
    }

    /// Oral IR strengths, ascending, falling back to the drug's IR substitute.
    pub fn ir_tablet_sizes(&self, drug: &str) -> Vec<f64> {
        let Some(definition) = self.find_drug(drug) else {
            return Vec::new();
        };
        match definition.ir_tablet_sizes.get(&Route::Oral) {
            Some(sizes) if !sizes.is_empty() => ascending(sizes),
            _ => definition
                .ir_substitute
                .as_deref()
                .filter(|substitute| !substitute.eq_ignore_ascii_case(&definition.id))
                .map(|substitute| self.ir_tablet_sizes(substitute))
                .unwrap_or_default(),
        }
    }

    /// Drug providing the IR tablets for `drug`'s breakthrough dose.
    pub fn ir_drug<'a>(&'a self, drug: &'a str) -> &'a str {
        match self.find_drug(drug) {
            Some(d) if d.ir_tablet_sizes.get(&Route::Oral).is_some_and(|s| !s.is_empty()) => drug,
            Some(d) => d.ir_substitute.as_deref().unwrap_or(drug),
            None => drug,
        }
    }

    pub fn minimum_dose(&self, drug: &str, route: Route) -> Option<f64> {
        self.find_drug(drug)?.min_dose.get(&route).copied()
    }

    pub fn max_daily_dose(&self, drug: &str) -> Option<f64> {
        self.find_drug(drug)?.max_daily_dose
    }

    pub fn is_warning_drug(&self, drug: &str) -> bool {
        self.find_drug(drug).is_some_and(|d| d.is_warning_drug)
    }

    pub fn is_blocked_as_target(&self, drug: &str) -> bool {
        self.find_drug(drug).is_some_and(|d| d.blocked_as_target)
    }

    pub fn is_blocked_as_source(&self, drug: &str) -> bool {
        self.find_drug(drug).is_some_and(|d| d.blocked_as_source)
    }

    /// Hungarian market, as registered for palliative use.
    pub fn standard() -> Self {
        Self::new(vec![
            DrugBuilder::new("morphine", "Morfin", "Morphine", &[Route::Oral, Route::ScIv])
                .brand("MST Continus", Route::Oral, "retard filmtabletta")
                .brand("Sevredol", Route::Oral, "filmtabletta (IR)")
                .brand("Morphine Kalceks", Route::ScIv, "oldatos injekció")
                .brand("Morphinum Hydrochloricum TEVA", Route::ScIv, "oldatos injekció")
                .tablets(Route::Oral, &[10.0, 30.0, 60.0, 100.0])
                .ir_tablets(&[10.0])
                .min_dose(Route::Oral, 10.0)
                .build(),
            DrugBuilder::new("oxycodone", "Oxikodon", "Oxycodone", &[Route::Oral, Route::ScIv])
                .brand("OxyContin", Route::Oral, "retard filmtabletta")
                .brand("Codoxy", Route::Oral, "retard tabletta")
                .brand("Codoxy Rapid", Route::Oral, "filmtabletta (IR)")
                .brand("Reltebon", Route::Oral, "retard tabletta")
                .brand("Oxycodone Sandoz", Route::Oral, "kemény kapszula (IR)")
                .brand("Oxycodone Vitabalans", Route::Oral, "filmtabletta (IR)")
                .tablets(Route::Oral, &[5.0, 10.0, 20.0, 40.0, 80.0])
                .ir_tablets(&[5.0, 10.0, 20.0])
                .min_dose(Route::Oral, 10.0)
                .build(),
            DrugBuilder::new(
                "oxycodone-naloxone",
                "Oxikodon + Naloxon",
                "Oxycodone + Naloxone",
                &[Route::Oral],
            )
            .brand("Targin", Route::Oral, "retard tabletta")
            .brand("Oxynal", Route::Oral, "retard tabletta")
            .brand("Oxynador", Route::Oral, "retard tabletta")
            .brand("Oxikodon-HCL/Naloxon-HCL Neuraxpharm", Route::Oral, "retard tabletta")
            .tablets(Route::Oral, &[5.0, 10.0, 20.0, 40.0])
            .ir_tablets(&[5.0, 10.0, 20.0])
            .min_dose(Route::Oral, 5.0)
            .ir_substitute("oxycodone")
            .build(),
            DrugBuilder::new(
                "fentanyl",
                "Fentanil",
                "Fentanyl",
                &[Route::Patch, Route::OralMucosal, Route::ScIv],
            )
            .brand("Durogesic", Route::Patch, "transzdermális tapasz")
            .brand("Dolforin", Route::Patch, "transzdermális tapasz")
            .brand("Matrifen", Route::Patch, "transzdermális mátrix tapasz")
            .brand("Fentanyl Sandoz (tapasz)", Route::Patch, "transzdermális mátrix tapasz")
            .brand("Fentanyl-ratiopharm", Route::Patch, "transzdermális tapasz")
            .brand("Effentora", Route::OralMucosal, "buccális tabletta")
            .brand("Abstral", Route::OralMucosal, "szublinguális tabletta")
            .brand("Actiq", Route::OralMucosal, "szopogató tabletta")
            .brand("Fentanyl Kalceks", Route::ScIv, "oldatos injekció")
            .brand("Fentanyl-Richter", Route::ScIv, "oldatos injekció")
            .brand("Fentanyl Sandoz (injectio)", Route::ScIv, "oldatos injekció")
            .tablets(Route::Patch, &[12.0, 25.0, 50.0, 75.0, 100.0])
            .build(),
            DrugBuilder::new(
                "hydromorphone",
                "Hidromorfon",
                "Hydromorphone",
                &[Route::Oral, Route::ScIv],
            )
            .brand("Jurnista", Route::Oral, "retard tabletta (OROS)")
            .brand("Palladone", Route::Oral, "kapszula")
            .tablets(Route::Oral, &[4.0, 8.0, 16.0, 32.0])
            .ir_tablets(&[1.3, 2.6])
            .min_dose(Route::Oral, 4.0)
            .build(),
            DrugBuilder::new("tramadol", "Tramadol", "Tramadol", &[Route::Oral, Route::Iv])
                .brand("Contramal", Route::Oral, "kemény kapszula / retard")
                .brand("Contramal injekció", Route::Iv, "oldatos injekció")
                .brand("Adamon", Route::Oral, "retard kapszula")
                .brand("Ralgen", Route::Oral, "kemény kapszula")
                .brand("Ralgen SR", Route::Oral, "retard tabletta")
                .brand("Tramadol AL", Route::Oral, "kemény kapszula")
                .brand("Tramadol Kalceks", Route::Iv, "oldatos injekció")
                .brand("Tramadol Vitabalans", Route::Oral, "tabletta")
                .brand("Tramadol Zentiva", Route::Oral, "kemény kapszula")
                .brand("Tramadolor", Route::Oral, "kemény kapszula / retard")
                .tablets(Route::Oral, &[100.0, 150.0, 200.0])
                .ir_tablets(&[50.0])
                .max_daily(400.0)
                .build(),
            DrugBuilder::new("dihydrocodeine", "Dihidrokodein", "Dihydrocodeine", &[Route::Oral])
                .brand("DHC Continus", Route::Oral, "retard tabletta")
                .tablets(Route::Oral, &[60.0])
                .build(),
            DrugBuilder::new("codeine", "Kodein", "Codeine", &[Route::Oral])
                .tablets(Route::Oral, &[15.0, 30.0, 60.0])
                .ir_tablets(&[15.0, 30.0])
                .build(),
            DrugBuilder::new("methadone", "Metadon", "Methadone", &[Route::Oral])
                .brand("Metadon EP", Route::Oral, "tabletta")
                .brand("Methasan", Route::Oral, "koncentrátum belsőleges oldathoz")
                .tablets(Route::Oral, &[5.0, 10.0, 20.0, 40.0])
                .warning_drug()
                .build(),
            DrugBuilder::new("nalbuphine", "Nalbufin", "Nalbuphine", &[Route::ScIv])
                .brand("Nalpain", Route::ScIv, "oldatos injekció")
                .warning_drug()
                .blocked_as_target()
                .build(),
            DrugBuilder::new("pethidine", "Petidin", "Pethidine", &[Route::ScIv])
                .brand("Pethidine", Route::ScIv, "injekció")
                .warning_drug()
                .blocked_as_target()
                .build(),
        ])
    }
}

fn ascending(sizes: &[f64]) -> Vec<f64> {
    let mut sorted = sizes.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

struct DrugBuilder(DrugDefinition);

impl DrugBuilder {
    fn new(id: &str, hu: &str, en: &str, routes: &[Route]) -> Self {
        Self(DrugDefinition {
            id: id.into(),
            display_name: DisplayName { hu: hu.into(), en: en.into() },
            routes: routes.to_vec(),
            unit: DoseUnit::Mg,
            brands: Vec::new(),
            tablet_sizes: BTreeMap::new(),
            ir_tablet_sizes: BTreeMap::new(),
            min_dose: BTreeMap::new(),
            max_daily_dose: None,
            is_warning_drug: false,
            blocked_as_target: false,
            blocked_as_source: false,
            ir_substitute: None,
        })
    }

    fn brand(mut self, name: &str, route: Route, form: &str) -> Self {
        let drug = self.0.id.clone();
        self.0.brands.push(BrandEntry {
            name: name.into(),
            drug,
            route_hint: Some(route),
            form: Some(form.into()),
        });
        self
    }

    fn tablets(mut self, route: Route, sizes: &[f64]) -> Self {
        self.0.tablet_sizes.insert(route, sizes.to_vec());
        self
    }

    fn ir_tablets(mut self, sizes: &[f64]) -> Self {
        self.0.ir_tablet_sizes.insert(Route::Oral, sizes.to_vec());
        self
    }

    fn min_dose(mut self, route: Route, mg: f64) -> Self {
        self.0.min_dose.insert(route, mg);
        self
    }

    fn max_daily(mut self, mg: f64) -> Self {
        self.0.max_daily_dose = Some(mg);
        self
    }

    fn ir_substitute(mut self, drug: &str) -> Self {
        self.0.ir_substitute = Some(drug.into());
        self
    }

    fn warning_drug(mut self) -> Self {
        self.0.is_warning_drug = true;
        self
    }

    fn blocked_as_target(mut self) -> Self {
        self.0.blocked_as_target = true;
        self
    }

    fn build(self) -> DrugDefinition {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tablet_sizes_ascending() {
        let formulary = Formulary::standard();
        assert_eq!(
            formulary.tablet_sizes("oxycodone", Route::Oral),
            vec![5.0, 10.0, 20.0, 40.0, 80.0]
        );
        assert_eq!(
            formulary.tablet_sizes("fentanyl", Route::Patch),
            vec![12.0, 25.0, 50.0, 75.0, 100.0]
        );
        assert!(formulary.tablet_sizes("morphine", Route::ScIv).is_empty());
        assert!(formulary.tablet_sizes("unknown", Route::Oral).is_empty());
    }

    #[test]
    fn ir_sizes_with_substitute() {
        let formulary = Formulary::standard();
        assert_eq!(formulary.ir_tablet_sizes("hydromorphone"), vec![1.3, 2.6]);
        assert_eq!(formulary.ir_tablet_sizes("oxycodone-naloxone"), vec![5.0, 10.0, 20.0]);
        assert!(formulary.ir_tablet_sizes("fentanyl").is_empty());
        assert!(formulary.ir_tablet_sizes("dihydrocodeine").is_empty());
    }

    #[test]
    fn substitute_used_when_own_ir_missing() {
        let mut formulary = Formulary::standard();
        let targin = formulary
            .drugs
            .iter_mut()
            .find(|d| d.id == "oxycodone-naloxone")
            .unwrap();
        targin.ir_tablet_sizes.clear();
        assert_eq!(formulary.ir_tablet_sizes("oxycodone-naloxone"), vec![5.0, 10.0, 20.0]);
        assert_eq!(formulary.ir_drug("oxycodone-naloxone"), "oxycodone");
        assert_eq!(formulary.ir_drug("morphine"), "morphine");
    }

    #[test]
    fn self_referencing_substitute_terminates() {
        let mut formulary = Formulary::standard();
        let dhc = formulary.drugs.iter_mut().find(|d| d.id == "dihydrocodeine").unwrap();
        dhc.ir_substitute = Some("dihydrocodeine".into());
        assert!(formulary.ir_tablet_sizes("dihydrocodeine").is_empty());
    }

    #[test]
    fn minimum_and_maximum() {
        let formulary = Formulary::standard();
        assert_eq!(formulary.minimum_dose("oxycodone", Route::Oral), Some(10.0));
        assert_eq!(formulary.minimum_dose("hydromorphone", Route::Oral), Some(4.0));
        assert_eq!(formulary.minimum_dose("codeine", Route::Oral), None);
        assert_eq!(formulary.max_daily_dose("tramadol"), Some(400.0));
        assert_eq!(formulary.max_daily_dose("morphine"), None);
    }

    #[test]
    fn blocked_and_warning_flags() {
        let formulary = Formulary::standard();
        assert!(formulary.is_blocked_as_target("pethidine"));
        assert!(formulary.is_blocked_as_target("nalbuphine"));
        assert!(!formulary.is_blocked_as_target("methadone"));
        assert!(formulary.is_warning_drug("methadone"));
        assert!(!formulary.is_blocked_as_source("pethidine"));
    }

    #[test]
    fn brand_lookup() {
        let formulary = Formulary::standard();
        let (drug, brand) = formulary.find_by_brand("  oxycontin ").unwrap();
        assert_eq!(drug.id, "oxycodone");
        assert_eq!(brand.route_hint, Some(Route::Oral));
        let (drug, _) = formulary.find_by_brand("MATRIFEN").unwrap();
        assert_eq!(drug.id, "fentanyl");
        assert!(formulary.find_by_brand("Aspirin").is_none());
    }

    #[test]
    fn routes_per_drug() {
        let formulary = Formulary::standard();
        assert_eq!(
            formulary.routes("fentanyl"),
            &[Route::Patch, Route::OralMucosal, Route::ScIv]
        );
        assert!(formulary.routes("unknown").is_empty());
    }

    #[test]
    fn every_brand_points_at_its_drug() {
        let formulary = Formulary::standard();
        assert!(formulary.brands().count() > 30);
        for (drug, brand) in formulary.brands() {
            assert_eq!(drug.id, brand.drug);
        }
    }

    #[test]
    fn route_keyed_maps_round_trip_through_json() {
        let formulary = Formulary::standard();
        let json = serde_json::to_string(&formulary).unwrap();
        assert!(json.contains("\"sc/iv\""));
        let back: Formulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, formulary);
    }
}
