use serde::{Deserialize, Serialize};

use super::ConversionError;

/// One row of the fentanyl patch equivalence table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FentanylPatchAnchor {
    pub mcg_per_hr: f64,
    pub ome_low: f64,
    pub ome_high: f64,
}

impl FentanylPatchAnchor {
    pub fn midpoint(&self) -> f64 {
        (self.ome_low + self.ome_high) / 2.0
    }
}

/// Piecewise-linear conversion through the anchor midpoints.
///
/// Below the first anchor the line runs from the origin; above the last it
/// extends with the slope of the last two anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FentanylPatchAnchor>", into = "Vec<FentanylPatchAnchor>")]
pub struct FentanylPatchInterpolator {
    anchors: Vec<FentanylPatchAnchor>,
}

impl FentanylPatchInterpolator {
    pub fn new(anchors: Vec<FentanylPatchAnchor>) -> Result<Self, ConversionError> {
        if anchors.len() < 2 {
            return Err(ConversionError::InvalidTable(
                "fentanyl patch table needs at least two anchors".into(),
            ));
        }
        if anchors[0].mcg_per_hr <= 0.0 || anchors[0].midpoint() <= 0.0 {
            return Err(ConversionError::InvalidTable(
                "first fentanyl patch anchor must be positive".into(),
            ));
        }
        let ascending = anchors.windows(2).all(|pair| {
            pair[1].mcg_per_hr > pair[0].mcg_per_hr && pair[1].midpoint() > pair[0].midpoint()
        });
        if !ascending {
            return Err(ConversionError::InvalidTable(
                "fentanyl patch anchors must ascend in mcg/hr and midpoint".into(),
            ));
        }
        Ok(Self { anchors })
    }

    pub fn standard() -> Self {
        let anchor = |mcg_per_hr, ome_low, ome_high| FentanylPatchAnchor {
            mcg_per_hr,
            ome_low,
            ome_high,
        };
        Self {
            anchors: vec![
                anchor(12.0, 30.0, 45.0),
                anchor(25.0, 60.0, 90.0),
                anchor(50.0, 120.0, 150.0),
                anchor(75.0, 180.0, 225.0),
                anchor(100.0, 240.0, 300.0),
            ],
        }
    }

    pub fn anchors(&self) -> &[FentanylPatchAnchor] {
        &self.anchors
    }

    /// Patch strength (mcg/hr) → OME mg/day.
    pub fn mcg_to_ome(&self, mcg_per_hr: f64) -> f64 {
        piecewise(&self.anchors, mcg_per_hr, |a| a.mcg_per_hr, |a| a.midpoint())
    }

    /// OME mg/day → ideal patch strength (mcg/hr).
    pub fn ome_to_mcg(&self, ome: f64) -> f64 {
        piecewise(&self.anchors, ome, |a| a.midpoint(), |a| a.mcg_per_hr)
    }
}

impl TryFrom<Vec<FentanylPatchAnchor>> for FentanylPatchInterpolator {
    type Error = ConversionError;

    fn try_from(anchors: Vec<FentanylPatchAnchor>) -> Result<Self, Self::Error> {
        Self::new(anchors)
    }
}

impl From<FentanylPatchInterpolator> for Vec<FentanylPatchAnchor> {
    fn from(interpolator: FentanylPatchInterpolator) -> Self {
        interpolator.anchors
    }
}

/// Evaluate the polyline through `(key(a), value(a))` at `x`. Anchors are
/// validated ascending in both coordinates, so the same table serves both
/// directions.
fn piecewise<K, V>(anchors: &[FentanylPatchAnchor], x: f64, key: K, value: V) -> f64
where
    K: Fn(&FentanylPatchAnchor) -> f64,
    V: Fn(&FentanylPatchAnchor) -> f64,
{
    if !(x > 0.0) {
        return 0.0;
    }

    if let Some(exact) = anchors.iter().find(|a| key(a) == x) {
        return value(exact);
    }

    let first = &anchors[0];
    if x < key(first) {
        return x / key(first) * value(first);
    }

    let last = &anchors[anchors.len() - 1];
    if x > key(last) {
        let prev = &anchors[anchors.len() - 2];
        let slope = (value(last) - value(prev)) / (key(last) - key(prev));
        return value(last) + slope * (x - key(last));
    }

    for pair in anchors.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if x <= key(hi) {
            let fraction = (x - key(lo)) / (key(hi) - key(lo));
            return value(lo) + fraction * (value(hi) - value(lo));
        }
    }

    value(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_map_to_midpoints() {
        let interp = FentanylPatchInterpolator::standard();
        for (mcg, ome) in [(12.0, 37.5), (25.0, 75.0), (50.0, 135.0), (75.0, 202.5), (100.0, 270.0)] {
            assert_eq!(interp.mcg_to_ome(mcg), ome);
            assert_eq!(interp.ome_to_mcg(ome), mcg);
        }
    }

    #[test]
    fn interpolates_between_anchors() {
        let interp = FentanylPatchInterpolator::standard();
        let ome = interp.mcg_to_ome(37.5);
        assert!((ome - 105.0).abs() < 1e-9);
        let mcg = interp.ome_to_mcg(105.0);
        assert!((mcg - 37.5).abs() < 1e-9);
    }

    #[test]
    fn below_first_anchor_scales_from_origin() {
        let interp = FentanylPatchInterpolator::standard();
        assert!((interp.mcg_to_ome(6.0) - 18.75).abs() < 1e-9);
        assert!((interp.ome_to_mcg(18.75) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn above_last_anchor_extrapolates() {
        let interp = FentanylPatchInterpolator::standard();
        // slope between 75 and 100 mcg/hr is 67.5 / 25 = 2.7 OME per mcg/hr
        assert!((interp.mcg_to_ome(150.0) - 405.0).abs() < 1e-9);
        assert!((interp.ome_to_mcg(405.0) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_and_nan_give_zero() {
        let interp = FentanylPatchInterpolator::standard();
        assert_eq!(interp.mcg_to_ome(0.0), 0.0);
        assert_eq!(interp.ome_to_mcg(-5.0), 0.0);
        assert_eq!(interp.ome_to_mcg(f64::NAN), 0.0);
    }

    #[test]
    fn round_trip_each_anchor() {
        let interp = FentanylPatchInterpolator::standard();
        for anchor in interp.anchors() {
            let back = interp.ome_to_mcg(interp.mcg_to_ome(anchor.mcg_per_hr));
            assert!((back - anchor.mcg_per_hr).abs() < 0.01);
        }
    }

    #[test]
    fn rejects_single_anchor() {
        let one = vec![FentanylPatchInterpolator::standard().anchors()[0]];
        assert!(FentanylPatchInterpolator::new(one).is_err());
    }

    #[test]
    fn rejects_unsorted_anchors() {
        let mut anchors = FentanylPatchInterpolator::standard().anchors().to_vec();
        anchors.swap(1, 2);
        assert!(FentanylPatchInterpolator::new(anchors).is_err());
    }

    #[test]
    fn deserialize_validates() {
        let bad = r#"[{"mcg_per_hr":25,"ome_low":60,"ome_high":90}]"#;
        assert!(serde_json::from_str::<FentanylPatchInterpolator>(bad).is_err());
        let good = serde_json::to_string(&FentanylPatchInterpolator::standard()).unwrap();
        let back: FentanylPatchInterpolator = serde_json::from_str(&good).unwrap();
        assert_eq!(back, FentanylPatchInterpolator::standard());
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn reverse_is_monotone(a in 0.0..1000.0f64, b in 0.0..1000.0f64) {
            let interp = FentanylPatchInterpolator::standard();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(interp.ome_to_mcg(lo) <= interp.ome_to_mcg(hi) + 1e-9);
        }

        #[test]
        fn forward_then_reverse_is_identity(mcg in 1.0..300.0f64) {
            let interp = FentanylPatchInterpolator::standard();
            let back = interp.ome_to_mcg(interp.mcg_to_ome(mcg));
            prop_assert!((back - mcg).abs() < 0.01);
        }
    }
}
