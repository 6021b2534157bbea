use serde::{Deserialize, Serialize};

use super::ConversionError;

/// OME band with its OME:methadone ratio. `ome_high = None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethadoneTier {
    pub ome_low: f64,
    #[serde(default)]
    pub ome_high: Option<f64>,
    pub ratio: f64,
}

impl MethadoneTier {
    pub fn contains(&self, ome: f64) -> bool {
        ome >= self.ome_low && self.ome_high.map_or(true, |high| ome <= high)
    }
}

/// Ripamonti-style dose-banded conversion. One-way: methadone has no
/// linear OME factor, so it never appears as a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MethadoneTier>", into = "Vec<MethadoneTier>")]
pub struct MethadoneTierConverter {
    tiers: Vec<MethadoneTier>,
}

impl MethadoneTierConverter {
    pub fn new(tiers: Vec<MethadoneTier>) -> Result<Self, ConversionError> {
        if tiers.is_empty() {
            return Err(ConversionError::InvalidTable(
                "methadone table needs at least one tier".into(),
            ));
        }
        if tiers.iter().any(|t| !(t.ratio > 0.0)) {
            return Err(ConversionError::InvalidTable(
                "methadone ratios must be positive".into(),
            ));
        }
        if !tiers.windows(2).all(|pair| pair[1].ome_low > pair[0].ome_low) {
            return Err(ConversionError::InvalidTable(
                "methadone tiers must ascend by lower bound".into(),
            ));
        }
        Ok(Self { tiers })
    }

    pub fn standard() -> Self {
        Self {
            tiers: vec![
                MethadoneTier { ome_low: 30.0, ome_high: Some(90.0), ratio: 4.0 },
                MethadoneTier { ome_low: 91.0, ome_high: Some(300.0), ratio: 6.0 },
                MethadoneTier { ome_low: 301.0, ome_high: None, ratio: 8.0 },
            ],
        }
    }

    pub fn tiers(&self) -> &[MethadoneTier] {
        &self.tiers
    }

    /// Ratio for a given OME.
    ///
    /// Values between integer-bounded tiers (e.g. 90.5) take the ratio of the
    /// highest tier whose lower bound they reach.
    pub fn ratio_for(&self, ome: f64) -> f64 {
        if let Some(tier) = self.tiers.iter().find(|t| t.contains(ome)) {
            return tier.ratio;
        }
        self.tiers
            .iter()
            .rev()
            .find(|t| ome >= t.ome_low)
            .unwrap_or(&self.tiers[0])
            .ratio
    }

    /// OME mg/day → methadone mg/day.
    pub fn ome_to_methadone(&self, ome: f64) -> f64 {
        if !(ome > 0.0) {
            return 0.0;
        }
        ome / self.ratio_for(ome)
    }
}

impl TryFrom<Vec<MethadoneTier>> for MethadoneTierConverter {
    type Error = ConversionError;

    fn try_from(tiers: Vec<MethadoneTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<MethadoneTierConverter> for Vec<MethadoneTier> {
    fn from(converter: MethadoneTierConverter) -> Self {
        converter.tiers
    }
}
