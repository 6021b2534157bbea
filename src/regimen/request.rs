use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{OpioidInput, TargetParams, TargetResult};
use crate::reference::ReferenceData;

use super::{RegimenError, RegimenPipeline};

/// A complete conversion job as exchanged with non-Rust callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub regimen: Vec<OpioidInput>,
    pub target: TargetParams,
    /// Overrides the clinical constants for this request only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EngineConfig>,
}

impl ConversionRequest {
    pub fn execute(&self, reference: &ReferenceData) -> Result<TargetResult, RegimenError> {
        RegimenPipeline::new(reference)
            .with_config(self.config.clone().unwrap_or_default())
            .compute(&self.regimen, &self.target)
    }
}
