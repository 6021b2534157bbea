pub mod config;
pub mod conversion;
pub mod models;
pub mod reference;
pub mod regimen;
pub mod rounding;
pub mod warnings;

use tracing_subscriber::EnvFilter;

pub use config::EngineConfig;
pub use models::{OpioidInput, TargetParams, TargetResult};
pub use reference::ReferenceData;
pub use regimen::{compute_target_regimen, ConversionRequest, RegimenError, RegimenPipeline};

/// Install the fmt subscriber. Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
