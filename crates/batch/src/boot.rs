//! Boot — logging init and configuration load.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::BatchConfig;

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "batch=info,engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load and validate configuration.
///
/// Returns the [`BatchConfig`] on success.
pub fn boot() -> Result<BatchConfig, Box<dyn std::error::Error>> {
    info!("Starting apitrail batch run v0.0.1");

    let config = BatchConfig::load()?;
    config.validate()?;

    info!(
        "Loaded configuration: input={}, columns={}, policy={:?}",
        config.input_path, config.columns, config.policy
    );
    if config.report_path.is_empty() {
        info!("No report path configured; table goes to stdout only");
    } else {
        info!("Report will be written to {}", config.report_path);
    }

    Ok(config)
}
