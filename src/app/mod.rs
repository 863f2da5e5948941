mod config;
mod error;
mod loader;
mod logging;
mod runtime;

pub use config::{AppConfig, WarehouseBackend};
pub use error::AppError;
pub use loader::{FAILURE_MESSAGE, LoadOutcome, SUCCESS_MESSAGE, load};
pub use runtime::{ConfiguredJob, SystemClock, execute};

/// Standalone invocation: `event` and `context` stand in for the trigger
/// arguments and are not used by the pipeline.
pub fn run(event: &str, context: &str) -> Result<(), AppError> {
    logging::init()?;

    let config = AppConfig::from_env()?;
    log_bootstrap(&config);

    runtime::run_job(config, event, context)
}

pub fn run_trigger() -> Result<(), AppError> {
    logging::init()?;

    let config = AppConfig::from_env()?;
    log_bootstrap(&config);

    runtime::run_trigger(config)
}

fn log_bootstrap(config: &AppConfig) {
    tracing::info!(
        source_url = %config.source_url,
        project_id = %config.project_id,
        dataset_id = %config.dataset_id,
        backend = ?config.backend,
        credentials_path = %config.credentials_path.display(),
        http_bind = %config.http_bind,
        "application bootstrap initialized"
    );
}
