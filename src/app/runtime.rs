use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use actix_web::{App, HttpServer, web};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::adapters::bigquery::BigQueryClient;
use crate::adapters::opendata::{OpenDataClient, ParkingSource};
use crate::adapters::sqlite_sink::SqliteWarehouse;
use crate::adapters::trigger::{JobRunner, TriggerState, configure_routes};
use crate::adapters::warehouse::{TableRef, Warehouse, WarehouseError};
use crate::app::config::{AppConfig, WarehouseBackend};
use crate::app::error::AppError;
use crate::app::loader::{LoadOutcome, load};
use crate::domain::transform::{Clock, transform};

static LAST_CAPTURE_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Wall clock that never goes backwards within the process.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let previous = LAST_CAPTURE_MICROS.fetch_max(now, Ordering::SeqCst);
        let micros = previous.max(now);
        DateTime::<Utc>::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
    }
}

/// Fetch, transform and load once.
///
/// Fetch and transform failures are returned; load failures come back as a
/// `LoadOutcome` after being printed to `out`.
pub fn execute<S, C, W, F>(
    source: &S,
    clock: &C,
    connect: F,
    destination: &TableRef,
    out: &mut dyn Write,
) -> Result<LoadOutcome, AppError>
where
    S: ParkingSource,
    C: Clock,
    W: Warehouse,
    F: FnOnce() -> Result<W, WarehouseError>,
{
    let payload = source.fetch()?;
    let records = transform(&payload, clock)?;
    tracing::info!(records = records.len(), "records transformed");

    let outcome = load(connect, destination, &records);
    if let Err(error) = outcome.report(out) {
        tracing::warn!(error = %error, "failed to write load report");
    }

    Ok(outcome)
}

#[derive(Debug, Clone)]
pub struct ConfiguredJob {
    config: AppConfig,
}

impl ConfiguredJob {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn run_with_output(&self, out: &mut dyn Write) -> Result<LoadOutcome, AppError> {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!("invocation", %invocation_id);
        let _entered = span.enter();

        let source = OpenDataClient::new(&self.config.source_url)?;
        let destination = TableRef::records(&self.config.project_id, &self.config.dataset_id);

        match self.config.backend {
            WarehouseBackend::BigQuery => execute(
                &source,
                &SystemClock,
                || BigQueryClient::connect(&self.config.credentials_path),
                &destination,
                out,
            ),
            WarehouseBackend::Sqlite => execute(
                &source,
                &SystemClock,
                || SqliteWarehouse::open(&self.config.sqlite_path),
                &destination,
                out,
            ),
        }
    }
}

impl JobRunner for ConfiguredJob {
    fn run_once(&self) -> Result<LoadOutcome, AppError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }
}

/// Standalone entry point. The trigger payload and context are accepted
/// for signature parity with the push endpoint and otherwise ignored.
pub fn run_job(config: AppConfig, event: &str, context: &str) -> Result<(), AppError> {
    tracing::debug!(event, context, "standalone invocation");
    ConfiguredJob::new(config).run_once().map(|_| ())
}

pub fn run_trigger(config: AppConfig) -> Result<(), AppError> {
    let http_bind = config.http_bind.clone();
    let state = TriggerState {
        runner: Arc::new(ConfiguredJob::new(config)),
    };

    tracing::info!(bind = %http_bind, "trigger endpoint starting");

    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(state.clone()))
                    .configure(configure_routes)
            })
            .bind(&http_bind)?
            .run()
            .await
        })
        .map_err(AppError::runtime)
}
