//! Log output of the emulator binary: a readable console stream plus a
//! JSON request log under `log_dir`.

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "cloudant-server.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
const KEPT_LOG_FILES: usize = 9;
const DEFAULT_FILTER: &str = "cloudant_server=debug,tracing_actix_web=info,actix_web=info";

/// Install the global subscriber. Keep the guard alive until shutdown.
pub fn init_telemetry(log_dir: &str) -> Result<WorkerGuard> {
    let log_dir = Path::new(log_dir);
    std::fs::create_dir_all(log_dir)?;

    let appender = RollingFileAppender::new(
        log_dir.join(LOG_FILE),
        RollingConditionBasic::new().daily().max_size(MAX_LOG_BYTES),
        KEPT_LOG_FILES,
    )?;
    let (request_log, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(request_log))
        .with(fmt::layer().with_target(false))
        .try_init()?;

    tracing::debug!(log_dir = %log_dir.display(), "Request log opened");
    Ok(guard)
}
