//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and, optionally, to a
//! JSON log file for later correlation of requests and progress events.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::constants::ProgressStatus;

static LOGGER_INITIALIZED: OnceLock<Option<WorkerGuard>> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging(environment: &str, config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let log_level = config
            .level
            .clone()
            .unwrap_or_else(|| default_log_level(environment).to_string());

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(build_filter(&log_level));

        let mut guard = None;
        let mut log_path = None;
        let file_layer = if config.json_file {
            let log_dir = PathBuf::from(&config.log_dir);
            match fs::create_dir_all(&log_dir) {
                Ok(()) => {
                    let file_name = format!(
                        "{}.{}.{}.log",
                        environment,
                        process::id(),
                        Utc::now().format("%Y%m%d_%H%M%S")
                    );
                    log_path = Some(log_dir.join(&file_name));
                    let appender = tracing_appender::rolling::never(&log_dir, file_name);
                    let (writer, worker_guard) = tracing_appender::non_blocking(appender);
                    guard = Some(worker_guard);
                    Some(
                        fmt::layer()
                            .with_writer(writer)
                            .with_target(true)
                            .with_ansi(false)
                            .json()
                            .with_filter(build_filter(&log_level)),
                    )
                }
                Err(e) => {
                    eprintln!("Failed to create log directory {}: {e}", log_dir.display());
                    None
                }
            }
        } else {
            None
        };

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            level = %log_level,
            log_file = ?log_path.as_ref().map(|p| p.display().to_string()),
            "Structured logging initialized"
        );

        guard
    });
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Log level used when neither configuration nor `RUST_LOG` set one
pub fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for a learner progress change
pub fn log_progress_operation(
    user_id: i64,
    node_id: i64,
    status: ProgressStatus,
    xp_awarded: i64,
    new_badges: &[String],
) {
    tracing::info!(
        operation = "progress_update",
        user_id = user_id,
        node_id = node_id,
        status = %status,
        xp_awarded = xp_awarded,
        new_badges = ?new_badges,
        "PROGRESS_OPERATION"
    );
}

/// Log structured data for roadmap administration
pub fn log_admin_operation(operation: &str, node_id: Option<i64>, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        node_id = node_id,
        details = details,
        "ADMIN_OPERATION"
    );
}
