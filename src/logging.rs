//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to the console and, when
//! the log directory is writable, to a JSON log file per process.

use crate::config::ConfigManager;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `level` replaces the environment's default level; `RUST_LOG` still wins
/// over both. Safe to call more than once; only the first call installs a
/// subscriber, and an already-installed global subscriber is left alone.
pub fn init_structured_logging(level: Option<&str>) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let log_level = level
            .map(str::to_string)
            .unwrap_or_else(|| get_log_level(&environment));

        let log_dir = PathBuf::from("log");
        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        let file_writer = match fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::never(&log_dir, &log_filename);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                // Guard lives for the rest of the process so buffered lines are flushed
                std::mem::forget(guard);
                Some(writer)
            }
            Err(_) => None,
        };
        let has_file_output = file_writer.is_some();

        let file_layer = file_writer.map(|writer| {
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(env_filter(&log_level))
        });

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(env_filter(&log_level)),
            )
            .with(file_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = %log_dir.join(&log_filename).display(),
            file_output = has_file_output,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// RUST_LOG wins over the environment default
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for a page fetch
pub fn log_page_operation(
    run_id: Uuid,
    page: u32,
    status: &str,
    records: Option<usize>,
    has_more: Option<bool>,
    duration_ms: Option<u64>,
) {
    tracing::info!(
        run_id = %run_id,
        page = page,
        status = %status,
        records = records,
        has_more = has_more,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "📄 PAGE_OPERATION"
    );
}

/// Log structured data for a record dispatch
pub fn log_dispatch_operation(
    run_id: Uuid,
    record_id: Uuid,
    target_action_id: Uuid,
    status: &str,
    details: Option<&str>,
) {
    tracing::debug!(
        run_id = %run_id,
        record_id = %record_id,
        target_action_id = %target_action_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🚀 DISPATCH_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn initialization_is_idempotent() {
        init_structured_logging(Some("warn"));
        init_structured_logging(None);
        assert!(LOGGER_INITIALIZED.get().is_some());
    }

    #[test]
    fn helpers_do_not_require_a_subscriber() {
        let run_id = Uuid::new_v4();
        log_page_operation(run_id, 1, "fetched", Some(3), Some(false), Some(12));
        log_dispatch_operation(run_id, Uuid::new_v4(), Uuid::new_v4(), "dispatched", None);
        log_error("dispatcher", "fetch", "boom", Some("page 1"));
    }
}
