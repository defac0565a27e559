//! # Structured Logging Module
//!
//! Environment-aware structured logging on `tracing-subscriber`. The filter
//! comes from `RUST_LOG` when set, otherwise from the configured level or the
//! environment's default.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
pub fn init_structured_logging(environment: &str, config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = config
                .level
                .clone()
                .unwrap_or_else(|| default_log_level(environment).to_string());
            EnvFilter::new(level)
        });

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(environment != "production")
                .boxed()
        };

        // Don't panic if a global subscriber already exists (e.g. test harness)
        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            json = config.json,
            "Structured logging initialized"
        );
    });
}

/// Log level based on environment
fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}
