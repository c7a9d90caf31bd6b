//! # Structured Logging
//!
//! Environment-aware tracing setup. Console output by default; set
//! `STAGER_LOG_FORMAT=json` for machine-readable lines. Filtering follows
//! `RUST_LOG`, defaulting to `info` for this crate.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the global tracing subscriber. Safe to call more than once;
/// a subscriber already installed (by tests, typically) is not an error.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,stager=info"));

        let json = std::env::var("STAGER_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .boxed()
        } else {
            fmt::layer().with_target(true).boxed()
        };

        let _ = tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init();
    });
}
