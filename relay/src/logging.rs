//! Structured logging initialisation for the relay.
//!
//! `RUST_LOG` overrides the configured level when set. The format string
//! comes straight from [`crate::RelayConfig::log_format`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// `format` is `"json"` for newline-delimited JSON; anything else selects
/// the human-readable layer.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_logging(format: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
