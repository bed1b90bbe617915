//! Telemetry and observability setup
//!
//! Configures structured logging with tracing and tracing-subscriber.
//!
//! Log lines go to stderr: stdout belongs to the allocation table and the
//! simulation report (text or JSON), which callers may pipe into other tools.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize tracing subscriber for structured logging
///
/// This can only be called once per process. Subsequent calls are silently ignored.
///
/// Reads log level from RUST_LOG environment variable, defaulting to the
/// level given here (the plan's `observability.log_level`).
///
/// # Examples
///
/// ```no_run
/// asymmetric_balancer::telemetry::init("info");
/// tracing::info!("Simulation started");
/// ```
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("asymmetric_balancer={}", default_level))
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    });
}
