//! Log output for the installer.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to the
//! hoist crates and everything else (axum, hyper) stays at `warn`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Crates whose logs follow the configured level.
const HOIST_TARGETS: [&str; 2] = ["hoist_core", "hoist_daemon"];

/// Filter directives for the hoist crates at `level`.
pub fn default_filter(level: &str) -> String {
    HOIST_TARGETS
        .iter()
        .fold(String::from("warn"), |acc, target| format!("{acc},{target}={level}"))
}

/// Install the global subscriber. With `log_json` every line is a JSON object
/// carrying the session and prompt ids as fields.
pub fn init_tracing(level: &str, log_json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));
    let output = if log_json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };
    tracing_subscriber::registry().with(filter).with(output).init();
}
