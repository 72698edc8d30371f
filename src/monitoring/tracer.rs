/*!
 * Tracing Setup
 * Structured logging for remote calls and device events using the tracing crate
 *
 * Features:
 * - Call IDs for correlating a remote call with its reply
 * - JSON-formatted logs for structured parsing
 * - Human-readable compact output for development
 */

use crate::core::config::HostConfig;
use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing from the environment
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - MCU_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let use_json = std::env::var("MCU_TRACE_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    install(use_json);
}

/// Initialize structured tracing using a loaded configuration
pub fn init_tracing_with(config: &HostConfig) {
    install(config.trace_json);
}

fn install(use_json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    // A subscriber may already be installed (tests, embedding applications)
    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique ID for correlating a remote call
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}
