//! Logging setup for the relay binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for a binary.
///
/// The default level applies to this workspace's crates plus the axum
/// request-trace layer; everything can be overridden through the `RUST_LOG`
/// environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "kakehashi-server")
/// * `default_level` - The default log level (e.g., "debug", "info")
pub fn setup_logger(binary_name: &str, default_level: &str) {
    let default_filter = format!(
        "kakehashi_shared={level},kakehashi_server={level},kakehashi_client={level},{bin}={level},tower_http={level}",
        level = default_level,
        bin = binary_name.replace('-', "_"),
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!(
        "Logging initialized for '{}' (default level '{}')",
        binary_name,
        default_level
    );
}
