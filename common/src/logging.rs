//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events; the host (an app shell, a test
//! binary, a demo) calls [`init_tracing`] once to decide where they go.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` when the variable is unset or unparsable.
///
/// Returns `false` if a global subscriber was already installed; repeated
/// initialization is a no-op rather than a panic.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

/// Convenience wrapper for [`init_tracing`] using loaded settings.
pub fn init_from_settings(settings: &LoggingSettings) -> bool {
    init_tracing(&settings.filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let _ = init_tracing("debug");
        assert!(!init_tracing("debug"));
    }
}
