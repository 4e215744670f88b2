//! # Telemetry
//!
//! Installs the `tracing` subscriber for the hosting process.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages everywhere
//! - `RUST_LOG=cartwise=trace` - Trace for cartwise crates only
//! - Unset - the configured filter (default `info,cartwise=debug,sqlx=warn`)

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,cartwise=debug,sqlx=warn";

/// Initializes the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter`; an unparseable `default_filter`
/// falls back to [`DEFAULT_LOG_FILTER`].
///
/// ## Returns
/// `false` if a global subscriber was already installed (the call is then a
/// no-op, so tests and embedding hosts may call it freely).
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let _ = init_tracing(DEFAULT_LOG_FILTER);
        assert!(!init_tracing("debug"));
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
