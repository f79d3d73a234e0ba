//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so streamed replies on stdout stay clean.
//!
//! Environment variables:
//! - `CELINE_LOG`: filter directive (`debug`, `celine_chat=trace`, ...)
//! - `RUST_LOG`: used when `CELINE_LOG` is unset or invalid
//!
//! With neither set, only warnings and errors are shown.

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CELINE_LOG";

const DEFAULT_FILTER: &str = "warn";

static INIT: OnceCell<()> = OnceCell::new();

fn resolve_env_filter() -> EnvFilter {
    if let Ok(directive) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Later calls do nothing.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let console_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr);
        let _ = tracing_subscriber::registry()
            .with(resolve_env_filter())
            .with(console_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_celine_log_takes_precedence() {
        std::env::set_var(LOG_ENV, "debug");
        let filter = resolve_env_filter();
        std::env::remove_var(LOG_ENV);
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    #[serial]
    fn test_invalid_directive_falls_back() {
        std::env::set_var(LOG_ENV, "celine_chat=loud");
        std::env::remove_var("RUST_LOG");
        let filter = resolve_env_filter();
        std::env::remove_var(LOG_ENV);
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging();
        init_logging();
    }
}
