//! # Logging Bootstrap
//!
//! Library code only emits `tracing` events. The binary calls
//! [`init_logging`] once to pick where they go.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Installs the global subscriber.
///
/// The filter comes from `config.level`, falling back to `info` when the
/// directive does not parse. Returns `false` when a global subscriber was
/// already installed, in which case nothing changes.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = if config.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(level = %config.level, json = config.json, "logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let config = LoggingConfig {
            level: "not a [valid directive".to_owned(),
            json: false,
        };
        // Another test binary thread may have installed one first
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
