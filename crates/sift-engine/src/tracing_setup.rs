//! Subscriber installation for binaries and tests embedding Sift.

use std::sync::Once;

use sift_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `observability.log_level`.
pub const LOG_ENV: &str = "SIFT_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops, and a subscriber
/// installed by someone else is left in place.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true);
        let _ = if config.json {
            builder
                .json()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .try_init()
        } else {
            builder.try_init()
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        let config = ObservabilityConfig::default();
        init_tracing(&config);
        init_tracing(&ObservabilityConfig {
            json: !config.json,
            ..config
        });
        tracing::info!("tracing initialised twice");
    }
}
