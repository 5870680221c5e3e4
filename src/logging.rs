//! Tracing subscriber setup driven by [`LoggingConfig`].

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Fails if a subscriber is already installed or the level is not a valid
/// filter directive.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| format!("invalid log level {:?}: {}", config.level, e))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        "compact" => builder.compact().try_init(),
        "json" => builder.json().try_init(),
        other => return Err(format!("unknown log format: {}", other)),
    };
    result.map_err(|e| e.to_string())
}
