//! Tracing subscriber setup.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides the
/// requested level
pub const LOG_ENV: &str = "SHOPPROBE_LOG";

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Build the filter: `SHOPPROBE_LOG` wins, otherwise `shopprobe={level}`.
#[must_use]
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("shopprobe={level},shopprobe_cli={level}")))
}

/// Install a global stderr subscriber.
///
/// Returns `false` when a subscriber was already installed, which happens
/// when several tests or embedders initialise logging.
pub fn init_tracing(level: &str, format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        let _ = init_tracing("debug", LogFormat::Pretty);
        assert!(!init_tracing("info", LogFormat::Json));
    }

    #[test]
    fn test_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
