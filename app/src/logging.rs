//! Environment-driven logging setup.
//!
//! - `VB_LOG_LEVEL`: `EnvFilter` directives, default `info`
//! - `VB_LOG_FORMAT`: `compact` (default) or `json`
//!
//! Logs go to stderr; stdout is reserved for command output.

use anyhow::Result;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGING_CONFIG: OnceLock<LoggingConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let format = match std::env::var("VB_LOG_FORMAT").as_deref().unwrap_or("compact") {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };
        let level = std::env::var("VB_LOG_LEVEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());
        Self { format, level }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber. Fails if called twice.
pub fn init_logging() -> Result<()> {
    let config = LoggingConfig::from_env();
    LOGGING_CONFIG
        .set(config.clone())
        .map_err(|_| anyhow::anyhow!("logging already initialized"))?;

    let filter = config.filter();
    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()?;
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()?;
        }
    }

    tracing::debug!(format = ?config.format, level = %config.level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn config_from_env() {
        std::env::set_var("VB_LOG_FORMAT", "json");
        std::env::set_var("VB_LOG_LEVEL", "vb_engine=debug,warn");

        let config = LoggingConfig::from_env();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "vb_engine=debug,warn");

        std::env::remove_var("VB_LOG_FORMAT");
        std::env::remove_var("VB_LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn config_defaults() {
        std::env::remove_var("VB_LOG_FORMAT");
        std::env::set_var("VB_LOG_LEVEL", "  ");

        let config = LoggingConfig::from_env();
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.level, "info");

        std::env::remove_var("VB_LOG_LEVEL");
    }

    #[test]
    fn bad_directive_falls_back() {
        let config = LoggingConfig {
            format: LogFormat::Compact,
            level: "vb_engine=loud".into(),
        };
        assert_eq!(config.filter().to_string(), "info");
    }
}
