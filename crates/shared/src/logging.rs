//! Logging infrastructure for the anime browser.
//!
//! This module provides structured logging with optional file rotation and
//! module-specific log levels.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "anime_browser".to_string(),
            default_level: Level::INFO,
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build a logging configuration from the `[logging]` config section
    ///
    /// Unknown level names fall back to `info`.
    pub fn from_settings(
        settings: &crate::config::LoggingConfig,
        log_dir: &Path,
        component: &str,
    ) -> Self {
        Self {
            log_dir: log_dir.to_string_lossy().to_string(),
            component: component.to_string(),
            default_level: parse_level(&settings.default_level),
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
        }
    }
}

/// Parse a level name, defaulting to INFO
pub fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}

/// Build the default filter directives for a component
fn default_directives(config: &LogConfig) -> String {
    // Crate targets use underscores even when the package name has dashes
    let target = config.component.replace('-', "_");
    format!(
        "{}={},shared={},hyper=warn,reqwest=warn,h2=warn",
        target, config.default_level, config.default_level
    )
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Console output on stderr, keeping stdout for rendered results
/// - Optional daily file rotation
/// - Module-specific log levels, overridable via RUST_LOG
/// - Optional JSON formatting for file logs
pub fn init(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config)));

    let mut layers = Vec::new();

    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed();
        layers.push(console_layer);
    }

    if config.file {
        let log_dir = Path::new(&config.log_dir);
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        log_dir = %config.log_dir,
        file = config.file,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;

    #[test]
    fn test_logging_config() {
        let config = LogConfig::default();
        assert_eq!(config.component, "anime_browser");
        assert_eq!(config.default_level, Level::INFO);
        assert!(config.console);
        assert!(!config.file);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingConfig {
            default_level: "trace".to_string(),
            file: true,
            json_format: true,
            ..Default::default()
        };

        let config = LogConfig::from_settings(&settings, Path::new("/tmp/logs"), "anime-browser");
        assert_eq!(config.default_level, Level::TRACE);
        assert_eq!(config.log_dir, "/tmp/logs");
        assert!(config.file);
        assert!(config.json_format);
        assert!(default_directives(&config).starts_with("anime_browser=TRACE"));
    }
}
