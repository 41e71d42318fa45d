//! Shared library for the anime browser workspace.
//!
//! This crate provides common functionality used by the browser crate:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{ApiConfig, BrowserConfig, Config};
pub use logging::LogConfig;
