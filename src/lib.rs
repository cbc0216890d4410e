//! Sumi-Gather: a concurrent multi-page content harvester
//!
//! This crate fetches a set of web pages concurrently, extracts one category
//! of content from each page, and aggregates the results in registry order
//! for display or export.

pub mod browser;
pub mod config;
pub mod extract;
pub mod harvest;
pub mod registry;
pub mod report;

use thiserror::Error;

/// Main error type for Sumi-Gather operations
#[derive(Debug, Error)]
pub enum GatherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Export error: {0}")]
    Export(#[from] report::ExportError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Batch task failed: {0}")]
    Batch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors returned synchronously by registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("URL already present: {0}")]
    AlreadyExists(String),
}

/// Result type alias for Sumi-Gather operations
pub type Result<T> = std::result::Result<T, GatherError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{extract_content, ExtractionMode};
pub use harvest::{BatchCoordinator, BatchHandle, BatchReport, ProgressEvent, ProgressPhase};
pub use registry::{FetchState, Outcome, UrlEntry, UrlRegistry};
pub use report::build_report;
