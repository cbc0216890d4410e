use crate::extract::ExtractionMode;
use serde::Deserialize;

/// Browser-identifying user agent sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Request timeout applied to each page fetch
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Number of pages fetched at the same time within one batch
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Main configuration structure for Sumi-Gather
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Network behaviour of the fetch workers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Value of the `User-Agent` header
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Upper bound on in-flight fetches per batch
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Extraction defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Mode used when the caller does not pick one
    #[serde(rename = "default-mode")]
    pub default_mode: ExtractionMode,
}

/// PDF export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Embed the TrueType fonts below instead of the built-in Helvetica family
    #[serde(rename = "use-embedded-font")]
    pub use_embedded_font: bool,

    /// Regular-weight TrueType font file
    #[serde(rename = "font-path")]
    pub font_path: String,

    /// Bold-weight TrueType font file
    #[serde(rename = "bold-font-path")]
    pub bold_font_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            use_embedded_font: false,
            font_path: "DejaVuSans.ttf".to_string(),
            bold_font_path: "DejaVuSans-Bold.ttf".to_string(),
        }
    }
}
