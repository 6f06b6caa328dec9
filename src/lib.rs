//! crawl4xx: a single-domain broken link finder
//!
//! This crate crawls one web domain breadth-first from a seed URL, checks the
//! HTTP status of every same-domain resource it discovers, and reports the
//! URLs that answer with a client error (4xx) together with the page that
//! first linked to them.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only startup and final-persistence failures end up here. Per-URL problems
/// (timeouts, refused connections, broken pages) are absorbed by the crawl
/// loop and never surface as a `CrawlError`.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Page renderer error: {0}")]
    Renderer(#[from] crawler::RendererError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
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

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{Crawler, Frontier, StatusClassifier};
pub use output::{CrawlSummary, ErrorRecord};
pub use state::{InterruptFlag, RunState};
pub use url::{normalize_url, DomainFilter};
