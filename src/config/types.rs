use serde::Deserialize;
use std::time::Duration;

/// Default CSV report path
pub const DEFAULT_OUTPUT: &str = "errors_4xx.csv";

/// Desktop browser identification sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Page rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Fetch HTML and parse it without running scripts
    #[default]
    Static,

    /// Headless Chromium (requires the `chrome` feature)
    Chrome,
}

/// Crawl behavior configuration
///
/// Every field has a default, so an empty TOML file is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Path of the CSV error report
    pub output: String,

    /// Maximum BFS depth; accepted but not enforced
    pub depth: Option<u32>,

    /// Fixed delay between processed URLs (milliseconds)
    pub politeness_delay_ms: u64,

    /// Timeout of each status check request (seconds)
    pub status_timeout_secs: u64,

    /// Timeout of each page load in the renderer (seconds)
    pub page_load_timeout_secs: u64,

    /// Persist the error report every this many processed URLs
    pub checkpoint_interval: u64,

    /// Maximum redirect hops followed automatically
    pub max_redirects: usize,

    /// User-Agent header value
    pub user_agent: String,

    /// Page rendering backend
    pub renderer: RendererKind,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            output: DEFAULT_OUTPUT.to_string(),
            depth: None,
            politeness_delay_ms: 1000,
            status_timeout_secs: 10,
            page_load_timeout_secs: 15,
            checkpoint_interval: 10,
            max_redirects: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            renderer: RendererKind::Static,
        }
    }
}

impl CrawlConfig {
    /// Returns the politeness delay as a Duration
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    /// Returns the status check timeout as a Duration
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    /// Returns the page load timeout as a Duration
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}
