use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use crawl4xx::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Delay: {}ms", config.politeness_delay_ms);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<CrawlConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<CrawlConfig> {
    let config: CrawlConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}
