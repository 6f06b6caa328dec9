use crate::config::types::{CrawlConfig, RendererKind};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> ConfigResult<()> {
    validate_timing(config)?;
    validate_output(config)?;
    validate_user_agent(config)?;
    validate_renderer(config.renderer)?;
    Ok(())
}

/// Validates timeouts and checkpoint cadence
fn validate_timing(config: &CrawlConfig) -> ConfigResult<()> {
    if config.status_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "status-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.page_load_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page-load-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.checkpoint_interval == 0 {
        return Err(ConfigError::Validation(
            "checkpoint-interval must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the report path
fn validate_output(config: &CrawlConfig) -> ConfigResult<()> {
    if config.output.trim().is_empty() {
        return Err(ConfigError::Validation("output cannot be empty".to_string()));
    }
    Ok(())
}

/// Validates the User-Agent header value
fn validate_user_agent(config: &CrawlConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user-agent cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates that the selected renderer is compiled in
fn validate_renderer(renderer: RendererKind) -> ConfigResult<()> {
    if renderer == RendererKind::Chrome && !cfg!(feature = "chrome") {
        return Err(ConfigError::Validation(
            "the chrome renderer requires building with the `chrome` feature".to_string(),
        ));
    }
    Ok(())
}

/// Validates the seed URL
///
/// The seed must be absolute, use `http` or `https`, and have a host.
pub fn validate_base_url(base_url: &str) -> ConfigResult<Url> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "only http and https are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("{} has no host", base_url)));
    }

    Ok(url)
}
