use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the host component from a URL string
///
/// The `url` crate lowercases hosts of `http`/`https` URLs while parsing, so
/// the returned value is already in canonical case. The port is not part of
/// the host.
///
/// # Returns
///
/// * `Some(String)` - The host of the URL
/// * `None` - The string does not parse or has no host
///
/// # Examples
///
/// ```
/// use crawl4xx::url::extract_domain;
///
/// assert_eq!(extract_domain("https://example.com/path"), Some("example.com".to_string()));
/// assert_eq!(extract_domain("https://example.com:8080/"), Some("example.com".to_string()));
/// assert_eq!(extract_domain("not a url"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
}

/// Decides whether URLs belong to the crawl's target domain
///
/// The target domain is captured once, from the seed URL, and compared by
/// exact string equality. Subdomains are different domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFilter {
    domain: String,
}

impl DomainFilter {
    /// Creates a filter for an already-extracted domain
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Creates a filter targeting the host of `base_url`
    ///
    /// # Returns
    ///
    /// * `Ok(DomainFilter)` - Filter for the seed's host
    /// * `Err(UrlError)` - The seed does not parse, has no host, or is not
    ///   `http`/`https`
    pub fn from_base_url(base_url: &str) -> UrlResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let domain = parsed.host_str().ok_or(UrlError::MissingDomain)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
        }
        Ok(Self::new(domain))
    }

    /// Returns the target domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns true if `url` parses and its host equals the target domain
    ///
    /// Malformed or empty input is never on the target domain.
    pub fn is_same_domain(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }
        extract_domain(url).is_some_and(|host| host == self.domain)
    }
}
