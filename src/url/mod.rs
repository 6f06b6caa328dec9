//! URL handling module
//!
//! This module provides the URL identity rules of the crawler: normalization
//! into dedup keys and the same-domain check applied to discovered links.

mod domain;
mod normalize;

pub use domain::{extract_domain, DomainFilter};
pub use normalize::normalize_url;

/// Returns true if a discovered link value is absolute and web-addressable
///
/// Anything not starting with `http` (relative paths, `mailto:`, `javascript:`,
/// `data:` and friends) is ignored by the link extractor.
pub fn is_http_link(value: &str) -> bool {
    value.starts_with("http")
}
