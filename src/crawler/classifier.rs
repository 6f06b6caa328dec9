//! Status classification
//!
//! Resolves a URL to an HTTP status code. The classifier never fails: it
//! always produces a code so the crawl loop has a uniform decision input.
//!
//! # Fallback Chain
//!
//! | Step | Action | Result |
//! |------|--------|--------|
//! | 1 | HEAD, redirects followed | status of the response |
//! | 2 | GET if HEAD had no response | status of the response |
//! | 3 | GET had no response either | code guessed from the error text |
//!
//! A non-2xx answer to HEAD is a valid result and stops the chain; only
//! transport failures move on to the next step.

use crate::crawler::transport::{Transport, TransportError};
use std::time::Duration;

/// Status reported when a transport failure matches no known code
pub const GENERIC_FAILURE_STATUS: u16 = 500;

/// Ordered substring checks applied to lowercased transport error text
///
/// First match wins. Fragile: relies on the error text mentioning a code.
const ERROR_TEXT_STATUSES: &[(&str, u16)] = &[("404", 404), ("403", 403), ("401", 401)];

/// Returns true for client-error statuses (400-499), the only ones reported
pub fn is_client_error(status: u16) -> bool {
    (400..500).contains(&status)
}

/// Returns true for statuses whose page should be rendered and expanded
pub fn is_expandable(status: u16) -> bool {
    status < 400
}

/// Guesses a status code from the description of a transport failure
///
/// # Examples
///
/// ```
/// use crawl4xx::crawler::status_from_error_text;
///
/// assert_eq!(status_from_error_text("Server said 403 Forbidden"), 403);
/// assert_eq!(status_from_error_text("connection refused"), 500);
/// ```
pub fn status_from_error_text(description: &str) -> u16 {
    let lowered = description.to_lowercase();
    ERROR_TEXT_STATUSES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, status)| *status)
        .unwrap_or(GENERIC_FAILURE_STATUS)
}

/// Classifies URLs by HTTP status using a [`Transport`]
pub struct StatusClassifier<T> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> StatusClassifier<T> {
    /// Creates a classifier applying `timeout` to each request
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Returns the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves `url` to a status code
    pub async fn classify(&self, url: &str) -> u16 {
        match self.transport.head(url, self.timeout).await {
            Ok(status) => return status,
            Err(e) => {
                tracing::debug!("HEAD failed for {}: {}; retrying with GET", url, e);
            }
        }

        match self.transport.get(url, self.timeout).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Failed to check {}: {}", url, e);
                classify_failure(&e)
            }
        }
    }
}

fn classify_failure(error: &TransportError) -> u16 {
    status_from_error_text(&error.to_string())
}
