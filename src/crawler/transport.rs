//! HTTP transport used by the status classifier
//!
//! The [`Transport`] trait is the seam between the classifier and the network:
//! any HTTP response, whatever its status, is `Ok(status)`. Only failures to
//! obtain a response at all (DNS, refused connection, timeout, redirect loop,
//! broken body) are reported as [`TransportError`].

use crate::config::CrawlConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain an HTTP response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("redirect failed: {0}")]
    Redirect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let message = error.to_string();
        if error.is_timeout() {
            Self::Timeout(message)
        } else if error.is_connect() {
            Self::Connect(message)
        } else if error.is_redirect() {
            Self::Redirect(message)
        } else {
            Self::Other(message)
        }
    }
}

/// Minimal HTTP capability needed to classify a URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a HEAD request, following redirects
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportError>;

    /// Sends a GET request and reads the full body, following redirects
    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError>;
}

/// Builds the HTTP session shared by the transport and the static renderer
///
/// Redirects are followed automatically up to `max-redirects` hops, and a
/// cookie store keeps server-set cookies for the lifetime of the run.
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.status_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps an existing client (usually from [`build_http_client`])
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a transport with a fresh client for `config`
    pub fn from_config(config: &CrawlConfig) -> crate::Result<Self> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Returns the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        let response = self.client.head(url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();

        // A body that cannot be read is a transport failure, same as no response.
        response.bytes().await?;

        Ok(status)
    }
}
