//! Page renderer capability
//!
//! The crawl engine loads pages and queries their DOM through the
//! [`PageRenderer`] trait so the rendering backend can be swapped: the
//! [`StaticRenderer`] parses server HTML without running scripts, and the
//! `chrome` feature adds a headless Chromium backend.
//!
//! Attribute values are reported the way a browser DOM reports the `href` and
//! `src` properties: resolved to absolute URLs against the loaded page.

use crate::config::CrawlConfig;
use crate::crawler::transport::build_http_client;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a page renderer
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Failed to launch page renderer: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("DOM query for <{tag}> failed: {message}")]
    Query { tag: String, message: String },

    #[error("No page is loaded")]
    NoPage,

    #[error("Failed to close page renderer: {0}")]
    Close(String),
}

/// Result of asking the renderer to load a URL
#[derive(Debug)]
pub enum NavigationOutcome {
    /// The page loaded and its DOM can be queried
    Loaded,

    /// The page did not finish loading within the timeout
    TimedOut,

    /// The renderer could not load the page
    Failed(RendererError),
}

/// The link-bearing attributes of one DOM element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    pub href: Option<String>,
    pub src: Option<String>,
}

impl ElementAttributes {
    /// Creates attributes with only `href` set
    pub fn with_href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            src: None,
        }
    }

    /// Creates attributes with only `src` set
    pub fn with_src(src: impl Into<String>) -> Self {
        Self {
            href: None,
            src: Some(src.into()),
        }
    }
}

/// Loads pages and exposes their DOM for link discovery
#[async_trait]
pub trait PageRenderer: Send {
    /// Loads `url`, giving up after `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> NavigationOutcome;

    /// Returns the attributes of every `tag` element on the loaded page
    async fn query_elements(&mut self, tag: &str)
        -> Result<Vec<ElementAttributes>, RendererError>;

    /// Releases the renderer's resources
    async fn close(&mut self) -> Result<(), RendererError>;
}

/// A fetched page held by the static renderer
///
/// The body is parsed once on load; element attributes are kept grouped by
/// lowercase tag name.
#[derive(Debug, Default)]
struct LoadedPage {
    elements: HashMap<String, Vec<ElementAttributes>>,
}

impl LoadedPage {
    fn parse(url: &Url, body: &str) -> Self {
        let document = Html::parse_document(body);
        let mut elements: HashMap<String, Vec<ElementAttributes>> = HashMap::new();

        for element in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
        {
            let value = element.value();
            elements
                .entry(value.name().to_ascii_lowercase())
                .or_default()
                .push(ElementAttributes {
                    href: resolve_attribute(url, value.attr("href")),
                    src: resolve_attribute(url, value.attr("src")),
                });
        }

        Self { elements }
    }
}

/// Returns false only when the server declares a non-HTML content type
fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |value| value.to_ascii_lowercase().contains("html"))
}

/// Renderer that fetches HTML over HTTP and parses it with `scraper`
///
/// Scripts are not executed, so links injected by JavaScript are not seen.
pub struct StaticRenderer {
    client: Client,
    current: Option<LoadedPage>,
}

impl StaticRenderer {
    /// Creates a renderer sharing an existing HTTP session
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current: None,
        }
    }

    /// Creates a renderer with its own HTTP session built from `config`
    pub fn launch(config: &CrawlConfig) -> Result<Self, RendererError> {
        let client = build_http_client(config).map_err(|e| RendererError::Launch(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> NavigationOutcome {
        self.current = None;

        let client = &self.client;
        let load = async {
            let response = client.get(url).send().await?;
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());

            // Images, scripts and stylesheets carry no links; skip the body.
            if !is_html_content_type(content_type) {
                return Ok::<_, reqwest::Error>(None);
            }

            let final_url = response.url().clone();
            let body = response.text().await?;
            Ok(Some((final_url, body)))
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(Some((final_url, body)))) => {
                self.current = Some(LoadedPage::parse(&final_url, &body));
                NavigationOutcome::Loaded
            }
            Ok(Ok(None)) => {
                tracing::debug!("{} is not HTML, no links to extract", url);
                self.current = Some(LoadedPage::default());
                NavigationOutcome::Loaded
            }
            Ok(Err(e)) if e.is_timeout() => NavigationOutcome::TimedOut,
            Ok(Err(e)) => NavigationOutcome::Failed(RendererError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => NavigationOutcome::TimedOut,
        }
    }

    async fn query_elements(
        &mut self,
        tag: &str,
    ) -> Result<Vec<ElementAttributes>, RendererError> {
        let page = self.current.as_ref().ok_or(RendererError::NoPage)?;
        Ok(page
            .elements
            .get(&tag.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), RendererError> {
        self.current = None;
        Ok(())
    }
}

/// Resolves a raw attribute value against the page URL, like a DOM property
pub(crate) fn resolve_attribute(base: &Url, value: Option<&str>) -> Option<String> {
    let value = value?;
    base.join(value.trim()).ok().map(String::from)
}
