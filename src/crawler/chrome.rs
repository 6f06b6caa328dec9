//! Headless Chromium page renderer
//!
//! Only built with the `chrome` feature. Pages are loaded in a real browser,
//! so links added by scripts are visible to the link extractor.

use crate::crawler::renderer::{
    resolve_attribute, ElementAttributes, NavigationOutcome, PageRenderer, RendererError,
};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Renderer driving one headless Chromium tab
pub struct ChromeRenderer {
    browser: Browser,
    page: Page,
    handler: Option<JoinHandle<()>>,
}

impl ChromeRenderer {
    /// Launches a headless, sandbox-disabled browser with one blank tab
    ///
    /// # Returns
    ///
    /// * `Ok(ChromeRenderer)` - Browser is running
    /// * `Err(RendererError::Launch)` - Chromium could not be started
    pub async fn launch() -> Result<Self, RendererError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(RendererError::Launch)?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| RendererError::Launch(e.to_string()))?;

        // The CDP event stream must be polled for the browser to make progress.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RendererError::Launch(e.to_string()))?;

        tracing::info!("Headless browser launched");

        Ok(Self {
            browser,
            page,
            handler: Some(handler),
        })
    }

    async fn current_url(&self) -> Result<Url, RendererError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| RendererError::Query {
                tag: "document".to_string(),
                message: e.to_string(),
            })?
            .ok_or(RendererError::NoPage)?;

        Url::parse(&url).map_err(|e| RendererError::Query {
            tag: "document".to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> NavigationOutcome {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => NavigationOutcome::Loaded,
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
        let query_error = |message: String| RendererError::Query {
            tag: tag.to_string(),
            message,
        };

        let base = self.current_url().await?;
        let elements = self
            .page
            .find_elements(tag)
            .await
            .map_err(|e| query_error(e.to_string()))?;

        let mut attributes = Vec::with_capacity(elements.len());
        for element in elements {
            let href = element
                .attribute("href")
                .await
                .map_err(|e| query_error(e.to_string()))?;
            let src = element
                .attribute("src")
                .await
                .map_err(|e| query_error(e.to_string()))?;

            attributes.push(ElementAttributes {
                href: resolve_attribute(&base, href.as_deref()),
                src: resolve_attribute(&base, src.as_deref()),
            });
        }

        Ok(attributes)
    }

    async fn close(&mut self) -> Result<(), RendererError> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| RendererError::Close(e.to_string()));

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        tracing::info!("Headless browser closed");
        result
    }
}
