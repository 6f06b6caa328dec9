//! Crawler module for discovering and checking same-domain URLs
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport and status classification with fallbacks
//! - Page rendering and link extraction
//! - Frontier management and referrer attribution
//! - The crawl engine driving them

mod classifier;
mod engine;
mod extractor;
mod frontier;
mod renderer;
mod transport;

#[cfg(feature = "chrome")]
mod chrome;

pub use classifier::{
    is_client_error, is_expandable, status_from_error_text, StatusClassifier,
    GENERIC_FAILURE_STATUS,
};
pub use engine::Crawler;
pub use extractor::{extract_links, LINK_TAGS};
pub use frontier::{Frontier, SEED_REFERRER, UNKNOWN_REFERRER};
pub use renderer::{
    ElementAttributes, NavigationOutcome, PageRenderer, RendererError, StaticRenderer,
};
pub use transport::{build_http_client, ReqwestTransport, Transport, TransportError};

#[cfg(feature = "chrome")]
pub use chrome::ChromeRenderer;
