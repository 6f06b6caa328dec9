//! Link extraction from rendered pages
//!
//! # Link Extraction Rules
//!
//! **Collected from:**
//! - `<a href>`
//! - `<img>`, `<script>`, `<link>`, `<iframe>`: `src`, falling back to `href`
//!
//! **Kept only if:**
//! - the value starts with `http` (absolute web URL)
//! - the host equals the crawl's target domain
//!
//! Survivors are normalized and deduplicated, keeping the order in which
//! they first appear (anchors first, then the other tags in the order above).

use crate::crawler::renderer::{ElementAttributes, PageRenderer, RendererError};
use crate::url::{is_http_link, normalize_url, DomainFilter};
use std::collections::HashSet;

/// Tags whose attributes are inspected, in query order
pub const LINK_TAGS: &[&str] = &["a", "img", "script", "link", "iframe"];

/// Extracts the normalized same-domain links of the renderer's current page
///
/// DOM access errors are logged and yield an empty result; they never abort
/// the crawl.
pub async fn extract_links<R>(renderer: &mut R, filter: &DomainFilter) -> Vec<String>
where
    R: PageRenderer + ?Sized,
{
    match collect_links(renderer, filter).await {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Error extracting links: {}", e);
            Vec::new()
        }
    }
}

async fn collect_links<R>(renderer: &mut R, filter: &DomainFilter) -> Result<Vec<String>, RendererError>
where
    R: PageRenderer + ?Sized,
{
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for tag in LINK_TAGS {
        let elements = renderer.query_elements(tag).await?;
        for element in &elements {
            let Some(value) = link_value(tag, element) else {
                continue;
            };

            if !is_http_link(value) || !filter.is_same_domain(value) {
                tracing::trace!("Skipping link {}", value);
                continue;
            }

            let normalized = normalize_url(value);
            if seen.insert(normalized.clone()) {
                links.push(normalized);
            }
        }
    }

    Ok(links)
}

/// Picks the attribute that carries the link for an element of `tag`
fn link_value<'a>(tag: &str, element: &'a ElementAttributes) -> Option<&'a str> {
    let href = element.href.as_deref().filter(|v| !v.is_empty());
    if tag == "a" {
        return href;
    }

    element
        .src
        .as_deref()
        .filter(|v| !v.is_empty())
        .or(href)
}
