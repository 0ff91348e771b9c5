//! Article discovery on listing pages that are built by scripts.
//!
//! Outlets without a usable feed are indexed by rendering their homepage in
//! the headless browser and reading the anchors that point at articles. The
//! anchor text is the only description available, so it doubles as the
//! entry's summary.

use crate::config::BrowserSettings;
use crate::error::ExtractError;
use crate::models::FeedEntry;
use crate::strategies::{BrowserLauncher, BrowserSession, RenderedLink, start_session};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Render `page_url` and turn anchors matching `link_selector` into entries.
///
/// The browser session is closed exactly once, whether or not the links
/// could be read.
#[instrument(level = "info", skip_all, fields(page = %page_url, selector = link_selector))]
pub async fn index_rendered_links(
    launcher: &dyn BrowserLauncher,
    settings: &BrowserSettings,
    page_url: &Url,
    link_selector: &str,
    min_title_chars: usize,
    limit: usize,
) -> Result<Vec<FeedEntry>, ExtractError> {
    let mut session = start_session(launcher, settings).await?;
    let links = read_links(session.as_mut(), settings, page_url, link_selector).await;

    match session.close().await {
        Ok(()) => debug!("Browser closed"),
        Err(e) => warn!(error = %e, "Browser did not close cleanly"),
    }

    let links = links?;
    let found = links.len();
    let entries = entries_from_links(links, min_title_chars, limit);
    info!(found, count = entries.len(), "Indexed rendered links");
    Ok(entries)
}

async fn read_links(
    session: &mut dyn BrowserSession,
    settings: &BrowserSettings,
    page_url: &Url,
    link_selector: &str,
) -> Result<Vec<RenderedLink>, ExtractError> {
    session.navigate(page_url).await?;
    session
        .wait_for(link_selector, settings.wait_timeout())
        .await?;
    session.links(link_selector).await
}

/// Keep anchors with a real headline, first occurrence of each URL, at most
/// `limit` of them.
pub fn entries_from_links(
    links: Vec<RenderedLink>,
    min_title_chars: usize,
    limit: usize,
) -> Vec<FeedEntry> {
    links
        .into_iter()
        .filter_map(|link| {
            let href = link.href.trim();
            let title = link.text.split_whitespace().join(" ");
            if href.is_empty() || title.chars().count() < min_title_chars {
                return None;
            }
            Some(FeedEntry {
                summary: title.clone(),
                title,
                link: href.to_string(),
                published: None,
                guid: Some(href.to_string()),
                categories: Vec::new(),
            })
        })
        .unique_by(|entry| entry.link.clone())
        .take(limit)
        .collect()
}
