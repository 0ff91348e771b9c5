//! Feed-driven collection of full articles.
//!
//! For each configured outlet the runner lists its newest entries and hands
//! every link to the [`ContentExtractor`]. When extraction is exhausted, or
//! the entry has no link at all, the feed summary is used instead, so an
//! outlet never loses an entry because its page could not be read.
//!
//! | Outlet | Listing | Index |
//! |--------|---------|-------|
//! | TechCrunch | `https://techcrunch.com/feed/` | RSS |
//! | Engadget | `https://www.engadget.com/rss.xml` | RSS |
//! | Gizmodo | `https://gizmodo.com/rss` | RSS |
//! | The Information | `https://www.theinformation.com/` | rendered homepage ([`rendered`]) |
//!
//! Articles from one outlet are processed one after another with a random
//! politeness delay between requests.

pub mod rendered;
pub mod rss;

use crate::cleaner;
use crate::config::{ExtractorConfig, FeedIndex, FeedSource};
use crate::error::ExtractError;
use crate::extractor::ContentExtractor;
use crate::fetcher::{HttpFetcher, parse_http_url};
use crate::models::{ExtractionRequest, FeedArticle, FeedEntry, StrategyKind};
use crate::strategies::BrowserLauncher;
use crate::utils::{politeness_delay, truncate_for_log};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, warn};

/// Download and parse one outlet's RSS feed, newest `limit` entries.
///
/// Repeated links are dropped; entries without a link are all kept.
#[instrument(level = "info", skip_all, fields(source = %source.label, feed = %source.url))]
pub async fn index_feed(
    fetcher: &HttpFetcher,
    source: &FeedSource,
    limit: usize,
) -> Result<Vec<FeedEntry>, ExtractError> {
    let url = parse_http_url(&source.url)?;
    let xml = fetcher.fetch(&url).await?;
    let mut seen = HashSet::new();
    let entries: Vec<FeedEntry> = self::rss::parse_feed(&xml)?
        .into_iter()
        .filter(|entry| entry.link.is_empty() || seen.insert(entry.link.clone()))
        .take(limit)
        .collect();

    info!(count = entries.len(), "Indexed feed entries");
    Ok(entries)
}

/// List one outlet's entries the way its [`FeedIndex`] says.
pub async fn index_source(
    fetcher: &HttpFetcher,
    launcher: &dyn BrowserLauncher,
    config: &ExtractorConfig,
    source: &FeedSource,
) -> Result<Vec<FeedEntry>, ExtractError> {
    let limit = config.max_items_per_feed;
    match &source.index {
        FeedIndex::Rss => index_feed(fetcher, source, limit).await,
        FeedIndex::Rendered {
            link_selector,
            min_title_chars,
        } => {
            let page_url = parse_http_url(&source.url)?;
            rendered::index_rendered_links(
                launcher,
                &config.browser,
                &page_url,
                link_selector,
                *min_title_chars,
                limit,
            )
            .await
        }
    }
}

/// Extract one entry, falling back to its summary.
#[instrument(level = "info", skip_all, fields(link = %entry.link))]
pub async fn collect_entry(
    extractor: &ContentExtractor,
    label: &str,
    entry: FeedEntry,
) -> FeedArticle {
    if entry.link.is_empty() {
        debug!(title = %entry.title, "Entry has no link; using feed summary");
        return into_article(label, entry.summary.clone(), None, entry);
    }

    let result = extractor
        .run(&ExtractionRequest::new(entry.link.clone(), label))
        .await;

    let (content, extracted_by) = match result.text {
        Some(text) => (cleaner::clean(&text, label), result.strategy_used),
        None => {
            warn!(
                summary = %truncate_for_log(&entry.summary, 80),
                "Extraction exhausted; using feed summary"
            );
            (entry.summary.clone(), None)
        }
    };
    into_article(label, content, extracted_by, entry)
}

fn into_article(
    label: &str,
    content: String,
    extracted_by: Option<StrategyKind>,
    entry: FeedEntry,
) -> FeedArticle {
    FeedArticle {
        source: label.to_string(),
        published_at: entry.published_at(),
        title: entry.title,
        link: entry.link,
        summary: entry.summary,
        published: entry.published,
        guid: entry.guid,
        categories: entry.categories,
        content,
        extracted_by,
    }
}

/// Collect every entry of one outlet, sequentially and politely.
#[instrument(level = "info", skip_all, fields(source = %source.label))]
pub async fn collect_source(
    extractor: &ContentExtractor,
    fetcher: &HttpFetcher,
    launcher: &dyn BrowserLauncher,
    config: &ExtractorConfig,
    source: &FeedSource,
) -> Vec<FeedArticle> {
    let entries = match index_source(fetcher, launcher, config, source).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, "Feed could not be indexed");
            return Vec::new();
        }
    };

    let total = entries.len();
    let articles: Vec<FeedArticle> = stream::iter(entries.into_iter().enumerate())
        .then(|(i, entry)| async move {
            if i > 0 {
                politeness_delay(config.politeness_delay_ms).await;
            }
            collect_entry(extractor, &source.label, entry).await
        })
        .collect()
        .await;

    let extracted = articles.iter().filter(|a| a.extracted_by.is_some()).count();
    info!(total, extracted, summaries = total - extracted, "Collected feed articles");
    articles
}

/// Collect all configured outlets, optionally only the one labelled `only`.
///
/// `launcher` is only used by outlets indexed through a rendered page.
pub async fn collect_all(
    extractor: &ContentExtractor,
    launcher: &dyn BrowserLauncher,
    config: &ExtractorConfig,
    only: Option<&str>,
) -> Result<Vec<FeedArticle>, ExtractError> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let sources: Vec<&FeedSource> = config
        .feeds
        .iter()
        .filter(|s| only.is_none_or(|label| s.label == label))
        .collect();
    if sources.is_empty() {
        return Err(ExtractError::Config(match only {
            Some(label) => format!("no feed configured for source {label:?}"),
            None => "no feeds configured".to_string(),
        }));
    }

    let mut all = Vec::new();
    for source in sources {
        all.extend(collect_source(extractor, &fetcher, launcher, config, source).await);
    }
    Ok(all)
}
