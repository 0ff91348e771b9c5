//! Data models for extraction requests, results and feed articles.
//!
//! This module defines the transient values that flow through one extraction:
//! - [`ExtractionRequest`]: the URL and source label handed to the extractor
//! - [`ExtractionResult`]: the winning text (before cleaning) and its strategy
//! - [`StrategyKind`]: the name of each extraction strategy
//! - [`FeedEntry`] / [`FeedArticle`]: feed items and their extracted content
//!
//! None of these outlive the call that created them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// One article to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// The article URL as received from the feed or caller.
    pub url: String,
    /// Outlet label (e.g. `"TechCrunch"`) used to select cleaning rules.
    pub source_label: String,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>, source_label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_label: source_label.into(),
        }
    }
}

/// Outcome of running the strategy chain for one request.
///
/// `text` is `None` when every strategy failed. When present it is the raw,
/// uncleaned text and is longer than the threshold of `strategy_used`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: Option<String>,
    pub strategy_used: Option<StrategyKind>,
}

impl ExtractionResult {
    /// The terminal "nothing worked" result.
    pub fn exhausted() -> Self {
        Self::default()
    }

    pub fn is_exhausted(&self) -> bool {
        self.text.is_none()
    }
}

/// Names of the extraction strategies, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    SiteOptimized,
    StructuralSelector,
    ArticleMetadata,
    Readability,
    BrowserAutomation,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::SiteOptimized => "site-optimized",
            StrategyKind::StructuralSelector => "structural-selector",
            StrategyKind::ArticleMetadata => "article-metadata",
            StrategyKind::Readability => "readability",
            StrategyKind::BrowserAutomation => "browser-automation",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item listed by a news feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    /// Article URL; empty when the feed item carried none.
    pub link: String,
    /// Feed-provided description, used as the substitute text when
    /// extraction is exhausted.
    pub summary: String,
    /// Raw publication date as it appeared in the feed.
    pub published: Option<String>,
    pub guid: Option<String>,
    pub categories: Vec<String>,
}

impl FeedEntry {
    /// Parse `published` as an RFC 2822 date (the RSS format).
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.published
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc2822(raw.trim()).ok())
    }
}

/// A feed entry together with the content obtained for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedArticle {
    pub source: String,
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<String>,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub guid: Option<String>,
    pub categories: Vec<String>,
    /// Cleaned article text, or the summary when extraction was exhausted.
    pub content: String,
    /// Strategy that produced `content`; `None` means the summary was used.
    pub extracted_by: Option<StrategyKind>,
}

/// Whether `url`'s host is `domain` or one of its sub-domains.
///
/// Matching ignores case and a leading `www.` has no special meaning:
/// `www.techcrunch.com` matches `techcrunch.com` because it is a sub-domain.
pub fn host_matches(url: &Url, domain: &str) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    host == domain || host.ends_with(&format!(".{}", domain))
}
