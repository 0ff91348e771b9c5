//! Content-extraction strategies.
//!
//! Each strategy is one self-contained way of turning an article URL into
//! text. They share a single contract, [`Strategy`], and report failure as
//! an error value that the orchestrator logs and swallows.
//!
//! | Strategy | Module | Fetch | Threshold |
//! |----------|--------|-------|-----------|
//! | Site optimized | [`site_optimized`] | own, profile headers | 500 / 300 |
//! | Structural selector | [`structural`] | shared page | 200 |
//! | Article metadata | [`metadata`] | own client | 200 |
//! | Readability | [`readability`] | shared page | 200 |
//! | Browser automation | [`browser`] | headless browser | 200 |

use crate::error::ExtractError;
use crate::fetcher::HttpFetcher;
use crate::html::char_len;
use crate::models::StrategyKind;
use async_trait::async_trait;
use url::Url;

pub mod browser;
pub mod chromium;
pub mod metadata;
pub mod readability;
pub mod site_optimized;
pub mod structural;

pub use browser::{BrowserLauncher, BrowserSession, BrowserStrategy, RenderedLink, start_session};
pub use chromium::ChromiumLauncher;
pub use metadata::ArticleMetadataStrategy;
pub use self::readability::ReadabilityStrategy;
pub use site_optimized::SiteOptimizedStrategy;
pub use structural::StructuralSelectorStrategy;

/// Text a strategy is willing to stand behind, with the threshold it cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub min_chars: usize,
}

impl Candidate {
    /// Build a candidate only if `text` is longer than `min_chars` characters.
    pub fn accept(text: impl Into<String>, min_chars: usize) -> Option<Self> {
        let text = text.into();
        let candidate = Candidate { text, min_chars };
        candidate.clears_threshold().then_some(candidate)
    }

    pub fn chars(&self) -> usize {
        char_len(&self.text)
    }

    pub fn clears_threshold(&self) -> bool {
        !self.text.trim().is_empty() && self.chars() > self.min_chars
    }
}

/// One way of obtaining article text.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether this strategy should be tried for `url` at all.
    fn applies_to(&self, _url: &Url) -> bool {
        true
    }

    /// `Ok(None)` means the strategy ran but found nothing long enough.
    async fn attempt(&self, page: &mut PageContext<'_>) -> Result<Option<Candidate>, ExtractError>;
}

/// Per-call state shared by the strategies of one extraction.
///
/// The page body is downloaded at most once through the shared fetcher, the
/// first time a strategy asks for it. A failed download is remembered too.
pub struct PageContext<'a> {
    url: Url,
    fetcher: &'a HttpFetcher,
    body: Option<Result<String, ExtractError>>,
}

impl<'a> PageContext<'a> {
    pub fn new(url: Url, fetcher: &'a HttpFetcher) -> Self {
        Self {
            url,
            fetcher,
            body: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn fetcher(&self) -> &'a HttpFetcher {
        self.fetcher
    }

    /// The page HTML, downloading it on first use.
    pub async fn html(&mut self) -> Result<&str, ExtractError> {
        if self.body.is_none() {
            let fetched = self.fetcher.fetch(&self.url).await;
            self.body = Some(fetched);
        }
        match &self.body {
            Some(Ok(body)) => Ok(body.as_str()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ExtractError::fetch(self.url.as_str(), "page was not fetched")),
        }
    }

    /// Whether the shared download has already been attempted.
    pub fn has_fetched(&self) -> bool {
        self.body.is_some()
    }
}
