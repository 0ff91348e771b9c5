//! Article-metadata extraction.
//!
//! Uses the `dom_smoothie` article parser, which pulls title, byline and
//! publication time alongside the body. The strategy downloads the page with
//! its own client (same user agent and timeout as the shared fetcher, but no
//! browser header set) so it stays independent of the shared download.

use super::{Candidate, PageContext, Strategy};
use crate::config::HttpSettings;
use crate::error::ExtractError;
use crate::fetcher::HttpFetcher;
use crate::models::StrategyKind;
use async_trait::async_trait;
use dom_smoothie::{Config, Readability};
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Clone)]
pub struct ArticleMetadataStrategy {
    fetcher: HttpFetcher,
    min_chars: usize,
}

impl ArticleMetadataStrategy {
    pub fn new(settings: &HttpSettings, min_chars: usize) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ExtractError::Config(format!("failed to build article client: {e}")))?;
        Ok(Self {
            fetcher: HttpFetcher::with_client(client),
            min_chars,
        })
    }

    pub fn extract_from_html(&self, html: &str, url: &Url) -> Result<Option<Candidate>, ExtractError> {
        let cfg = Config {
            max_elements_to_parse: 9000,
            ..Default::default()
        };
        let mut parser = Readability::new(html, Some(url.as_str()), Some(cfg))
            .map_err(|e| ExtractError::Parse(format!("article parser: {e}")))?;
        let article = parser
            .parse()
            .map_err(|e| ExtractError::Parse(format!("article parser: {e}")))?;

        debug!(
            title = %article.title,
            byline = article.byline.as_deref().unwrap_or(""),
            published = article.published_time.as_deref().unwrap_or(""),
            "Parsed article metadata"
        );

        let text = article.text_content.to_string();
        Ok(Candidate::accept(text.trim(), self.min_chars))
    }
}

#[async_trait]
impl Strategy for ArticleMetadataStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ArticleMetadata
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url()))]
    async fn attempt(&self, page: &mut PageContext<'_>) -> Result<Option<Candidate>, ExtractError> {
        let html = self.fetcher.fetch(page.url()).await?;
        self.extract_from_html(&html, page.url())
    }
}
