//! Readability-style extraction.
//!
//! Scores the document with the `readability` crate's port of Mozilla's
//! algorithm, then strips the tags from the simplified fragment it returns.

use super::{Candidate, PageContext, Strategy};
use crate::error::ExtractError;
use crate::html::fragment_text;
use crate::models::StrategyKind;
use async_trait::async_trait;
use std::io::Cursor;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Clone)]
pub struct ReadabilityStrategy {
    min_chars: usize,
}

impl ReadabilityStrategy {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    pub fn extract_from_html(&self, html: &str, url: &Url) -> Result<Option<Candidate>, ExtractError> {
        let mut cursor = Cursor::new(html.as_bytes());
        let product = ::readability::extractor::extract(&mut cursor, url)
            .map_err(|e| ExtractError::Parse(format!("readability: {e}")))?;

        debug!(title = %product.title, "Readability scored document");
        let text = fragment_text(&product.content);
        Ok(Candidate::accept(text, self.min_chars))
    }
}

#[async_trait]
impl Strategy for ReadabilityStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Readability
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url()))]
    async fn attempt(&self, page: &mut PageContext<'_>) -> Result<Option<Candidate>, ExtractError> {
        let url = page.url().clone();
        let html = page.html().await?;
        self.extract_from_html(html, &url)
    }
}
