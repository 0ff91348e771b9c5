//! Structural-selector extraction.
//!
//! Strips non-content elements, then walks a list of common article
//! container selectors and returns the first container with enough text.
//! Falls back to the concatenated paragraph text of the whole page.

use super::{Candidate, PageContext, Strategy};
use crate::error::ExtractError;
use crate::html::{inside, is_non_content, paragraph_text, text_excluding};
use crate::models::StrategyKind;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Content containers, most specific first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    r#"[role="main"]"#,
    ".article-content",
    ".post-content",
    ".entry-content",
    ".content-body",
    ".story-body",
    ".article-body",
    "main",
    ".content",
    "#content",
];

#[derive(Debug, Clone)]
pub struct StructuralSelectorStrategy {
    selectors: Vec<Selector>,
    min_chars: usize,
}

impl StructuralSelectorStrategy {
    pub fn new(min_chars: usize) -> Self {
        let selectors = CONTENT_SELECTORS
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .collect();
        Self {
            selectors,
            min_chars,
        }
    }

    /// Run the selector walk over an already downloaded document.
    pub fn extract_from_html(&self, html: &str) -> Option<Candidate> {
        let document = Html::parse_document(html);

        for selector in &self.selectors {
            for element in document.select(selector) {
                if inside(&element, is_non_content) {
                    continue;
                }
                let text = text_excluding(element, &is_non_content);
                if let Some(candidate) = Candidate::accept(text, self.min_chars) {
                    return Some(candidate);
                }
            }
        }

        debug!("No content selector matched; trying paragraphs");
        Candidate::accept(paragraph_text(&document), self.min_chars)
    }
}

#[async_trait]
impl Strategy for StructuralSelectorStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuralSelector
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url()))]
    async fn attempt(&self, page: &mut PageContext<'_>) -> Result<Option<Candidate>, ExtractError> {
        let html = page.html().await?;
        Ok(self.extract_from_html(html))
    }
}
