//! Extraction tuned for a single anti-scraping-protected domain.
//!
//! The strategy sends the profile's own header set (with a `Referer` on the
//! domain's homepage), tries the profile's selectors in order and prunes
//! noise blocks from each match before measuring it. Thresholds are higher
//! than the general ones because these pages carry denser boilerplate.

use super::{Candidate, PageContext, Strategy};
use crate::config::SiteProfile;
use crate::error::ExtractError;
use crate::fetcher::header_map;
use crate::html::{inside, is_non_content, paragraph_text, text_excluding};
use crate::models::{StrategyKind, host_matches};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct SiteOptimizedStrategy {
    profile: SiteProfile,
    headers: HeaderMap,
    selectors: Vec<Selector>,
    noise_terms: Vec<String>,
}

impl SiteOptimizedStrategy {
    pub fn new(profile: SiteProfile) -> Result<Self, ExtractError> {
        let headers = header_map(&profile.headers)?;
        let mut selectors = Vec::with_capacity(profile.selectors.len());
        for raw in &profile.selectors {
            match Selector::parse(raw) {
                Ok(sel) => selectors.push(sel),
                Err(e) => {
                    return Err(ExtractError::Config(format!(
                        "bad selector {raw:?} for {}: {e}",
                        profile.domain
                    )));
                }
            }
        }
        let noise_terms = profile
            .noise_terms
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        Ok(Self {
            profile,
            headers,
            selectors,
            noise_terms,
        })
    }

    pub fn domain(&self) -> &str {
        &self.profile.domain
    }

    /// `div`/`p` elements whose class mentions a noise term.
    fn is_noise(&self, element: &ElementRef<'_>) -> bool {
        let el = element.value();
        if !matches!(el.name(), "div" | "p") {
            return false;
        }
        el.classes().any(|class| {
            let class = class.to_lowercase();
            self.noise_terms.iter().any(|term| class.contains(term.as_str()))
        })
    }

    pub fn extract_from_html(&self, html: &str) -> Option<Candidate> {
        let document = Html::parse_document(html);
        let skip = |el: &ElementRef<'_>| is_non_content(el) || self.is_noise(el);

        for selector in &self.selectors {
            for element in document.select(selector) {
                if inside(&element, is_non_content) {
                    continue;
                }
                let text = text_excluding(element, &skip);
                if let Some(candidate) = Candidate::accept(text, self.profile.min_chars) {
                    return Some(candidate);
                }
            }
        }

        debug!(domain = %self.profile.domain, "No profile selector matched; trying paragraphs");
        Candidate::accept(paragraph_text(&document), self.profile.paragraph_min_chars)
    }
}

#[async_trait]
impl Strategy for SiteOptimizedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SiteOptimized
    }

    fn applies_to(&self, url: &Url) -> bool {
        host_matches(url, &self.profile.domain)
    }

    #[instrument(level = "debug", skip_all, fields(url = %page.url(), domain = %self.profile.domain))]
    async fn attempt(&self, page: &mut PageContext<'_>) -> Result<Option<Candidate>, ExtractError> {
        let raw = page
            .fetcher()
            .fetch_raw(page.url(), self.headers.clone())
            .await
            .inspect_err(|e| warn!(error = %e, "Profile fetch failed"))?;
        Ok(self.extract_from_html(&raw.decode_utf8()))
    }
}
