//! The extraction orchestrator.
//!
//! [`ContentExtractor`] owns an ordered chain of strategies and runs them one
//! at a time until one produces text above its threshold. Failures inside a
//! strategy are logged and never leave this module; the only visible outcome
//! of a bad page is `None`.

use crate::cleaner;
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::fetcher::{HttpFetcher, parse_http_url};
use crate::models::{ExtractionRequest, ExtractionResult};
use crate::strategies::{
    ArticleMetadataStrategy, BrowserLauncher, BrowserStrategy, ChromiumLauncher, PageContext,
    ReadabilityStrategy, SiteOptimizedStrategy, Strategy, StructuralSelectorStrategy,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct ContentExtractor {
    fetcher: HttpFetcher,
    strategies: Vec<Box<dyn Strategy>>,
}

impl ContentExtractor {
    /// Build the standard chain, launching Chromium for browser renders.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Self::with_launcher(config, Arc::new(ChromiumLauncher::from_http(&config.http)))
    }

    /// Build the standard chain with a caller-supplied browser launcher.
    ///
    /// Order: one site-optimized strategy per profile, then structural
    /// selectors, article metadata, readability and finally the browser.
    pub fn with_launcher(
        config: &ExtractorConfig,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, ExtractError> {
        let fetcher = HttpFetcher::new(&config.http)?;
        let min = config.min_content_chars;

        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
        for profile in &config.site_profiles {
            strategies.push(Box::new(SiteOptimizedStrategy::new(profile.clone())?));
        }
        strategies.push(Box::new(StructuralSelectorStrategy::new(min)));
        strategies.push(Box::new(ArticleMetadataStrategy::new(&config.http, min)?));
        strategies.push(Box::new(ReadabilityStrategy::new(min)));
        strategies.push(Box::new(BrowserStrategy::new(
            launcher,
            config.browser.clone(),
            min,
        )));

        Ok(Self::with_strategies(fetcher, strategies))
    }

    /// Use an arbitrary chain, tried in the given order.
    pub fn with_strategies(fetcher: HttpFetcher, strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            fetcher,
            strategies,
        }
    }

    pub fn strategies(&self) -> impl Iterator<Item = &dyn Strategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    /// Run the chain and return the winning text, uncleaned.
    #[instrument(level = "info", skip_all, fields(url = %request.url, source = %request.source_label))]
    pub async fn run(&self, request: &ExtractionRequest) -> ExtractionResult {
        let url = match parse_http_url(&request.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Rejecting article URL");
                return ExtractionResult::exhausted();
            }
        };

        let mut page = PageContext::new(url, &self.fetcher);
        for strategy in &self.strategies {
            let kind = strategy.kind();
            if !strategy.applies_to(page.url()) {
                continue;
            }

            debug!(strategy = %kind, "Trying strategy");
            match strategy.attempt(&mut page).await {
                Ok(Some(candidate)) if candidate.clears_threshold() => {
                    info!(strategy = %kind, chars = candidate.chars(), "Extracted content");
                    return ExtractionResult {
                        text: Some(candidate.text),
                        strategy_used: Some(kind),
                    };
                }
                Ok(Some(candidate)) => {
                    debug!(strategy = %kind, chars = candidate.chars(), "Result below threshold");
                }
                Ok(None) => debug!(strategy = %kind, "No usable content"),
                Err(e) => debug!(strategy = %kind, error = %e, "Strategy failed"),
            }
        }

        warn!("All extraction strategies failed");
        ExtractionResult::exhausted()
    }

    /// Extract and clean the article at `url`.
    ///
    /// `None` means every strategy failed; callers fall back to whatever
    /// short description they already have.
    pub async fn extract_full_content(&self, url: &str, source_label: &str) -> Option<String> {
        let request = ExtractionRequest::new(url, source_label);
        let text = self.run(&request).await.text?;
        Some(cleaner::clean(&text, source_label))
    }
}
