//! # Tech News Extract
//!
//! Turns technology-news article URLs into clean article text.
//!
//! Extraction runs an ordered chain of independent strategies and stops at
//! the first one whose text is long enough:
//!
//! 1. **Site optimized**: per-domain selectors and headers (TechCrunch by default)
//! 2. **Structural selector**: common article containers, then paragraphs
//! 3. **Article metadata**: `dom_smoothie` article parsing
//! 4. **Readability**: Mozilla-style content scoring
//! 5. **Browser automation**: headless Chromium for allow-listed hosts
//!
//! The winning text then goes through [`cleaner::clean`], which strips
//! boilerplate with global and per-outlet rules and collapses whitespace.
//!
//! ```no_run
//! # async fn demo() -> Result<(), tech_news_extract::ExtractError> {
//! use tech_news_extract::{ContentExtractor, ExtractorConfig};
//!
//! let extractor = ContentExtractor::new(&ExtractorConfig::default())?;
//! let text = extractor
//!     .extract_full_content("https://techcrunch.com/2025/05/06/story/", "TechCrunch")
//!     .await
//!     .unwrap_or_else(|| "feed summary".to_string());
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod html;
pub mod models;
pub mod scrapers;
pub mod strategies;
pub mod utils;

pub use cleaner::clean;
pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use extractor::ContentExtractor;
pub use models::{ExtractionRequest, ExtractionResult, FeedArticle, StrategyKind};
