//! # Tech News Extract
//!
//! Command-line front end for the article extractor.
//!
//! ## Usage
//!
//! ```sh
//! tech_news_extract extract --url https://techcrunch.com/2025/05/06/story/ --source TechCrunch
//! tech_news_extract feeds > articles.json
//! ```
//!
//! `extract` prints the cleaned text of one article. `feeds` walks every
//! configured feed (RSS, or a homepage rendered in the headless browser),
//! extracts each entry (falling back to the feed summary) and prints the
//! collected articles as JSON.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tech_news_extract::strategies::{BrowserLauncher, ChromiumLauncher};
use tech_news_extract::{ContentExtractor, ExtractionRequest, ExtractorConfig, cleaner, scrapers};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs go to stderr so stdout carries only the extracted output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let config = ExtractorConfig::load_or_default(args.config.as_deref())?;
    let launcher: Arc<dyn BrowserLauncher> = Arc::new(ChromiumLauncher::from_http(&config.http));
    let extractor = ContentExtractor::with_launcher(&config, launcher.clone())?;

    match args.command {
        Command::Extract { url, source, json } => {
            let result = extractor.run(&ExtractionRequest::new(url.as_str(), source.as_str())).await;
            match result.text {
                Some(text) => {
                    let content = cleaner::clean(&text, &source);
                    if json {
                        let out = serde_json::json!({
                            "url": url,
                            "source": source,
                            "strategy": result.strategy_used,
                            "content": content,
                        });
                        println!("{}", serde_json::to_string_pretty(&out)?);
                    } else {
                        println!("{content}");
                    }
                }
                None => warn!(%url, "No content could be extracted"),
            }
        }
        Command::Feeds { source } => {
            let articles = scrapers::collect_all(&extractor, launcher.as_ref(), &config, source.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
    }

    let elapsed = start_time.elapsed();
    info!(elapsed_secs = elapsed.as_secs_f64(), "tech_news_extract finished");
    Ok(())
}
