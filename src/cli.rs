//! Command-line interface definitions for the news extractor.
//!
//! This module defines the CLI arguments and subcommands using the `clap` crate.
//! The configuration path can also be provided through an environment variable.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the news extractor.
///
/// # Examples
///
/// ```sh
/// # Extract one article and print the cleaned text
/// tech_news_extract extract --url https://techcrunch.com/2025/05/06/story/ --source TechCrunch
///
/// # Collect every configured feed as JSON
/// tech_news_extract -c ./config.yaml feeds
///
/// # Only one outlet
/// tech_news_extract feeds --source Engadget
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long, env = "TECH_NEWS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Extract and clean a single article
    Extract {
        /// Article URL
        #[arg(short, long)]
        url: String,

        /// Outlet label used to pick cleaning rules (e.g. "TechCrunch")
        #[arg(short, long, default_value = "")]
        source: String,

        /// Print a JSON object with the strategy that won instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Collect full articles from the configured RSS feeds
    Feeds {
        /// Only collect the feed with this label
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_extract() {
        let cli = Cli::parse_from([
            "tech_news_extract",
            "extract",
            "--url",
            "https://techcrunch.com/a",
            "--source",
            "TechCrunch",
        ]);

        assert_eq!(cli.config, None);
        assert_eq!(
            cli.command,
            Command::Extract {
                url: "https://techcrunch.com/a".to_string(),
                source: "TechCrunch".to_string(),
                json: false,
            }
        );
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "tech_news_extract",
            "-c",
            "/tmp/config.yaml",
            "extract",
            "-u",
            "https://example.com/a",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
        match cli.command {
            Command::Extract { source, .. } => assert_eq!(source, ""),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_feeds() {
        let cli = Cli::parse_from(["tech_news_extract", "feeds", "--source", "Engadget"]);
        assert_eq!(
            cli.command,
            Command::Feeds {
                source: Some("Engadget".to_string())
            }
        );
    }
}
