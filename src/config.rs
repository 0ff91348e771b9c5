//! Runtime configuration for the extractor and the feed runner.
//!
//! Everything has a built-in default so the binary runs without a config
//! file. A YAML file passed with `--config` may override any subset:
//!
//! ```yaml
//! http:
//!   timeout_secs: 20
//! browser:
//!   allowed_domains: [theinformation.com]
//!   primary:
//!     executable: /opt/chromium/chrome
//! feeds:
//!   - label: TechCrunch
//!     url: https://techcrunch.com/feed/
//!   - label: The Information
//!     url: https://www.theinformation.com/
//!     index:
//!       type: rendered
//!       link_selector: "a[href*='/articles/']"
//! ```

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Desktop Chrome user agent sent by the shared fetcher.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Complete extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractorConfig {
    pub http: HttpSettings,
    /// Acceptance threshold (characters) for the general strategies.
    pub min_content_chars: usize,
    pub site_profiles: Vec<SiteProfile>,
    pub browser: BrowserSettings,
    pub feeds: Vec<FeedSource>,
    pub max_items_per_feed: usize,
    pub politeness_delay_ms: DelayRange,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            min_content_chars: 200,
            site_profiles: vec![SiteProfile::techcrunch()],
            browser: BrowserSettings::default(),
            feeds: vec![
                FeedSource::new("TechCrunch", "https://techcrunch.com/feed/"),
                FeedSource::new("Engadget", "https://www.engadget.com/rss.xml"),
                FeedSource::new("Gizmodo", "https://gizmodo.com/rss"),
                FeedSource::rendered(
                    "The Information",
                    "https://www.theinformation.com/",
                    "a[href*='/articles/']",
                ),
            ],
            max_items_per_feed: 20,
            politeness_delay_ms: DelayRange {
                min: 1000,
                max: 2000,
            },
        }
    }
}

impl ExtractorConfig {
    /// Load a YAML config file; missing fields fall back to defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&raw)?;
        info!(
            profiles = config.site_profiles.len(),
            feeds = config.feeds.len(),
            "Loaded extractor configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ExtractError> {
        let config: ExtractorConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ExtractError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ExtractError> {
        if self.http.timeout_secs == 0 {
            return Err(ExtractError::Config("http.timeout_secs must be positive".into()));
        }
        if self.politeness_delay_ms.min > self.politeness_delay_ms.max {
            return Err(ExtractError::Config(
                "politeness_delay_ms.min must not exceed politeness_delay_ms.max".into(),
            ));
        }
        for feed in &self.feeds {
            let empty_selector = matches!(
                &feed.index,
                FeedIndex::Rendered { link_selector, .. } if link_selector.trim().is_empty()
            );
            if empty_selector {
                return Err(ExtractError::Config(format!(
                    "feed {} has an empty link_selector",
                    feed.label
                )));
            }
        }
        for profile in &self.site_profiles {
            if profile.domain.trim().is_empty() {
                return Err(ExtractError::Config("site profile with empty domain".into()));
            }
            if profile.selectors.is_empty() {
                return Err(ExtractError::Config(format!(
                    "site profile {} has no selectors",
                    profile.domain
                )));
            }
        }
        Ok(())
    }
}

/// Settings of the shared HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Headers sent with every request besides `User-Agent`.
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        let headers = [
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Accept-Encoding", "gzip, deflate, br"),
            ("DNT", "1"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Cache-Control", "max-age=0"),
            ("Pragma", "no-cache"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            headers,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Extraction tuned for one heavily protected domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteProfile {
    /// Host (and sub-domains) this profile applies to.
    pub domain: String,
    /// Request headers replacing the shared defaults of the same name.
    pub headers: BTreeMap<String, String>,
    /// Content selectors, most specific first.
    pub selectors: Vec<String>,
    /// Class-name fragments marking noise `div`/`p` inside a match.
    pub noise_terms: Vec<String>,
    pub min_chars: usize,
    pub paragraph_min_chars: usize,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            domain: String::new(),
            headers: BTreeMap::new(),
            selectors: Vec::new(),
            noise_terms: ["ad", "newsletter", "related", "sidebar", "share", "social"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_chars: 500,
            paragraph_min_chars: 300,
        }
    }
}

impl SiteProfile {
    pub fn techcrunch() -> Self {
        let headers = [
            (
                "User-Agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            ),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Accept-Encoding", "gzip, deflate"),
            ("Referer", "https://techcrunch.com/"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let selectors = [
            "div.article-content",
            "div.entry-content",
            r#"div[data-module="ArticleBody"]"#,
            "div.post-content",
            "article div.content",
            "main article",
            ".wp-block-post-content",
            r#"div[class*="article"]"#,
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            domain: "techcrunch.com".to_string(),
            headers,
            selectors,
            ..Default::default()
        }
    }
}

/// Headless-browser settings for the last-resort strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserSettings {
    /// Hosts for which a browser render is attempted.
    pub allowed_domains: Vec<String>,
    pub wait_timeout_secs: u64,
    /// Element whose presence marks the page as rendered.
    pub wait_selector: String,
    pub primary: BrowserTarget,
    pub fallback: BrowserTarget,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            allowed_domains: vec!["theinformation.com".to_string()],
            wait_timeout_secs: 30,
            wait_selector: "article".to_string(),
            primary: BrowserTarget::new("/usr/bin/chromium"),
            fallback: BrowserTarget::new("/usr/bin/google-chrome"),
        }
    }
}

impl BrowserSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// A browser executable and the extra flags to launch it with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserTarget {
    pub executable: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl BrowserTarget {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
        }
    }
}

/// A listing of one outlet's articles and the label of that outlet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedSource {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub index: FeedIndex,
}

impl FeedSource {
    /// An RSS feed.
    pub fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
            index: FeedIndex::Rss,
        }
    }

    /// A page whose article links only exist after scripts run.
    pub fn rendered(label: &str, url: &str, link_selector: &str) -> Self {
        Self {
            index: FeedIndex::Rendered {
                link_selector: link_selector.to_string(),
                min_title_chars: default_min_title_chars(),
            },
            ..Self::new(label, url)
        }
    }
}

/// How the articles of a [`FeedSource`] are listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FeedIndex {
    /// `url` is an RSS document.
    #[default]
    Rss,
    /// `url` is rendered in the headless browser and anchors matching
    /// `link_selector` become entries. Anchors with shorter text than
    /// `min_title_chars` are navigation, not headlines.
    Rendered {
        link_selector: String,
        #[serde(default = "default_min_title_chars")]
        min_title_chars: usize,
    },
}

fn default_min_title_chars() -> usize {
    10
}

/// Inclusive millisecond range for the randomised delay between articles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.min_content_chars, 200);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
        assert!(config.http.headers.contains_key("DNT"));
        assert_eq!(config.site_profiles.len(), 1);
        assert_eq!(config.site_profiles[0].domain, "techcrunch.com");
        assert_eq!(config.site_profiles[0].min_chars, 500);
        assert_eq!(config.site_profiles[0].paragraph_min_chars, 300);
        assert_eq!(config.browser.allowed_domains, vec!["theinformation.com"]);
        assert_eq!(config.browser.wait_timeout(), Duration::from_secs(30));
        assert!(config.site_profiles[0].noise_terms.iter().any(|t| t == "sidebar"));
        assert!(matches!(
            config.feeds.last().map(|f| &f.index),
            Some(FeedIndex::Rendered { .. })
        ));
    }

    #[test]
    fn test_techcrunch_profile_has_referer() {
        let profile = SiteProfile::techcrunch();
        assert_eq!(
            profile.headers.get("Referer").map(String::as_str),
            Some("https://techcrunch.com/")
        );
        assert_eq!(profile.selectors[0], "div.article-content");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
http:
  timeout_secs: 10
browser:
  primary:
    executable: /opt/chromium/chrome
    args: ["--lang=en-US"]
"#;
        let config = ExtractorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(
            config.browser.primary.executable,
            PathBuf::from("/opt/chromium/chrome")
        );
        assert_eq!(config.browser.primary.args, vec!["--lang=en-US"]);
        assert_eq!(
            config.browser.fallback.executable,
            PathBuf::from("/usr/bin/google-chrome")
        );
        assert_eq!(config.feeds.len(), 4);
        assert_eq!(config.feeds[0].index, FeedIndex::Rss);
    }

    #[test]
    fn test_rendered_feed_from_yaml() {
        let yaml = r#"
feeds:
  - label: The Information
    url: https://www.theinformation.com/
    index:
      type: rendered
      link_selector: "a[href*='/articles/']"
  - label: TechCrunch
    url: https://techcrunch.com/feed/
"#;
        let config = ExtractorConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.feeds[0].index,
            FeedIndex::Rendered {
                link_selector: "a[href*='/articles/']".to_string(),
                min_title_chars: 10,
            }
        );
        assert_eq!(config.feeds[1].index, FeedIndex::Rss);
        assert_eq!(
            config.feeds[0],
            FeedSource::rendered(
                "The Information",
                "https://www.theinformation.com/",
                "a[href*='/articles/']"
            )
        );
    }

    #[test]
    fn test_rendered_feed_needs_link_selector() {
        let yaml = "feeds:\n  - label: X\n    url: https://x.com/\n    index:\n      type: rendered\n      link_selector: \"\"\n";
        let err = ExtractorConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("link_selector"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = ExtractorConfig::from_yaml("http:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));

        let err = ExtractorConfig::from_yaml(
            "politeness_delay_ms:\n  min: 3000\n  max: 1000\n",
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn test_profile_without_selectors_is_rejected() {
        let yaml = "site_profiles:\n  - domain: example.com\n";
        let err = ExtractorConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("example.com"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ExtractorConfig::load("/nonexistent/dir/config.yaml").unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }
}
