//! RSS feed parsing.
//!
//! Converts a feed document into [`FeedEntry`] values. Descriptions are
//! reduced to plain text so they can stand in for the article body. Items
//! without a link are kept with an empty `link`; the runner publishes their
//! summary without attempting extraction.

use crate::error::ExtractError;
use crate::html::fragment_text;
use crate::models::FeedEntry;
use rss::Channel;
use tracing::{debug, instrument};

/// Parse an RSS document into entries, in feed order.
#[instrument(level = "debug", skip_all)]
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, ExtractError> {
    let channel = Channel::read_from(xml.as_bytes())
        .map_err(|e| ExtractError::Parse(format!("rss: {e}")))?;

    let entries: Vec<FeedEntry> = channel
        .items()
        .iter()
        .map(|item| FeedEntry {
            title: item.title().unwrap_or_default().trim().to_string(),
            link: item.link().unwrap_or_default().trim().to_string(),
            summary: item.description().map(fragment_text).unwrap_or_default(),
            published: item.pub_date().map(str::to_string),
            guid: item.guid().map(|g| g.value().to_string()),
            categories: item
                .categories()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        })
        .collect();

    debug!(channel = %channel.title(), count = entries.len(), "Parsed feed");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>TechCrunch</title>
    <link>https://techcrunch.com</link>
    <description>Startup and Technology News</description>
    <item>
      <title>Startup raises Series B</title>
      <link>https://techcrunch.com/2025/05/06/startup-raises/</link>
      <description><![CDATA[<p>The company <b>raised</b> $40M.</p>]]></description>
      <pubDate>Tue, 06 May 2025 14:30:00 +0000</pubDate>
      <guid isPermaLink="false">https://techcrunch.com/?p=1</guid>
      <category>Startups</category>
      <category>Fundraising</category>
    </item>
    <item>
      <title>No link here</title>
      <description>Orphan</description>
    </item>
    <item>
      <title>  Second story  </title>
      <link>https://techcrunch.com/2025/05/06/second/</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_entries() {
        let entries = parse_feed(FEED).unwrap();
        assert_eq!(entries.len(), 3);

        let first = &entries[0];
        assert_eq!(first.title, "Startup raises Series B");
        assert_eq!(first.summary, "The company raised $40M.");
        assert_eq!(first.categories, vec!["Startups", "Fundraising"]);
        assert_eq!(first.guid.as_deref(), Some("https://techcrunch.com/?p=1"));
        assert!(first.published_at().is_some());

        let orphan = &entries[1];
        assert_eq!(orphan.title, "No link here");
        assert_eq!(orphan.link, "");
        assert_eq!(orphan.summary, "Orphan");

        let second = &entries[2];
        assert_eq!(second.title, "Second story");
        assert_eq!(second.summary, "");
        assert!(second.published.is_none());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(matches!(
            parse_feed("<html><body>not a feed</body></html>"),
            Err(ExtractError::Parse(_))
        ));
    }
}
