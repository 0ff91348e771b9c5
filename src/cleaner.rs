//! Boilerplate stripping and whitespace normalisation for extracted text.
//!
//! Rules live in two static tables: global rules run for every article, and
//! source rules run only when the caller's source label matches a key
//! exactly. Both tables are compiled once on first use.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Global,
    Source(&'static str),
}

#[derive(Debug, Clone)]
pub struct CleaningRule {
    pub pattern: Regex,
    pub scope: RuleScope,
}

impl CleaningRule {
    fn new(pattern: &str, scope: RuleScope) -> Self {
        let pattern = Regex::new(pattern).expect("static cleaning pattern must compile");
        Self { pattern, scope }
    }
}

/// Global patterns, matched case-insensitively and across line breaks.
const GLOBAL_PATTERNS: &[&str] = &[
    r"Subscribe to.*?newsletter",
    r"Follow us on.*?social media",
    r"Share this article",
    r"Read more(?:\s+articles)?:?",
    r"Continue reading",
    r"Sign up for.*?updates",
    r"Get the latest.*?news",
    r"This article originally appeared on.*?\.com",
    r"Image credit:.*",
    r"Photo credit:.*",
    r"Source:.*",
    r"Related:.*",
    r"See also:.*",
    r"Advertisement",
    r"ADVERTISEMENT",
    r"Sponsored content",
    r"\d+ comments?",
    r"Comments? \(\d+\)",
];

/// Per-outlet patterns; each carries its own flags.
const SOURCE_PATTERNS: &[(&str, &[&str])] = &[
    (
        "TechCrunch",
        &[
            r"(?i)We're launching.*?TC Sessions.*?\.(?:\s|$)",
            r"(?i)Image Credits?:.*?(?:\.|$)",
        ],
    ),
    (
        "Engadget",
        &[
            r"(?s)This article originally appeared on Engadget.*",
            r"(?i)Image credit:.*?Engadget",
            r"(?i)If you buy something through a link in this article, we may earn commission.*?\.",
            r"(?i)Our stories may include affiliate links; if you buy something through a link, we may earn a commission.*?\.",
            r"(?i)Why you can trust us Engadget has been testing and reviewing consumer tech since 2004.*?\.",
        ],
    ),
    (
        "Gizmodo",
        &[r"(?i)Image:.*?Gizmodo", r"(?s)Read more:.*"],
    ),
    (
        "The Information",
        &[
            r"(?i)This story is available exclusively to.*",
            r"(?i)Subscribe to.*?The Information.*",
        ],
    ),
];

static GLOBAL_RULES: Lazy<Vec<CleaningRule>> = Lazy::new(|| {
    GLOBAL_PATTERNS
        .iter()
        .map(|p| CleaningRule::new(&format!("(?is){p}"), RuleScope::Global))
        .collect()
});

static SOURCE_RULES: Lazy<HashMap<&'static str, Vec<CleaningRule>>> = Lazy::new(|| {
    SOURCE_PATTERNS
        .iter()
        .map(|(label, patterns)| {
            let rules = patterns
                .iter()
                .map(|p| CleaningRule::new(p, RuleScope::Source(*label)))
                .collect();
            (*label, rules)
        })
        .collect()
});

/// Global rules followed by the rules registered for `source_label`.
pub fn rules_for(source_label: &str) -> impl Iterator<Item = &'static CleaningRule> {
    let scoped = SOURCE_RULES
        .get(source_label)
        .map(|rules| rules.as_slice())
        .unwrap_or_default();
    GLOBAL_RULES.iter().chain(scoped)
}

/// Labels that have their own rule set.
pub fn known_sources() -> Vec<&'static str> {
    let mut labels: Vec<_> = SOURCE_RULES.keys().copied().collect();
    labels.sort_unstable();
    labels
}

/// Strip boilerplate from `text` and collapse its whitespace.
///
/// Passes repeat until one changes nothing, so the result is stable under a
/// second call with the same label. After the first pass the text is already
/// normalised and any further change removes characters, so the loop ends.
pub fn clean(text: &str, source_label: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut current = clean_once(text, source_label);
    loop {
        let next = clean_once(&current, source_label);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str, source_label: &str) -> String {
    let mut text = text.to_string();
    for rule in rules_for(source_label) {
        if rule.pattern.is_match(&text) {
            text = rule.pattern.replace_all(&text, "").into_owned();
        }
    }
    normalize_whitespace(&text)
}

/// Every whitespace run becomes one space; ends are trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(clean("", "TechCrunch"), "");
        assert_eq!(clean(" \n\t ", ""), "");
    }

    #[test]
    fn test_newsletter_prompt_removed() {
        let out = clean(
            "Great article. Subscribe to our newsletter for more updates. Thanks.",
            "",
        );
        assert!(!out.to_lowercase().contains("subscribe to our newsletter"));
        assert!(out.starts_with("Great article."));
    }

    #[test]
    fn test_every_occurrence_removed() {
        let out = clean(
            "One. Share this article Two. share this article Three. ADVERTISEMENT Four.",
            "",
        );
        assert_eq!(out, "One. Two. Three. Four.");
    }

    #[test]
    fn test_global_patterns_span_lines() {
        let out = clean("Body text.\nSubscribe to\nour weekly\nnewsletter now.", "");
        assert_eq!(out, "Body text. now.");
    }

    #[test]
    fn test_comment_counters_removed() {
        assert_eq!(clean("Intro 42 comments outro Comments (7) end", ""), "Intro outro end");
    }

    #[test]
    fn test_techcrunch_credit_removed() {
        let text = "Image Credits: Jane Doe. The rest of the article follows.";
        assert_eq!(clean(text, "TechCrunch"), "The rest of the article follows.");
    }

    #[test]
    fn test_techcrunch_rule_not_applied_to_engadget() {
        let text = "Image Credits: Jane Doe. The rest of the article follows.";
        assert_eq!(clean(text, "Engadget"), text);
    }

    #[test]
    fn test_label_match_is_exact() {
        let text = "Image Credits: Jane Doe. The rest of the article follows.";
        assert_eq!(clean(text, "TechCrunch Daily"), text);
        assert_eq!(clean(text, "techcrunch"), text);
    }

    #[test]
    fn test_engadget_footer_removed() {
        let text = "Review body.\n\nThis article originally appeared on Engadget and is\nrepublished here.\nAbout our ads";
        assert_eq!(clean(text, "Engadget"), "Review body.");
    }

    #[test]
    fn test_engadget_affiliate_disclaimer_removed() {
        let text = "If you buy something through a link in this article, we may earn commission. The phone is fast.";
        assert_eq!(clean(text, "Engadget"), "The phone is fast.");
    }

    #[test]
    fn test_gizmodo_rules() {
        let text = "Image: Apple via Gizmodo The story continues.";
        assert_eq!(clean(text, "Gizmodo"), "The story continues.");
    }

    #[test]
    fn test_the_information_paywall() {
        let text = "Opening paragraph. This story is available exclusively to subscribers.";
        assert_eq!(clean(text, "The Information"), "Opening paragraph.");
    }

    #[test]
    fn test_whitespace_normalised() {
        assert_eq!(clean("  a\n\n\n b\t\tc  ", ""), "a b c");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            ("Great article. Subscribe to our newsletter for more updates. Thanks.", ""),
            ("Lead.\n\nImage Credits: Jane Doe. Body here. 3 comments", "TechCrunch"),
            ("Review.\nImage credit: Someone / Engadget\nMore text. Advertisement", "Engadget"),
            ("Intro Read more articles: Photo credit: x", "Gizmodo"),
            ("Subscribe\nto the feed. Get the\nlatest\nnews today.", "The Information"),
        ];
        for (text, label) in samples {
            let once = clean(text, label);
            assert_eq!(clean(&once, label), once, "label {label:?}");
        }
    }

    #[test]
    fn test_nested_boilerplate_fully_removed() {
        let layers = 6;
        let text = format!(
            "Intro. {}{}End.",
            "Share ".repeat(layers),
            "this article ".repeat(layers)
        );
        let once = clean(&text, "");
        assert_eq!(once, "Intro. End.");
        assert_eq!(clean(&once, ""), once);
    }

    #[test]
    fn test_rules_for_scoping() {
        let global = rules_for("").count();
        assert_eq!(global, GLOBAL_PATTERNS.len());
        assert_eq!(rules_for("TechCrunch").count(), global + 2);
        assert!(
            rules_for("Gizmodo")
                .skip(global)
                .all(|r| r.scope == RuleScope::Source("Gizmodo"))
        );
    }

    #[test]
    fn test_known_sources() {
        assert_eq!(
            known_sources(),
            vec!["Engadget", "Gizmodo", "TechCrunch", "The Information"]
        );
    }
}
