//! Text helpers over `scraper` documents.
//!
//! `scraper` trees are immutable, so "removing" an element is expressed as
//! skipping its subtree while collecting text.

use scraper::{ElementRef, Html, Node, Selector};

/// Tags whose subtrees never contribute article text.
pub const NON_CONTENT_TAGS: &[&str] = &[
    "script",
    "style",
    "nav",
    "header",
    "footer",
    "aside",
    "advertisement",
];

/// Number of characters (not bytes) in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn is_non_content(element: &ElementRef<'_>) -> bool {
    NON_CONTENT_TAGS.contains(&element.value().name())
}

/// Whether any ancestor of `element` satisfies `skip`.
pub fn inside<F>(element: &ElementRef<'_>, skip: F) -> bool
where
    F: Fn(&ElementRef<'_>) -> bool,
{
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| skip(&ancestor))
}

/// Collect the trimmed text nodes under `root`, skipping every subtree whose
/// element satisfies `skip`, joined with single spaces.
pub fn text_excluding<F>(root: ElementRef<'_>, skip: &F) -> String
where
    F: Fn(&ElementRef<'_>) -> bool,
{
    let mut parts = Vec::new();
    collect_text(root, skip, &mut parts);
    parts.join(" ")
}

fn collect_text<'a, F>(element: ElementRef<'a>, skip: &F, parts: &mut Vec<&'a str>)
where
    F: Fn(&ElementRef<'_>) -> bool,
{
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !skip(&child_el) {
                        collect_text(child_el, skip, parts);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Text of every `<p>` outside the non-content tags, paragraphs joined by a
/// space. Empty paragraphs are dropped.
pub fn paragraph_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    document
        .select(&selector)
        .filter(|p| !inside(p, is_non_content))
        .map(|p| text_excluding(p, &is_non_content))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip all markup from an HTML fragment and collapse it to plain text.
pub fn fragment_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    text_excluding(parsed.root_element(), &is_non_content)
}
