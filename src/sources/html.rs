//! HTML helpers shared by the scrape strategy.
//!
//! - [`article_links`]: find article-like blocks on a homepage and pull a
//!   title and an absolute link out of each
//! - [`page_text`]: reduce an article page to its readable text blocks
//!
//! Both are tolerant of broken markup: missing pieces are skipped or replaced
//! with sentinels, never reported as errors.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::NO_TITLE;
use crate::utils::collapse_whitespace;

static ARTICLE_BLOCKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "article, [class*='article'], [class*='story'], [class*='card'], [class*='headline']",
    )
    .expect("article block selector is valid")
});
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("link selector is valid"));
static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("heading selector is valid"));
static TEXT_BLOCKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, h1, h2, h3, h4, li, blockquote").expect("text block selector is valid")
});

/// Elements whose text never counts as article body.
const BOILERPLATE: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form",
];

/// A link found on a site's entry page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub title: String,
    pub url: String,
}

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn inside_boilerplate(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| BOILERPLATE.contains(&a.value().name()))
}

/// Resolve `href` against `base`, keeping only web links.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// Article links found in the article-like blocks of `html`, in page order.
///
/// The title is the block's first heading, falling back to the link text,
/// then to [`NO_TITLE`]. Duplicate urls keep their first occurrence.
pub fn article_links(html: &str, base: &Url) -> Vec<ArticleLink> {
    let document = Html::parse_document(html);
    document
        .select(&ARTICLE_BLOCKS)
        .filter_map(|block| {
            let link = if block.value().name() == "a" && block.value().attr("href").is_some() {
                block
            } else {
                block.select(&LINK).next()?
            };
            let url = resolve_link(base, link.value().attr("href")?)?;

            let title = block
                .select(&HEADING)
                .map(|h| element_text(&h))
                .find(|t| !t.is_empty())
                .or_else(|| Some(element_text(&link)).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| NO_TITLE.to_string());

            Some(ArticleLink { title, url })
        })
        .unique_by(|link| link.url.clone())
        .collect()
}

/// Readable text of an article page.
///
/// Text blocks inside navigation, headers, footers, scripts, and styles are
/// ignored; blocks of `min_len` characters or fewer are dropped. The rest are
/// joined with newlines. Returns an empty string when nothing survives.
pub fn page_text(html: &str, min_len: usize) -> String {
    let document = Html::parse_document(html);
    document
        .select(&TEXT_BLOCKS)
        .filter(|block| !inside_boilerplate(block))
        .map(|block| element_text(&block))
        .filter(|text| text.chars().count() > min_len)
        .dedup()
        .join("\n")
}
