use std::sync::LazyLock;

use regex::Regex;

use crate::parse::{Element, text_length};

/// Configuration for content scoring
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum content score from character count
    pub max_char_density_score: f64,
    /// Maximum content score from comma count
    pub max_comma_density_score: f64,
    /// Characters per point for content density scoring
    pub chars_per_point: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            max_comma_density_score: 3.0,
            chars_per_point: 100,
        }
    }
}

/// Class/id fragments that suggest an element holds the main content.
static POSITIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story|tweet)")
        .expect("POSITIVE_PATTERN should compile")
});

/// Class/id fragments that suggest an element is page chrome.
static NEGATIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(-ad-|banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|replies|rss|share|shoutbox|sidebar|skyscraper|social|sponsor|ad-break|agegate|pagination|pager|popup|promo|newsletter)",
    )
    .expect("NEGATIVE_PATTERN should compile")
});

/// Calculate the base score for an element based on its tag name
///
/// - DIV: +5 (generic container)
/// - PRE, TD, BLOCKQUOTE: +3 (content elements)
/// - ADDRESS, OL, UL, DL, DD, DT, LI, FORM: -3 (lists, metadata and forms)
/// - H1-H6, TH: -5 (headings)
pub fn base_tag_score(element: &Element<'_>) -> f64 {
    match element.tag_name().as_str() {
        "div" | "article" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

/// Calculate the class/ID weight adjustment for an element
///
/// The id and the class are judged separately and their weights add up.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let mut weight = 0.0;

    for value in [element.attr("class"), element.attr("id")].into_iter().flatten() {
        if value.trim().is_empty() {
            continue;
        }
        if NEGATIVE_PATTERN.is_match(value) {
            weight += config.negative_weight;
        }
        if POSITIVE_PATTERN.is_match(value) {
            weight += config.positive_weight;
        }
    }

    weight
}

/// Content score a paragraph contributes to its ancestors
///
/// One point for being a paragraph, one per comma and one per
/// `chars_per_point` characters, each capped by the config.
pub fn content_density_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let text = element.visible_text();
    let chars = text_length(&text);
    let char_score = ((chars / config.chars_per_point.max(1)) as f64).min(config.max_char_density_score);
    let comma_score = (text.matches(',').count() as f64).min(config.max_comma_density_score);

    1.0 + char_score + comma_score
}

/// Calculate the link density of an element
///
/// Link density is the ratio of link text characters to total text characters.
/// Returns a value from 0.0 (no links) to 1.0 (all text is in links).
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_len = text_length(&element.visible_text());
    if text_len == 0 {
        return 0.0;
    }

    let link_len = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| text_length(&link.visible_text()))
        .sum::<usize>();

    (link_len as f64 / text_len as f64).min(1.0)
}

/// Whether a class/id pair marks a node as page chrome.
///
/// A node is unlikely when either value matches the negative pattern and
/// neither matches the positive one.
pub fn is_unlikely(class: Option<&str>, id: Option<&str>) -> bool {
    let signature = format!("{} {}", class.unwrap_or_default(), id.unwrap_or_default());
    let signature = signature.trim();
    !signature.is_empty() && NEGATIVE_PATTERN.is_match(signature) && !POSITIVE_PATTERN.is_match(signature)
}

/// [`is_unlikely`] for an element. Document roots and `article` are never unlikely.
pub fn is_unlikely_candidate(element: &Element<'_>) -> bool {
    if matches!(element.tag_name().as_str(), "html" | "body" | "article" | "main") {
        return false;
    }
    is_unlikely(element.attr("class"), element.attr("id"))
}
