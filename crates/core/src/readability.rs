//! The readable / not-readable decision.
//!
//! A page is probably readable when a single block of text makes up at
//! least a third of everything a reader would see in its body. Readable
//! pages go to the article extractor, everything else to the metadata
//! fallback.
//!
//! # Example
//!
//! ```rust
//! use pagedown_core::readability::is_probably_readable;
//!
//! let article = format!("<html><body><nav>Home</nav><p>{}</p></body></html>", "Long prose. ".repeat(20));
//! let feed = "<html><body><ul><li>One</li><li>Two</li><li>Three</li></ul></body></html>";
//!
//! assert!(is_probably_readable(&article));
//! assert!(!is_probably_readable(feed));
//! ```

use tracing::debug;

use crate::parse::{Document, Element, Page, text_length};
use crate::scoring::is_unlikely_candidate;

/// Elements that may hold the dominant block of text.
const CANDIDATE_SELECTOR: &str = "p, pre, article, div";

/// Text lengths the readability decision was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadabilityReport {
    /// Length of the longest candidate block.
    pub dominant_len: usize,
    /// Length of all visible body text.
    pub total_len: usize,
}

impl ReadabilityReport {
    /// Whether the dominant block is at least a third of the body text.
    ///
    /// Pages without any text are never readable.
    pub fn is_readable(&self) -> bool {
        self.total_len > 0 && self.dominant_len > 0 && self.dominant_len.saturating_mul(3) >= self.total_len
    }

    /// Share of the body text held by the dominant block.
    pub fn ratio(&self) -> f64 {
        if self.total_len == 0 { 0.0 } else { self.dominant_len as f64 / self.total_len as f64 }
    }
}

/// The branch a page takes after classification.
#[derive(Debug, Clone)]
pub enum Route {
    /// Main-content extraction.
    Article(Page),
    /// Metadata and full-text summary.
    Fallback(Page),
}

impl Route {
    pub fn page(&self) -> &Page {
        match self {
            Route::Article(page) | Route::Fallback(page) => page,
        }
    }

    pub fn is_article(&self) -> bool {
        matches!(self, Route::Article(_))
    }
}

/// Measures the dominant block and the total body text of `doc`.
pub fn classify_document(doc: &Document) -> ReadabilityReport {
    let Some(body) = doc.body() else {
        return ReadabilityReport::default();
    };

    let total_len = text_length(&body.visible_text());
    let dominant_len = doc
        .select(CANDIDATE_SELECTOR)
        .unwrap_or_default()
        .into_iter()
        .filter(is_candidate)
        .map(|element| text_length(&element.visible_text()))
        .max()
        .unwrap_or(0);

    ReadabilityReport { dominant_len, total_len }
}

/// Classifies `page` and moves it into the matching branch.
pub fn route(page: Page) -> (Route, ReadabilityReport) {
    let report = classify_document(&page.document());
    debug!(
        dominant = report.dominant_len,
        total = report.total_len,
        readable = report.is_readable(),
        "classified page"
    );

    let route = if report.is_readable() { Route::Article(page) } else { Route::Fallback(page) };
    (route, report)
}

/// Checks if `html` appears readable without extracting anything.
pub fn is_probably_readable(html: &str) -> bool {
    classify_document(&Document::parse(html)).is_readable()
}

fn is_candidate(element: &Element<'_>) -> bool {
    let excluded = |e: &Element<'_>| e.is_hidden() || is_unlikely_candidate(e);
    if excluded(element) || element.ancestors().iter().any(excluded) {
        return false;
    }

    match element.tag_name().as_str() {
        "p" => !element.has_ancestor("li"),
        "div" => element.children().iter().any(|child| child.tag_name() == "br"),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::new(html, Url::parse("https://example.com/").unwrap())
    }

    #[rstest]
    #[case(10, 30, true)]
    #[case(10, 31, false)]
    #[case(11, 30, true)]
    #[case(0, 30, false)]
    #[case(0, 0, false)]
    #[case(30, 30, true)]
    fn test_one_third_boundary(#[case] dominant_len: usize, #[case] total_len: usize, #[case] readable: bool) {
        assert_eq!(ReadabilityReport { dominant_len, total_len }.is_readable(), readable);
    }

    #[test]
    fn test_exactly_one_third_page_is_readable() {
        // 10 + 1 (joining space) + 19 = 30 visible characters, of which the paragraph holds 10.
        let html = "<html><body><p>aaaaaaaaaa</p> <span>bbbbbbbbbbbbbbbbbbb</span></body></html>";
        let report = classify_document(&Document::parse(html));

        assert_eq!(report, ReadabilityReport { dominant_len: 10, total_len: 30 });
        assert!(report.is_readable());
    }

    #[test]
    fn test_article_page_routes_to_article() {
        let html = format!(
            r#"<html><body><header><a href="/">Site</a></header><article><p>{}</p></article><footer>Footer</footer></body></html>"#,
            "A sentence of real prose, written for people. ".repeat(15)
        );

        let (route, report) = route(page(&html));
        assert!(route.is_article());
        assert!(report.ratio() > 0.9);
    }

    #[test]
    fn test_link_farm_routes_to_fallback() {
        let links: String = (0..40).map(|i| format!(r#"<li><a href="/p/{i}">Story number {i}</a></li>"#)).collect();
        let html = format!("<html><body><p>Latest</p><ul>{links}</ul></body></html>");

        let (route, _) = route(page(&html));
        assert!(matches!(route, Route::Fallback(_)));
    }

    #[test]
    fn test_empty_page_is_not_readable() {
        let (route, report) = route(page("<html><head><title>Blank</title></head><body></body></html>"));
        assert!(!route.is_article());
        assert_eq!(report.total_len, 0);
    }

    #[test]
    fn test_scripts_do_not_count() {
        let script = "x".repeat(5000);
        let html = format!("<html><body><p>Short but visible paragraph.</p><script>{script}</script></body></html>");
        assert!(is_probably_readable(&html));
    }

    #[test]
    fn test_list_paragraphs_and_hidden_blocks_skipped() {
        let html = r#"<html><body>
            <ul><li><p>A paragraph inside a list item that is quite long indeed</p></li></ul>
            <p hidden>Hidden paragraph that is also fairly long to matter</p>
            <p>Tiny</p>
        </body></html>"#;

        let report = classify_document(&Document::parse(html));
        assert_eq!(report.dominant_len, 4);
    }

    #[test]
    fn test_div_with_line_breaks_is_candidate() {
        let html = "<html><body><div>First line<br>Second line<br>Third line</div><span>x</span></body></html>";
        let report = classify_document(&Document::parse(html));
        assert!(report.dominant_len > 20);
        assert!(report.is_readable());
    }

    #[test]
    fn test_unlikely_blocks_skipped() {
        let html = r#"<html><body><div class="comments"><p class="sidebar">Long sidebar paragraph text here</p></div><p>Ok</p></body></html>"#;
        let report = classify_document(&Document::parse(html));
        assert_eq!(report.dominant_len, 2);
    }
}
