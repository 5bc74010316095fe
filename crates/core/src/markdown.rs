//! HTML fragment to Markdown conversion.

use std::sync::LazyLock;

use regex::Regex;

use crate::postprocess::remove_elements;
#[cfg(feature = "markdown")]
use crate::PagedownError;
use crate::Result;

/// Elements never rendered, whatever the renderer.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("BLANK_LINES should compile"));

/// Converts an HTML fragment into Markdown text.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, html: &str) -> Result<String>;
}

/// Default [`MarkdownRenderer`].
///
/// Uses htmd when the `markdown` feature is enabled and falls back to the
/// plain text of the fragment otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmdRenderer;

impl MarkdownRenderer for HtmdRenderer {
    fn render(&self, html: &str) -> Result<String> {
        let cleaned = remove_elements(html, SKIPPED_TAGS);
        let markdown = html_to_markdown(&cleaned)?;
        Ok(normalize_markdown(&markdown))
    }
}

/// Convert HTML to Markdown using htmd crate
#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str) -> Result<String> {
    htmd::convert(html).map_err(|e| PagedownError::Render(e.to_string()))
}

/// Fallback HTML to text conversion when markdown feature is disabled
#[cfg(not(feature = "markdown"))]
fn html_to_markdown(html: &str) -> Result<String> {
    let doc = scraper::Html::parse_fragment(html);
    Ok(doc.root_element().text().collect::<String>())
}

/// Trims the output and collapses runs of blank lines into one.
pub fn normalize_markdown(markdown: &str) -> String {
    BLANK_LINES.replace_all(markdown.trim(), "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_markdown() {
        assert_eq!(normalize_markdown("\n\n# Title\n\n\n\nBody\n \n\t\nEnd\n\n"), "# Title\n\nBody\n\nEnd");
        assert_eq!(normalize_markdown("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_scripts_are_not_rendered() {
        let rendered = HtmdRenderer.render("<p>Visible</p><script>hidden()</script><style>p{}</style>").unwrap();
        assert!(rendered.contains("Visible"));
        assert!(!rendered.contains("hidden()"));
        assert!(!rendered.contains("p{}"));
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_renders_markdown() {
        let html = r#"<div><h2>Section</h2><p>Some <strong>bold</strong> text with a <a href="https://example.com/">link</a>.</p><ul><li>One</li><li>Two</li></ul></div>"#;
        let rendered = HtmdRenderer.render(html).unwrap();

        assert!(rendered.starts_with("## Section"));
        assert!(rendered.contains("**bold**"));
        assert!(rendered.contains("[link](https://example.com/)"));
        assert!(rendered.contains("One"));
        assert!(!rendered.contains("<p>"));
    }
}
