//! HTML ownership and parsing.
//!
//! A conversion owns its HTML as a [`Page`]: the markup plus the URL it was
//! served from. Passes that change the page (URL absolutization, element
//! stripping) rewrite the markup in place through `&mut Page`. Queries run
//! on a [`Document`], a parsed `scraper` tree created from the page inside
//! a synchronous stage.
//!
//! `Document` is not `Send`, so the pipeline never keeps one alive across
//! an await; the page is what travels between stages.
//!
//! # Example
//!
//! ```rust
//! use pagedown_core::parse::Page;
//! use url::Url;
//!
//! let mut page = Page::new(
//!     r#"<html><head><title>Test</title></head><body><a href="/about">About</a></body></html>"#,
//!     Url::parse("https://example.com/blog/").unwrap(),
//! );
//! page.absolutize();
//!
//! let doc = page.document();
//! assert_eq!(doc.title(), Some("Test".to_string()));
//! assert_eq!(doc.select("a").unwrap()[0].attr("href"), Some("https://example.com/about"));
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{PagedownError, Result, absolutize, postprocess};

/// Elements whose text never counts as page content.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// The HTML of one conversion and the URL it resolves against.
#[derive(Debug, Clone)]
pub struct Page {
    markup: String,
    base_url: Url,
}

impl Page {
    pub fn new(markup: impl Into<String>, base_url: Url) -> Self {
        Self { markup: markup.into(), base_url }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Parses the current markup.
    pub fn document(&self) -> Document {
        Document::parse(&self.markup)
    }

    /// Resolves every link and resource reference against the base URL.
    pub fn absolutize(&mut self) {
        self.markup = absolutize::absolutize_urls(&self.markup, &self.base_url);
    }

    /// Removes every element matching one of `tags`, content included.
    pub fn strip_elements(&mut self, tags: &[&str]) {
        self.markup = postprocess::remove_elements(&self.markup, tags);
    }

    pub fn into_markup(self) -> String {
        self.markup
    }
}

/// A parsed HTML document.
///
/// # Example
///
/// ```rust
/// use pagedown_core::parse::Document;
///
/// let doc = Document::parse("<html><head><title>Test</title></head><body><p>Hello</p></body></html>");
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a complete document. Malformed markup is repaired, never rejected.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Parses an HTML fragment such as extracted article content.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PagedownError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|element| Element { element }).collect())
    }

    /// First element matching `selector`, if any.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|element| Element { element }))
    }

    /// Trimmed text of the `<title>` element, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        let title = self.select_first("title").ok()??.text();
        let title = collapse_whitespace(&title);
        if title.is_empty() { None } else { Some(title) }
    }

    /// The `<body>` element. Always present after HTML5 parsing of a document.
    pub fn body(&'_ self) -> Option<Element<'_>> {
        self.select_first("body").ok().flatten()
    }

    /// Gets all text content from the document, scripts included.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use pagedown_core::parse::Document;
///
/// let doc = Document::parse(r#"<a href="https://example.com">Link text</a>"#);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text of the element's own text nodes, excluding descendants.
    pub fn own_text(&self) -> String {
        self.element.children().filter_map(|child| child.value().as_text()).map(|text| &**text).collect()
    }

    /// Text a reader would see: script, style, noscript and template
    /// contents are skipped.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        collect_visible_text(self.element, &mut out);
        out
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements using a CSS selector.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|element| Element { element }).collect())
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|element| Element { element })
    }

    /// Element children in document order.
    pub fn children(&self) -> Vec<Element<'a>> {
        self.element.children().filter_map(ElementRef::wrap).map(|element| Element { element }).collect()
    }

    /// Whether `self` and `other` are the same node of the same tree.
    pub fn same_node(&self, other: &Element<'_>) -> bool {
        self.element.id() == other.element.id()
    }

    /// Ancestor elements, nearest first.
    pub fn ancestors(&self) -> Vec<Element<'a>> {
        self.element.ancestors().filter_map(ElementRef::wrap).map(|element| Element { element }).collect()
    }

    /// Whether any ancestor has the given tag name.
    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| ancestor.value().name().eq_ignore_ascii_case(tag))
    }

    /// Hidden via the `hidden` attribute, `aria-hidden` or an inline style.
    pub fn is_hidden(&self) -> bool {
        if self.attr("hidden").is_some() || self.attr("aria-hidden") == Some("true") {
            return true;
        }
        self.attr("style").is_some_and(|style| {
            let style: String = style.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
            style.contains("display:none") || style.contains("visibility:hidden")
        })
    }
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !NON_CONTENT_TAGS.contains(&child_element.value().name()) {
                collect_visible_text(child_element, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PagedownError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Collapses runs of whitespace to single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character count of `text` after [`collapse_whitespace`].
pub fn text_length(text: &str) -> usize {
    let mut words = 0usize;
    let mut chars = 0usize;
    for word in text.split_whitespace() {
        words += 1;
        chars += word.chars().count();
    }
    chars + words.saturating_sub(1)
}
