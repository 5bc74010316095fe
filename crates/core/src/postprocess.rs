use std::sync::LazyLock;

use lol_html::{HtmlRewriter, Settings, element};
use regex::Regex;

use crate::scoring::is_unlikely;

/// Elements that never belong in an extracted article.
pub const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "aside", "footer", "form", "iframe", "button", "script", "style", "noscript", "link",
];

/// Configuration for HTML post-processing cleanup
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    /// Whether to remove empty paragraphs and divs
    pub remove_empty_nodes: bool,
    /// Maximum passes for removing empty nodes
    pub max_empty_node_passes: usize,
    /// Whether to keep class attributes (default: false)
    pub keep_classes: bool,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self { remove_empty_nodes: true, max_empty_node_passes: 10, keep_classes: false }
    }
}

/// Post-process an extracted article fragment.
///
/// Drops boilerplate elements and nodes whose class or id marks them as
/// unlikely content, strips class attributes, then removes the empty nodes
/// left behind.
pub fn postprocess_html(html: &str, config: &PostProcessConfig) -> String {
    let mut processed = strip_boilerplate(html, config.keep_classes);

    if config.remove_empty_nodes {
        processed = remove_empty_nodes(&processed, config.max_empty_node_passes);
    }

    processed
}

/// Removes every element whose tag is in `tags`, content included.
///
/// Entries that are not plain tag names are ignored.
pub fn remove_elements(html: &str, tags: &[&str]) -> String {
    let handlers = tags
        .iter()
        .filter(|tag| is_tag_name(tag))
        .map(|tag| {
            element!(tag, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect::<Vec<_>>();

    if handlers.is_empty() {
        return html.to_string();
    }

    let mut output = Vec::new();
    let mut rewriter = HtmlRewriter::new(
        Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| html.to_string())
}

fn strip_boilerplate(html: &str, keep_classes: bool) -> String {
    let mut output = Vec::new();
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("*", |el| {
                if el.removed() {
                    return Ok(());
                }

                let tag = el.tag_name().to_ascii_lowercase();
                let class = el.get_attribute("class");
                let id = el.get_attribute("id");
                if BOILERPLATE_TAGS.contains(&tag.as_str()) || is_unlikely(class.as_deref(), id.as_deref()) {
                    el.remove();
                    return Ok(());
                }

                if !keep_classes {
                    el.remove_attribute("class");
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| html.to_string())
}

static EMPTY_NODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["p", "div", "span", "section"]
        .iter()
        .filter_map(|tag| Regex::new(&format!(r"<{tag}(?:\s[^>]*)?>(?:\s|&nbsp;|<br\s*/?>)*</{tag}>")).ok())
        .collect()
});

/// Remove empty nodes from HTML
///
/// A node is empty when it holds nothing but whitespace and line breaks.
/// Removal repeats until nothing changes, so wrappers emptied by a previous
/// pass go too.
fn remove_empty_nodes(html: &str, max_passes: usize) -> String {
    let mut result = html.to_string();

    for _ in 0..max_passes {
        let before = result.len();
        for pattern in EMPTY_NODE_PATTERNS.iter() {
            result = pattern.replace_all(&result, "").into_owned();
        }
        if result.len() == before {
            break;
        }
    }

    result
}

fn is_tag_name(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
