use tracing::debug;

use crate::parse::{Document, Element, text_length};
use crate::postprocess::{PostProcessConfig, postprocess_html};
use crate::scoring::{
    ScoreConfig, base_tag_score, class_id_weight, content_density_score, is_unlikely_candidate, link_density,
};

/// Elements whose text is scored and credited to their ancestors
const SCORED_SELECTOR: &str = "p, pre, td, blockquote, div, article";

/// Paragraph-level elements proper; containers holding one are not scored
const PARAGRAPH_SELECTOR: &str = "p, pre, td, blockquote";

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum text length for a paragraph to be scored
    pub min_paragraph_len: usize,
    /// Sibling score threshold (multiplier of top score)
    pub sibling_threshold: f64,
    /// Lower bound of the sibling score threshold
    pub min_sibling_score: f64,
    /// Post-processing configuration
    pub postprocess: PostProcessConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_paragraph_len: 25,
            sibling_threshold: 0.2,
            min_sibling_score: 10.0,
            postprocess: PostProcessConfig::default(),
        }
    }
}

/// The result of content extraction
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Cleaned HTML of the main content, wrapped in a single `<div>`
    pub content: String,
    /// The top candidate score
    pub top_score: f64,
    /// Number of top-level elements extracted
    pub element_count: usize,
}

/// A candidate element with its score
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    element: Element<'a>,
    score: f64,
}

/// Score paragraphs and credit their parents and grandparents.
///
/// The parent receives the full paragraph score, the grandparent half of
/// it. Each ancestor starts from its tag and class/id weight the first time
/// it is seen.
fn score_candidates<'a>(doc: &'a Document, config: &ExtractConfig, score_config: &ScoreConfig) -> Vec<Candidate<'a>> {
    let mut candidates: Vec<Candidate<'a>> = Vec::new();

    for paragraph in doc.select(SCORED_SELECTOR).unwrap_or_default() {
        if !is_scorable(&paragraph) || is_excluded(&paragraph) || paragraph.ancestors().iter().any(is_excluded) {
            continue;
        }
        if text_length(&paragraph.visible_text()) < config.min_paragraph_len {
            continue;
        }

        let score = content_density_score(&paragraph, score_config);
        let parent = paragraph.parent().filter(is_container);
        let grandparent = parent.and_then(|p| p.parent()).filter(is_container);

        for (ancestor, divider) in [(parent, 1.0), (grandparent, 2.0)] {
            let Some(ancestor) = ancestor else { continue };

            let index = match candidates.iter().position(|c| c.element.same_node(&ancestor)) {
                Some(index) => index,
                None => {
                    let initial = base_tag_score(&ancestor) + class_id_weight(&ancestor, score_config);
                    candidates.push(Candidate { element: ancestor, score: initial });
                    candidates.len() - 1
                }
            };
            candidates[index].score += score / divider;
        }
    }

    for candidate in &mut candidates {
        candidate.score *= 1.0 - link_density(&candidate.element);
    }

    candidates
}

/// Paragraph tags always score. A `div` scores when `br` breaks it into
/// lines and an `article` when it holds bare text; neither scores once it
/// wraps paragraphs of its own, so their text is not credited twice.
fn is_scorable(element: &Element<'_>) -> bool {
    let holds_paragraphs = || !element.select(PARAGRAPH_SELECTOR).unwrap_or_default().is_empty();
    match element.tag_name().as_str() {
        "div" => element.children().iter().any(|child| child.tag_name() == "br") && !holds_paragraphs(),
        "article" => text_length(&element.own_text()) > 0 && !holds_paragraphs(),
        _ => true,
    }
}

fn is_excluded(element: &Element<'_>) -> bool {
    element.is_hidden() || is_unlikely_candidate(element)
}

fn is_container(element: &Element<'_>) -> bool {
    !matches!(element.tag_name().as_str(), "html" | "head")
}

/// Select the top candidate and the siblings that belong with it.
///
/// Siblings are included, in document order, if:
/// - Their own score is >= max(min_sibling_score, top_score * sibling_threshold)
/// - For P tags: link_density < 0.25 and text_length > 80 chars
/// - For shorter P tags: no links and a sentence ending in a period
fn select_with_siblings<'a>(
    top: &Candidate<'a>, candidates: &[Candidate<'a>], config: &ExtractConfig,
) -> Vec<Element<'a>> {
    let Some(parent) = top.element.parent().filter(|_| top.element.tag_name() != "body") else {
        return vec![top.element];
    };

    let threshold = config.min_sibling_score.max(top.score * config.sibling_threshold);
    parent
        .children()
        .into_iter()
        .filter(|sibling| {
            if sibling.same_node(&top.element) {
                return true;
            }
            if let Some(candidate) = candidates.iter().find(|c| c.element.same_node(sibling))
                && candidate.score >= threshold
            {
                return true;
            }
            if sibling.tag_name() != "p" || sibling.is_hidden() {
                return false;
            }

            let text = sibling.visible_text();
            let len = text_length(&text);
            let density = link_density(sibling);
            if len > 80 {
                density < 0.25
            } else {
                let trimmed = text.trim_end();
                len > 0 && density == 0.0 && (trimmed.ends_with('.') || trimmed.contains(". "))
            }
        })
        .collect()
}

/// Extract the main content from a document
///
/// This is the main entry point for content extraction. It:
/// 1. Scores paragraph-level elements and credits their ancestors
/// 2. Selects the top candidate
/// 3. Includes qualifying siblings
/// 4. Post-processes the extracted content
///
/// Returns `None` when nothing scores or the cleaned content has no text.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Option<ExtractedContent> {
    let score_config = ScoreConfig::default();
    let mut candidates = score_candidates(doc, config, &score_config);
    if candidates.is_empty() && config.min_paragraph_len > 1 {
        debug!(min_paragraph_len = config.min_paragraph_len, "no paragraph long enough, scoring every paragraph");
        let relaxed = ExtractConfig { min_paragraph_len: 1, ..config.clone() };
        candidates = score_candidates(doc, &relaxed, &score_config);
    }

    let top = candidates
        .iter()
        .copied()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))?;
    let elements = select_with_siblings(&top, &candidates, config);
    debug!(
        top_tag = %top.element.tag_name(),
        top_score = top.score,
        candidates = candidates.len(),
        siblings = elements.len().saturating_sub(1),
        "selected article content"
    );

    let mut content = String::from("<div>");
    for element in &elements {
        if element.tag_name() == "body" {
            content.push_str(&element.inner_html());
        } else {
            content.push_str(&element.outer_html());
        }
    }
    content.push_str("</div>");

    let content = postprocess_html(&content, &config.postprocess);
    if text_length(&Document::parse_fragment(&content).text_content()) == 0 {
        return None;
    }

    Some(ExtractedContent { content, top_score: top.score, element_count: elements.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prose(sentence: &str, times: usize) -> String {
        sentence.repeat(times)
    }

    #[test]
    fn test_extract_config_default() {
        let config = ExtractConfig::default();
        assert_eq!(config.min_paragraph_len, 25);
        assert_eq!(config.sibling_threshold, 0.2);
        assert_eq!(config.min_sibling_score, 10.0);
    }

    #[test]
    fn test_scores_propagate_to_parent_and_grandparent() {
        let html = format!(
            r#"<html><body><div id="outer"><div id="inner"><p>{}</p></div></div></body></html>"#,
            prose("Words, more words, and still more words. ", 3)
        );
        let doc = Document::parse(&html);
        let candidates = score_candidates(&doc, &ExtractConfig::default(), &ScoreConfig::default());

        let inner = candidates.iter().find(|c| c.element.attr("id") == Some("inner")).unwrap();
        let outer = candidates.iter().find(|c| c.element.attr("id") == Some("outer")).unwrap();
        // Paragraph score: 1 + 1 (chars) + 3 (commas) = 5, plus the div base of 5.
        assert_eq!(inner.score, 10.0);
        assert_eq!(outer.score, 7.5);
    }

    #[test]
    fn test_short_and_unlikely_paragraphs_are_not_scored() {
        let html = r#"<html><body><div><p>Too short.</p></div><div class="sidebar"><p>A long enough paragraph that sits in the sidebar.</p></div></body></html>"#;
        let doc = Document::parse(html);
        let candidates = score_candidates(&doc, &ExtractConfig::default(), &ScoreConfig::default());
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_extract_main_content() {
        let html = format!(
            r#"
            <html><body>
                <nav class="menu"><a href="/">Home</a><a href="/about">About</a></nav>
                <div class="post-content">
                    <h1>Article Title</h1>
                    <p>{}</p>
                    <p>{}</p>
                    <div class="share">Share on everything</div>
                </div>
                <footer>Copyright 2024</footer>
            </body></html>
            "#,
            prose("The first paragraph has plenty of prose, commas, and detail. ", 4),
            prose("The second paragraph continues the story, at similar length. ", 4)
        );

        let doc = Document::parse(&html);
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();

        assert!(extracted.content.starts_with("<div>"));
        assert!(extracted.content.contains("The first paragraph"));
        assert!(extracted.content.contains("The second paragraph"));
        assert!(extracted.content.contains("Article Title"));
        assert!(!extracted.content.contains("Home"));
        assert!(!extracted.content.contains("Share on everything"));
        assert!(!extracted.content.contains("Copyright"));
        assert!(!extracted.content.contains("class="));
        assert!(extracted.top_score > 0.0);
    }

    #[test]
    fn test_siblings_are_merged_in_order() {
        let html = format!(
            r#"<html><body><main>
                <div id="intro"><p>{}</p></div>
                <p>{}</p>
                <div id="body"><p>{}</p><p>{}</p></div>
                <div id="links"><a href="/a">A link list that should not be merged in</a></div>
            </main></body></html>"#,
            prose("Introductory remarks, setting the scene, with some commas. ", 3),
            prose("A loose paragraph between the two blocks that reads like prose. ", 2),
            prose("The main body of the piece, long, detailed, and thorough. ", 5),
            prose("More of the main body, continuing, expanding, and concluding. ", 5)
        );

        let doc = Document::parse(&html);
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();

        let intro = extracted.content.find("Introductory").unwrap();
        let loose = extracted.content.find("A loose paragraph").unwrap();
        let body = extracted.content.find("The main body").unwrap();
        assert!(intro < loose && loose < body);
        assert!(!extracted.content.contains("A link list"));
        assert_eq!(extracted.element_count, 3);
    }

    #[test]
    fn test_line_broken_div_is_extracted() {
        let line = prose("Text that is broken into lines, not paragraphs, by the author. ", 3);
        let html = format!("<html><body><div>{line}<br>{line}<br>{line}</div></body></html>");
        let doc = Document::parse(&html);
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();

        assert!(extracted.content.contains("Text that is broken into lines"));
        assert!(extracted.content.contains("<br"));
        assert!(!extracted.content.contains("<body"));
    }

    #[test]
    fn test_div_wrapping_paragraphs_is_not_scored_twice() {
        let html = format!(
            r#"<html><body><div id="outer"><div id="inner"><p>{}</p><br></div></div></body></html>"#,
            prose("Words, more words, and still more words. ", 3)
        );
        let doc = Document::parse(&html);
        let candidates = score_candidates(&doc, &ExtractConfig::default(), &ScoreConfig::default());

        let inner = candidates.iter().find(|c| c.element.attr("id") == Some("inner")).unwrap();
        assert_eq!(inner.score, 10.0);
        assert!(candidates.iter().all(|c| c.element.tag_name() != "body"));
    }

    #[test]
    fn test_article_text_outside_paragraphs_is_extracted() {
        let html = format!(
            "<html><body><article>{}</article></body></html>",
            prose("An article written straight into its element, with no paragraphs. ", 3)
        );
        let doc = Document::parse(&html);
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();
        assert!(extracted.content.contains("with no paragraphs"));
    }

    #[test]
    fn test_short_paragraph_is_extracted_when_nothing_else_scores() {
        let doc = Document::parse("<html><body><p>Hello world, short note.</p></body></html>");
        let extracted = extract_content(&doc, &ExtractConfig::default()).unwrap();
        assert!(extracted.content.contains("Hello world, short note."));
    }

    #[test]
    fn test_nothing_to_extract() {
        let doc = Document::parse("<html><body><ul><li>One</li><li>Two</li></ul></body></html>");
        assert!(extract_content(&doc, &ExtractConfig::default()).is_none());
    }
}
