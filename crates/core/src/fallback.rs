//! The summary produced for pages that are not probably readable.
//!
//! Social metadata, the full text of the cleaned page and, for video URLs,
//! a caption transcript are merged into one short Markdown document:
//!
//! ```text
//! # Title
//!
//! Description
//!
//! Published March 5, 2024
//!
//! ![Title](https://example.com/cover.png)
//! ```
//!
//! Every source here is optional. A failing or slow collaborator costs the
//! summary a field, never the conversion.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::error::{PagedownError, Result};
use crate::markdown::MarkdownRenderer;
use crate::metadata::{MetadataParser, SocialMetadata, format_long_date};
use crate::parse::Page;
use crate::video::{CaptionSource, render_transcript, video_id};

/// Elements removed from the page before its full text is rendered.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "link"];

/// The fields of a fallback summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Publication date as stated by the page.
    pub published_date: Option<String>,
    pub image: Option<String>,
}

impl Summary {
    /// Renders the summary blocks in order, separated by blank lines.
    ///
    /// Absent or empty fields are left out, and so is a publication date
    /// that cannot be parsed.
    pub fn render(&self) -> String {
        let title = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let mut blocks = Vec::new();

        if let Some(title) = title {
            blocks.push(format!("# {title}"));
        }
        if let Some(description) = self.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            blocks.push(description.to_string());
        }
        if let Some(date) = self.published_date.as_deref().and_then(format_long_date) {
            blocks.push(format!("Published {date}"));
        }
        if let Some(image) = self.image.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
            blocks.push(format!("![{}]({image})", title.unwrap_or_default()));
        }

        blocks.join("\n\n")
    }
}

/// Picks the description: the full text replaces the metadata description
/// only when it is strictly longer, counted in characters.
pub fn choose_description(metadata_description: Option<String>, full_text: String) -> Option<String> {
    let candidate = metadata_description.unwrap_or_default();
    let chosen = if full_text.chars().count() > candidate.chars().count() { full_text } else { candidate };
    if chosen.trim().is_empty() { None } else { Some(chosen) }
}

/// Runs the fallback path with borrowed collaborators.
pub struct FallbackExtractor<'a> {
    pub metadata: &'a dyn MetadataParser,
    pub renderer: &'a dyn MarkdownRenderer,
    pub captions: &'a dyn CaptionSource,
    pub metadata_timeout: Duration,
    pub caption_timeout: Duration,
}

impl FallbackExtractor<'_> {
    /// Builds the summary of `page`.
    ///
    /// `source_url` is the URL the caller asked for; it decides whether a
    /// transcript is attempted.
    pub async fn summarize(&self, mut page: Page, source_url: &Url) -> String {
        let metadata = self.parse_metadata(page.markup()).await;

        page.strip_elements(NON_CONTENT_TAGS);
        let (page_title, full_text) = self.render_full_text(&page);
        debug!(
            metadata_description = metadata.description.as_ref().map_or(0, |d| d.chars().count()),
            full_text = full_text.chars().count(),
            "rendered full text"
        );

        let mut summary = Summary {
            description: choose_description(metadata.description, full_text),
            title: metadata.title.or(page_title),
            published_date: metadata.published_date,
            image: metadata.image,
        };

        if let Some(id) = video_id(source_url)
            && let Some(transcript) = self.transcript(&id).await
        {
            summary.description = Some(transcript);
        }

        summary.render()
    }

    async fn parse_metadata(&self, markup: &str) -> SocialMetadata {
        self.read_metadata(markup).await.unwrap_or_else(|e| {
            warn!(error = %e, "continuing without metadata");
            SocialMetadata::default()
        })
    }

    /// Runs the metadata parser under the metadata timeout.
    async fn read_metadata(&self, markup: &str) -> Result<SocialMetadata> {
        match timeout(self.metadata_timeout, self.metadata.parse(markup)).await {
            Ok(parsed) => parsed,
            Err(_) => Err(PagedownError::Metadata(format!("timed out after {:?}", self.metadata_timeout))),
        }
    }

    /// `<title>` text and the Markdown of the page body.
    fn render_full_text(&self, page: &Page) -> (Option<String>, String) {
        let doc = page.document();
        let title = doc.title();
        let body = doc.body().map(|body| body.inner_html()).unwrap_or_default();

        let full_text = self.renderer.render(&body).unwrap_or_else(|e| {
            warn!(error = %e, "full-text rendering failed");
            String::new()
        });
        (title, full_text)
    }

    async fn transcript(&self, video_id: &str) -> Option<String> {
        match timeout(self.caption_timeout, self.captions.captions(video_id)).await {
            Ok(Ok(captions)) => {
                let transcript = render_transcript(&captions);
                if transcript.is_none() {
                    warn!(video_id, "video has no caption text, keeping page description");
                }
                transcript
            }
            Ok(Err(e)) => {
                warn!(video_id, error = %e, "caption fetch failed, keeping page description");
                None
            }
            Err(_) => {
                warn!(video_id, timeout = ?self.caption_timeout, "caption fetch timed out, keeping page description");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn summary() -> Summary {
        Summary {
            title: Some("A Title".into()),
            description: Some("What it is about.".into()),
            published_date: Some("2024-03-05T10:00:00Z".into()),
            image: Some("https://example.com/cover.png".into()),
        }
    }

    #[test]
    fn test_full_summary() {
        assert_eq!(
            summary().render(),
            "# A Title\n\nWhat it is about.\n\nPublished March 5, 2024\n\n![A Title](https://example.com/cover.png)"
        );
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let only_title = Summary { title: Some("A Title".into()), ..Default::default() };
        assert_eq!(only_title.render(), "# A Title");

        let no_title = Summary { title: None, ..summary() };
        assert!(no_title.render().starts_with("What it is about."));
        assert!(no_title.render().ends_with("![](https://example.com/cover.png)"));

        assert_eq!(Summary::default().render(), "");
    }

    #[test]
    fn test_unparseable_date_is_omitted() {
        let summary = Summary { published_date: Some("last Tuesday".into()), ..summary() };
        assert!(!summary.render().contains("Published"));
    }

    #[rstest]
    #[case(Some("short"), "a longer full text", Some("a longer full text"))]
    #[case(Some("same!"), "equal", Some("same!"))]
    #[case(Some("a longer description"), "short", Some("a longer description"))]
    #[case(None, "text", Some("text"))]
    #[case(None, "", None)]
    #[case(Some(""), "  ", None)]
    fn test_choose_description(#[case] metadata: Option<&str>, #[case] full_text: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            choose_description(metadata.map(str::to_string), full_text.to_string()).as_deref(),
            expected
        );
    }

    struct StalledMetadata;

    #[async_trait::async_trait]
    impl MetadataParser for StalledMetadata {
        async fn parse(&self, _markup: &str) -> Result<SocialMetadata> {
            std::future::pending::<Result<SocialMetadata>>().await
        }
    }

    #[tokio::test]
    async fn test_stalled_metadata_parser_times_out_with_metadata_error() {
        let extractor = FallbackExtractor {
            metadata: &StalledMetadata,
            renderer: &crate::markdown::HtmdRenderer,
            captions: &crate::video::NoCaptions,
            metadata_timeout: Duration::from_millis(10),
            caption_timeout: Duration::from_millis(10),
        };

        let result = extractor.read_metadata("<html></html>").await;
        assert!(matches!(result, Err(PagedownError::Metadata(m)) if m.contains("timed out")));
        assert_eq!(extractor.parse_metadata("<html></html>").await, SocialMetadata::default());
    }

    #[test]
    fn test_choose_description_counts_characters() {
        // Five characters in nine bytes, against six characters.
        assert_eq!(choose_description(Some("abcdef".into()), "éééé!".into()).as_deref(), Some("abcdef"));
    }
}
