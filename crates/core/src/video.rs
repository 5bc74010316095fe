//! Video URL recognition and caption transcripts.
//!
//! Pages of recognized video hosts rarely carry useful text. When the
//! requested URL names a video, the fallback summary replaces its
//! description with a transcript built from the video's captions.

use std::cmp::Ordering;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::parse::collapse_whitespace;
use crate::rewrite::host_matches;
use crate::{PagedownError, Result};

/// Heading of the transcript section in a fallback summary.
pub const TRANSCRIPT_HEADING: &str = "## Generated Transcription";

/// One timed caption line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    /// Offset from the start of the video, in seconds.
    pub start: f64,
    /// Display duration, in seconds.
    pub duration: f64,
    pub text: String,
}

/// Fetches the captions of a video by its identifier.
///
/// An empty list is a valid answer; the caller treats it like a failure and
/// keeps the page description.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn captions(&self, video_id: &str) -> Result<Vec<Caption>>;
}

/// A [`CaptionSource`] that never has captions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaptions;

#[async_trait]
impl CaptionSource for NoCaptions {
    async fn captions(&self, _video_id: &str) -> Result<Vec<Caption>> {
        Err(PagedownError::Captions("caption fetching is not enabled".to_string()))
    }
}

/// Extracts the video identifier from a recognized video URL.
///
/// Recognized forms:
/// - `youtube.com` and its subdomains: `/watch?v=ID`, `/shorts/ID`,
///   `/embed/ID`, `/live/ID`, `/v/ID`
/// - `youtu.be/ID`
/// - `youtube-nocookie.com/embed/ID`
pub fn video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let candidate = if host_matches(host, "youtu.be") {
        segments.next()?.to_string()
    } else if host_matches(host, "youtube-nocookie.com") {
        match (segments.next()?, segments.next()) {
            ("embed", Some(id)) => id.to_string(),
            _ => return None,
        }
    } else if host_matches(host, "youtube.com") {
        match (segments.next()?, segments.next()) {
            ("watch", None) => url.query_pairs().find(|(key, _)| key == "v").map(|(_, value)| value.into_owned())?,
            ("shorts" | "embed" | "live" | "v", Some(id)) => id.to_string(),
            _ => return None,
        }
    } else {
        return None;
    };

    is_video_id(&candidate).then_some(candidate)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11 && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Renders captions as the transcript section of a summary.
///
/// Lines are ordered by start time and joined by single newlines. Returns
/// `None` when no caption has any text.
pub fn render_transcript(captions: &[Caption]) -> Option<String> {
    let mut ordered: Vec<&Caption> = captions.iter().filter(|c| !c.text.trim().is_empty()).collect();
    if ordered.is_empty() {
        return None;
    }
    ordered.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

    let lines = ordered.iter().map(|c| c.text.trim()).collect::<Vec<_>>().join("\n");
    Some(format!("{TRANSCRIPT_HEADING}\n\n{lines}"))
}

/// A caption track listed in a watch page's player response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Reads the `captionTracks` list embedded in a watch page.
pub fn caption_tracks(watch_page: &str) -> Result<Vec<CaptionTrack>> {
    const MARKER: &str = "\"captionTracks\":";

    let start = watch_page
        .find(MARKER)
        .ok_or_else(|| PagedownError::Captions("no caption tracks in player response".to_string()))?;

    serde_json::Deserializer::from_str(&watch_page[start + MARKER.len()..])
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .ok_or_else(|| PagedownError::Captions("truncated caption track list".to_string()))?
        .map_err(|e| PagedownError::Captions(format!("invalid caption track list: {e}")))
}

/// Picks the track for `language`.
///
/// Prefers an exact language match, then a regional variant (`en-GB` for
/// `en`), then manual tracks over automatic ones, then the first track.
pub fn choose_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let is_language = |track: &&CaptionTrack| track.language_code.eq_ignore_ascii_case(language);
    let is_variant = |track: &&CaptionTrack| {
        track.language_code.split('-').next().is_some_and(|base| base.eq_ignore_ascii_case(language))
    };
    let is_manual = |track: &&CaptionTrack| track.kind.as_deref() != Some("asr");

    tracks
        .iter()
        .filter(is_language)
        .find(is_manual)
        .or_else(|| tracks.iter().find(is_language))
        .or_else(|| tracks.iter().filter(is_variant).find(is_manual))
        .or_else(|| tracks.iter().find(is_variant))
        .or_else(|| tracks.first())
}

/// Parses a timed-text document.
///
/// Understands the classic `<text start="s" dur="s">` format and the
/// `<p t="ms" d="ms">` format. Entities are decoded twice because caption
/// text arrives escaped inside the XML.
pub fn parse_timed_text(xml: &str) -> Vec<Caption> {
    let fragment = Html::parse_fragment(xml);

    let classic = select_captions(&fragment, "text[start]", "start", "dur", 1.0);
    if !classic.is_empty() {
        return classic;
    }
    select_captions(&fragment, "p[t]", "t", "d", 1000.0)
}

fn select_captions(fragment: &Html, selector: &str, start_attr: &str, duration_attr: &str, scale: f64) -> Vec<Caption> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    fragment
        .select(&selector)
        .filter_map(|node| {
            let start = node.value().attr(start_attr)?.trim().parse::<f64>().ok()? / scale;
            let duration = node
                .value()
                .attr(duration_attr)
                .and_then(|d| d.trim().parse::<f64>().ok())
                .map_or(0.0, |d| d / scale);
            let text = decode_entities(&node.text().collect::<String>());
            (!text.is_empty()).then_some(Caption { start, duration, text })
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return collapse_whitespace(text);
    }
    let decoded: String = Html::parse_fragment(text).root_element().text().collect();
    collapse_whitespace(&decoded)
}

#[cfg(feature = "fetch")]
pub use youtube::YoutubeCaptions;

#[cfg(feature = "fetch")]
mod youtube {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use tracing::debug;
    use url::Url;

    use super::{Caption, CaptionSource, caption_tracks, choose_track, parse_timed_text};
    use crate::{PagedownError, Result};

    /// Default [`CaptionSource`] for YouTube videos.
    ///
    /// Loads the watch page, picks a caption track from its player response
    /// and downloads the track's timed text.
    #[derive(Debug, Clone)]
    pub struct YoutubeCaptions {
        client: Client,
        language: String,
    }

    impl YoutubeCaptions {
        pub fn new(language: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
            let client = Client::builder().user_agent(user_agent).timeout(timeout).build()?;
            Ok(Self { client, language: language.into() })
        }

        async fn get_text(&self, url: Url) -> Result<String> {
            let response = self
                .client
                .get(url.clone())
                .header("Accept-Language", format!("{},en;q=0.8", self.language))
                .send()
                .await
                .map_err(|e| PagedownError::Captions(e.to_string()))?;

            if !response.status().is_success() {
                return Err(PagedownError::Captions(format!("HTTP {} for {url}", response.status().as_u16())));
            }
            response.text().await.map_err(|e| PagedownError::Captions(e.to_string()))
        }
    }

    #[async_trait]
    impl CaptionSource for YoutubeCaptions {
        async fn captions(&self, video_id: &str) -> Result<Vec<Caption>> {
            let mut watch_url = Url::parse("https://www.youtube.com/watch")
                .map_err(|e| PagedownError::Captions(e.to_string()))?;
            watch_url.query_pairs_mut().append_pair("v", video_id).append_pair("hl", &self.language);

            let watch_page = self.get_text(watch_url.clone()).await?;
            let tracks = caption_tracks(&watch_page)?;
            let track = choose_track(&tracks, &self.language)
                .ok_or_else(|| PagedownError::Captions(format!("no caption tracks for {video_id}")))?;
            debug!(video_id, language = %track.language_code, "downloading caption track");

            let track_url = watch_url
                .join(&track.base_url)
                .map_err(|e| PagedownError::Captions(format!("invalid caption track url: {e}")))?;
            let timed_text = self.get_text(track_url).await?;

            Ok(parse_timed_text(&timed_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42", Some("dQw4w9WgXcQ"))]
    #[case("https://m.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://music.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://www.youtube.com/shorts/aBcDeFgHi_-", Some("aBcDeFgHi_-"))]
    #[case("https://www.youtube.com/embed/dQw4w9WgXcQ?start=3", Some("dQw4w9WgXcQ"))]
    #[case("https://www.youtube.com/live/dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://www.youtube.com/v/dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://youtu.be/dQw4w9WgXcQ?si=abc", Some("dQw4w9WgXcQ"))]
    #[case("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://www.youtube.com/", None)]
    #[case("https://www.youtube.com/watch", None)]
    #[case("https://www.youtube.com/watch?v=short", None)]
    #[case("https://www.youtube.com/@channel/videos", None)]
    #[case("https://youtu.be/", None)]
    #[case("https://notyoutube.com/watch?v=dQw4w9WgXcQ", None)]
    #[case("https://example.com/watch?v=dQw4w9WgXcQ", None)]
    fn test_video_id(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(video_id(&Url::parse(input).unwrap()).as_deref(), expected);
    }

    #[test]
    fn test_render_transcript_sorts_by_start() {
        let captions = vec![
            Caption { start: 4.0, duration: 1.0, text: "third".into() },
            Caption { start: 0.5, duration: 1.0, text: "first".into() },
            Caption { start: 2.0, duration: 1.0, text: "  ".into() },
            Caption { start: 1.5, duration: 1.0, text: "second".into() },
        ];

        assert_eq!(
            render_transcript(&captions).unwrap(),
            "## Generated Transcription\n\nfirst\nsecond\nthird"
        );
    }

    #[test]
    fn test_render_transcript_empty() {
        assert_eq!(render_transcript(&[]), None);
    }

    #[test]
    fn test_caption_tracks_from_player_response() {
        let page = r#"<script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=x&lang=de","name":{"runs":[{"text":"German"}]},"languageCode":"de"},{"baseUrl":"/api/timedtext?v=x&lang=en","languageCode":"en","kind":"asr"},{"baseUrl":"/api/timedtext?v=x&lang=en-GB","languageCode":"en-GB"}],"audioTracks":[]}}};</script>"#;

        let tracks = caption_tracks(page).unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=x&lang=de");

        assert_eq!(choose_track(&tracks, "en").unwrap().language_code, "en");
        assert_eq!(choose_track(&tracks, "de").unwrap().language_code, "de");
        assert_eq!(choose_track(&tracks, "fr").unwrap().language_code, "de");
    }

    #[test]
    fn test_caption_tracks_missing() {
        assert!(matches!(caption_tracks("<html></html>"), Err(PagedownError::Captions(_))));
    }

    #[test]
    fn test_parse_classic_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="3.2" dur="1.5">it&amp;#39;s   working</text><text start="0.0" dur="2.0">hello &amp;amp; welcome</text><text start="5" dur="1"></text></transcript>"#;

        let captions = parse_timed_text(xml);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0], Caption { start: 3.2, duration: 1.5, text: "it's working".into() });
        assert_eq!(captions[1].text, "hello & welcome");
    }

    #[test]
    fn test_parse_millisecond_timed_text() {
        let xml = r#"<timedtext format="3"><body><p t="1500" d="2000">Line one</p><p t="0" d="1500">Line zero</p></body></timedtext>"#;

        let captions = parse_timed_text(xml);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].start, 1.5);
        assert_eq!(captions[0].duration, 2.0);
        assert_eq!(render_transcript(&captions).unwrap(), "## Generated Transcription\n\nLine zero\nLine one");
    }

    #[tokio::test]
    async fn test_no_captions_source_fails_softly() {
        assert!(matches!(NoCaptions.captions("dQw4w9WgXcQ").await, Err(PagedownError::Captions(_))));
    }
}
