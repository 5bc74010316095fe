pub mod absolutize;
pub mod converter;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod fetch;
pub mod markdown;
pub mod metadata;
pub mod parse;
pub mod pdf;
pub mod postprocess;
pub mod readability;
pub mod rewrite;
pub mod scoring;
pub mod video;

pub use absolutize::absolutize_urls;
pub use converter::{
    Converter, ConverterBuilder, ConverterConfig, ConverterConfigBuilder, url_to_markdown, url_to_markdown_with_config,
};
pub use dispatch::{ContentKind, Payload, classify_content_type, dispatch};
pub use error::{PagedownError, Result};
#[doc(hidden)]
pub use extract::{ExtractConfig, ExtractedContent};
pub use extract::extract_content;
pub use fallback::{FallbackExtractor, Summary, choose_description};
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchConfig, FetchedResponse, Fetcher, parse_target};
pub use markdown::{HtmdRenderer, MarkdownRenderer};
pub use metadata::{MetadataParser, OpenGraphParser, SocialMetadata, format_long_date};
pub use parse::{Document, Element, Page};
pub use pdf::{PdfConverter, PdfExtractConverter};
pub use readability::{ReadabilityReport, Route, classify_document, is_probably_readable, route};
pub use rewrite::{
    DEFAULT_MIRROR_HOST, DEFAULT_USER_AGENT, DraftPlan, FetchPlan, RedirectPolicy, RewriteRule, UrlRewriter,
};
#[doc(hidden)]
pub use scoring::{base_tag_score, class_id_weight, link_density};
#[cfg(feature = "fetch")]
pub use video::YoutubeCaptions;
pub use video::{Caption, CaptionSource, NoCaptions, TRANSCRIPT_HEADING, render_transcript, video_id};
