//! Conversion entry point.
//!
//! A [`Converter`] owns the configuration and one instance of every
//! collaborator, and runs a single URL through the pipeline per call:
//! rewrite, fetch, dispatch, then either the PDF converter or the HTML
//! path (absolutize, classify, article extraction or fallback summary).
//!
//! # Example
//!
//! ```rust,no_run
//! use pagedown_core::{Converter, ConverterConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> pagedown_core::Result<()> {
//! let config = ConverterConfig::builder().caption_language("de").include_title_heading(true).build();
//! let converter = Converter::with_config(config)?;
//!
//! let markdown = converter.convert("https://example.com/article").await?;
//! println!("{markdown}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};
use url::Url;

use crate::dispatch::{Payload, dispatch};
use crate::extract::{ExtractConfig, extract_content};
use crate::fallback::FallbackExtractor;
use crate::fetch::{Fetcher, parse_target};
use crate::markdown::{HtmdRenderer, MarkdownRenderer};
use crate::metadata::{MetadataParser, OpenGraphParser};
use crate::parse::Page;
use crate::pdf::{PdfConverter, PdfExtractConverter};
use crate::readability::{Route, route};
use crate::rewrite::{DEFAULT_MIRROR_HOST, DEFAULT_USER_AGENT, RewriteRule, UrlRewriter};
use crate::video::CaptionSource;
use crate::{PagedownError, Result};

/// Configuration for a [`Converter`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pagedown_core::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .request_timeout(10)
///     .metadata_timeout(Duration::from_secs(2))
///     .mirror_host("vxtwitter.com")
///     .build();
/// assert_eq!(config.request_timeout, 10);
/// ```
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// User agent sent with every request.
    pub user_agent: String,

    /// Host Twitter/X URLs are rewritten to (default: `fxtwitter.com`).
    pub mirror_host: String,

    /// HTTP request timeout in seconds (default: 30).
    pub request_timeout: u64,

    /// Upper bound for metadata parsing (default: 5 s).
    pub metadata_timeout: Duration,

    /// Upper bound for fetching captions (default: 15 s).
    pub caption_timeout: Duration,

    /// Preferred caption language (default: `en`).
    pub caption_language: String,

    /// Maximum redirects followed for ordinary URLs (default: 10).
    pub max_redirects: usize,

    /// Whether article output starts with `# <title>` (default: false).
    pub include_title_heading: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mirror_host: DEFAULT_MIRROR_HOST.to_string(),
            request_timeout: 30,
            metadata_timeout: Duration::from_secs(5),
            caption_timeout: Duration::from_secs(15),
            caption_language: "en".to_string(),
            max_redirects: 10,
            include_title_heading: false,
        }
    }
}

impl ConverterConfig {
    /// Creates a new builder for ConverterConfig.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::new()
    }

    fn validate(&self) -> Result<()> {
        let mirror = Url::parse(&format!("https://{}/", self.mirror_host))
            .map_err(|e| PagedownError::ConfigError(format!("invalid mirror host `{}`: {e}", self.mirror_host)))?;
        if self.mirror_host.is_empty() || mirror.host_str() != Some(self.mirror_host.to_ascii_lowercase().as_str()) {
            return Err(PagedownError::ConfigError(format!("invalid mirror host `{}`", self.mirror_host)));
        }

        if self.user_agent.trim().is_empty() || self.user_agent.chars().any(|c| c.is_control()) {
            return Err(PagedownError::ConfigError("user agent must be non-empty printable text".to_string()));
        }

        Ok(())
    }
}

/// Builder for ConverterConfig.
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ConverterConfig::default() }
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    /// Sets the Twitter/X mirror host.
    pub fn mirror_host(mut self, value: impl Into<String>) -> Self {
        self.config.mirror_host = value.into();
        self
    }

    /// Sets the HTTP request timeout in seconds.
    pub fn request_timeout(mut self, value: u64) -> Self {
        self.config.request_timeout = value;
        self
    }

    /// Sets the metadata parsing timeout.
    pub fn metadata_timeout(mut self, value: Duration) -> Self {
        self.config.metadata_timeout = value;
        self
    }

    /// Sets the caption fetch timeout.
    pub fn caption_timeout(mut self, value: Duration) -> Self {
        self.config.caption_timeout = value;
        self
    }

    /// Sets the preferred caption language.
    pub fn caption_language(mut self, value: impl Into<String>) -> Self {
        self.config.caption_language = value.into();
        self
    }

    /// Sets the maximum number of followed redirects.
    pub fn max_redirects(mut self, value: usize) -> Self {
        self.config.max_redirects = value;
        self
    }

    /// Sets whether article output starts with the page title.
    pub fn include_title_heading(mut self, value: bool) -> Self {
        self.config.include_title_heading = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ConverterConfig {
        self.config
    }
}

impl Default for ConverterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns URLs into Markdown.
///
/// Holds only immutable configuration and shared collaborators, so one
/// converter can serve many concurrent conversions.
pub struct Converter {
    config: ConverterConfig,
    rewriter: UrlRewriter,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn MarkdownRenderer>,
    pdf: Arc<dyn PdfConverter>,
    metadata: Arc<dyn MetadataParser>,
    captions: Arc<dyn CaptionSource>,
}

impl Converter {
    /// Creates a converter with default configuration and collaborators.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Creates a converter with default collaborators.
    pub fn with_config(config: ConverterConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::default()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn rewriter(&self) -> &UrlRewriter {
        &self.rewriter
    }

    /// Converts `url` to Markdown.
    ///
    /// # Errors
    ///
    /// [`PagedownError::InvalidUrl`] if `url` is not an absolute http(s)
    /// URL, otherwise see [`Converter::convert_url`].
    pub async fn convert(&self, url: &str) -> Result<String> {
        let target = parse_target(url)?;
        self.convert_url(&target).await
    }

    /// Converts an already parsed URL to Markdown.
    ///
    /// # Errors
    ///
    /// Transport, timeout, upstream status, unsupported content type and
    /// decoding failures end the conversion, as do errors of the PDF
    /// converter and of the renderer on the article path. Metadata and
    /// caption failures only degrade the output.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn convert_url(&self, url: &Url) -> Result<String> {
        let plan = self.rewriter.plan(url);
        debug!(destination = %plan.destination(), redirect = ?plan.redirect(), "fetch plan ready");

        let response = self.fetcher.fetch(&plan).await?;
        debug!(status = response.status, content_type = ?response.content_type(), "fetched");

        match dispatch(response, plan.destination())? {
            Payload::Pdf(bytes) => self.pdf.convert(&bytes),
            Payload::Html { markup, base_url } => self.convert_html(Page::new(markup, base_url), url).await,
        }
    }

    async fn convert_html(&self, mut page: Page, source_url: &Url) -> Result<String> {
        page.absolutize();

        match route(page).0 {
            Route::Article(page) => self.render_article(&page),
            Route::Fallback(page) => Ok(self.fallback().summarize(page, source_url).await),
        }
    }

    fn render_article(&self, page: &Page) -> Result<String> {
        let doc = page.document();
        let Some(extracted) = extract_content(&doc, &ExtractConfig::default()) else {
            warn!("readable page yielded no article content");
            return Ok(String::new());
        };

        let body = self.renderer.render(&extracted.content)?;
        if self.config.include_title_heading
            && let Some(title) = doc.extract_social_title().or_else(|| doc.title())
        {
            let heading = format!("# {title}");
            // Articles often repeat their title as the first heading.
            if body.lines().next() != Some(heading.as_str()) {
                return Ok(format!("{heading}\n\n{body}"));
            }
        }
        Ok(body)
    }

    fn fallback(&self) -> FallbackExtractor<'_> {
        FallbackExtractor {
            metadata: self.metadata.as_ref(),
            renderer: self.renderer.as_ref(),
            captions: self.captions.as_ref(),
            metadata_timeout: self.config.metadata_timeout,
            caption_timeout: self.config.caption_timeout,
        }
    }
}

/// Builder for [`Converter`].
///
/// Any collaborator left unset gets its default implementation.
#[derive(Default)]
pub struct ConverterBuilder {
    config: ConverterConfig,
    rules: Vec<RewriteRule>,
    fetcher: Option<Arc<dyn Fetcher>>,
    renderer: Option<Arc<dyn MarkdownRenderer>>,
    pdf: Option<Arc<dyn PdfConverter>>,
    metadata: Option<Arc<dyn MetadataParser>>,
    captions: Option<Arc<dyn CaptionSource>>,
}

impl ConverterBuilder {
    pub fn config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a URL rewrite rule after the built-in ones.
    pub fn rewrite_rule(mut self, rule: RewriteRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn renderer(mut self, renderer: impl MarkdownRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn pdf_converter(mut self, pdf: impl PdfConverter + 'static) -> Self {
        self.pdf = Some(Arc::new(pdf));
        self
    }

    pub fn metadata_parser(mut self, metadata: impl MetadataParser + 'static) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    pub fn caption_source(mut self, captions: impl CaptionSource + 'static) -> Self {
        self.captions = Some(Arc::new(captions));
        self
    }

    /// Builds the converter.
    ///
    /// # Errors
    ///
    /// [`PagedownError::ConfigError`] for an invalid mirror host or user
    /// agent, or when no fetcher was given and the `fetch` feature is off.
    pub fn build(self) -> Result<Converter> {
        let config = self.config;
        config.validate()?;

        let rewriter = self
            .rules
            .into_iter()
            .fold(UrlRewriter::with_defaults(config.user_agent.clone(), &config.mirror_host), UrlRewriter::with_rule);

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => defaults::fetcher(&config)?,
        };
        let captions = match self.captions {
            Some(captions) => captions,
            None => defaults::captions(&config)?,
        };

        Ok(Converter {
            rewriter,
            fetcher,
            captions,
            renderer: self.renderer.unwrap_or_else(|| Arc::new(HtmdRenderer)),
            pdf: self.pdf.unwrap_or_else(|| Arc::new(PdfExtractConverter)),
            metadata: self.metadata.unwrap_or_else(|| Arc::new(OpenGraphParser)),
            config,
        })
    }
}

#[cfg(feature = "fetch")]
mod defaults {
    use std::sync::Arc;

    use super::ConverterConfig;
    use crate::Result;
    use crate::fetch::{FetchConfig, Fetcher, HttpFetcher};
    use crate::video::{CaptionSource, YoutubeCaptions};

    pub(super) fn fetcher(config: &ConverterConfig) -> Result<Arc<dyn Fetcher>> {
        let fetch_config = FetchConfig { timeout: config.request_timeout, max_redirects: config.max_redirects };
        Ok(Arc::new(HttpFetcher::new(fetch_config)?))
    }

    pub(super) fn captions(config: &ConverterConfig) -> Result<Arc<dyn CaptionSource>> {
        Ok(Arc::new(YoutubeCaptions::new(
            config.caption_language.clone(),
            &config.user_agent,
            config.caption_timeout,
        )?))
    }
}

#[cfg(not(feature = "fetch"))]
mod defaults {
    use std::sync::Arc;

    use super::ConverterConfig;
    use crate::fetch::Fetcher;
    use crate::video::{CaptionSource, NoCaptions};
    use crate::{PagedownError, Result};

    pub(super) fn fetcher(_config: &ConverterConfig) -> Result<Arc<dyn Fetcher>> {
        Err(PagedownError::ConfigError(
            "no fetcher configured and the `fetch` feature is disabled".to_string(),
        ))
    }

    pub(super) fn captions(_config: &ConverterConfig) -> Result<Arc<dyn CaptionSource>> {
        Ok(Arc::new(NoCaptions))
    }
}

/// Converts `url` with the default configuration.
///
/// # Example
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> pagedown_core::Result<()> {
/// let markdown = pagedown_core::url_to_markdown("https://example.com/article").await?;
/// # Ok(())
/// # }
/// ```
pub async fn url_to_markdown(url: &str) -> Result<String> {
    Converter::new()?.convert(url).await
}

/// Converts `url` with a custom configuration.
pub async fn url_to_markdown_with_config(url: &str, config: ConverterConfig) -> Result<String> {
    Converter::with_config(config)?.convert(url).await
}
