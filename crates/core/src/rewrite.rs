//! Turning a target URL into a [`FetchPlan`].
//!
//! Host-specific behaviour lives in an ordered table of [`RewriteRule`]s.
//! Rules are evaluated in order and the first rule whose predicate matches
//! transforms the plan; a URL no rule matches is fetched as-is with
//! redirects followed.
//!
//! # Example
//!
//! ```rust
//! use pagedown_core::rewrite::{RedirectPolicy, UrlRewriter};
//! use url::Url;
//!
//! let rewriter = UrlRewriter::with_defaults("pagedown-test/1.0", "fxtwitter.com");
//! let plan = rewriter.plan(&Url::parse("https://x.com/rustlang/status/1").unwrap());
//!
//! assert_eq!(plan.destination().host_str(), Some("fxtwitter.com"));
//! assert_eq!(plan.redirect(), RedirectPolicy::Manual);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};
use url::Url;

/// User agent sent with every request unless configured otherwise.
///
/// Link-preview crawlers get server-rendered markup with complete social
/// metadata from most hosts, including the Twitter mirror.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Discordbot/2.0; +https://discordapp.com)";

/// Mirror that serves crawler-renderable HTML for Twitter/X posts.
pub const DEFAULT_MIRROR_HOST: &str = "fxtwitter.com";

/// Hosts whose pages are only rendered client-side.
const TWITTER_DOMAINS: &[&str] = &["twitter.com", "x.com"];

/// How the fetcher should treat 3xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Follow redirects to the final response.
    Follow,
    /// Return the redirect response itself.
    Manual,
}

/// An immutable description of a single request.
///
/// Produced by [`UrlRewriter::plan`] and consumed by a
/// [`Fetcher`](crate::fetch::Fetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    destination: Url,
    redirect: RedirectPolicy,
    headers: BTreeMap<String, String>,
}

impl FetchPlan {
    /// The URL that will actually be requested.
    pub fn destination(&self) -> &Url {
        &self.destination
    }

    pub fn redirect(&self) -> RedirectPolicy {
        self.redirect
    }

    /// Request headers, keyed by their canonical name.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The mutable form of a plan handed to rule transforms.
#[derive(Debug, Clone)]
pub struct DraftPlan {
    pub url: Url,
    pub redirect: RedirectPolicy,
    pub headers: BTreeMap<String, String>,
}

impl DraftPlan {
    fn finish(self) -> FetchPlan {
        FetchPlan { destination: self.url, redirect: self.redirect, headers: self.headers }
    }
}

type Predicate = Box<dyn Fn(&Url) -> bool + Send + Sync>;
type Transform = Box<dyn Fn(&mut DraftPlan) + Send + Sync>;

/// One (predicate, transform) entry of the rewrite table.
pub struct RewriteRule {
    name: String,
    predicate: Predicate,
    transform: Transform,
}

impl RewriteRule {
    /// Creates a rule from a predicate over the requested URL and a transform
    /// over the draft plan.
    pub fn new(
        name: impl Into<String>, predicate: impl Fn(&Url) -> bool + Send + Sync + 'static,
        transform: impl Fn(&mut DraftPlan) + Send + Sync + 'static,
    ) -> Self {
        Self { name: name.into(), predicate: Box::new(predicate), transform: Box::new(transform) }
    }

    /// A rule that moves requests for `domains` (and their subdomains) to
    /// `mirror_host` and stops redirects from being followed.
    ///
    /// Mirrors answer regular clients with a redirect back to the origin, so
    /// the redirect response itself carries the rendered HTML.
    pub fn mirror(name: impl Into<String>, domains: &[&str], mirror_host: &str) -> Self {
        let domains: Vec<String> = domains.iter().map(|d| d.to_ascii_lowercase()).collect();
        let mirror_host = mirror_host.to_string();

        Self::new(
            name,
            move |url| url.host_str().is_some_and(|host| domains.iter().any(|d| host_matches(host, d))),
            move |draft| {
                if draft.url.set_host(Some(&mirror_host)).is_err() {
                    warn!(mirror = %mirror_host, "mirror host rejected, keeping original host");
                    return;
                }
                draft.redirect = RedirectPolicy::Manual;
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this rule applies to `url`.
    pub fn matches(&self, url: &Url) -> bool {
        (self.predicate)(url)
    }
}

impl fmt::Debug for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteRule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Ordered rewrite table plus the headers every request carries.
#[derive(Debug)]
pub struct UrlRewriter {
    user_agent: String,
    rules: Vec<RewriteRule>,
}

impl UrlRewriter {
    /// Creates a rewriter with no host rules.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self { user_agent: user_agent.into(), rules: Vec::new() }
    }

    /// Creates a rewriter with the built-in rules: Twitter/X to `mirror_host`.
    pub fn with_defaults(user_agent: impl Into<String>, mirror_host: &str) -> Self {
        Self::new(user_agent).with_rule(RewriteRule::mirror("twitter-mirror", TWITTER_DOMAINS, mirror_host))
    }

    /// Appends a rule. Rules added later only see URLs no earlier rule matched.
    pub fn with_rule(mut self, rule: RewriteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(RewriteRule::name)
    }

    /// Builds the fetch plan for `url`.
    pub fn plan(&self, url: &Url) -> FetchPlan {
        let mut draft = DraftPlan { url: url.clone(), redirect: RedirectPolicy::Follow, headers: self.base_headers() };

        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(url)) {
            debug!(rule = rule.name(), url = %url, "applying rewrite rule");
            (rule.transform)(&mut draft);
        }

        draft.finish()
    }

    fn base_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("User-Agent".to_string(), self.user_agent.clone()),
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
        ])
    }
}

impl Default for UrlRewriter {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_USER_AGENT, DEFAULT_MIRROR_HOST)
    }
}

/// Whether `host` is `domain` or one of its subdomains, ignoring case.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain || host.strip_suffix(&domain).is_some_and(|prefix| prefix.ends_with('.'))
}
