//! Social metadata (Open Graph, Twitter cards, JSON-LD) for the fallback
//! summary.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::Result;
use crate::parse::Document;

/// Title, description, publication date and preview image of a page.
///
/// Every field is optional and a record with nothing in it is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Publication date exactly as the page states it.
    pub published_date: Option<String>,
    pub image: Option<String>,
}

impl SocialMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.published_date.is_none() && self.image.is_none()
    }
}

/// Parses [`SocialMetadata`] out of full page markup.
///
/// A page without metadata is `Ok(SocialMetadata::default())`, not an error.
/// Callers bound the call with their own timeout.
#[async_trait]
pub trait MetadataParser: Send + Sync {
    async fn parse(&self, markup: &str) -> Result<SocialMetadata>;
}

/// Default [`MetadataParser`], reading `<meta>` tags and JSON-LD.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGraphParser;

#[async_trait]
impl MetadataParser for OpenGraphParser {
    async fn parse(&self, markup: &str) -> Result<SocialMetadata> {
        Ok(Document::parse(markup).extract_social_metadata())
    }
}

impl Document {
    /// Extract title with priority fallback:
    /// 1. Open Graph `og:title`
    /// 2. Twitter `twitter:title`
    ///
    /// `<title>` is not read here. The fallback path uses it as a last resort.
    pub fn extract_social_title(&self) -> Option<String> {
        self.get_meta_content("og:title").or_else(|| self.get_meta_content("twitter:title"))
    }

    /// Extract description with priority fallback:
    /// 1. Open Graph `og:description`
    /// 2. Twitter `twitter:description`
    /// 3. Meta `description`
    pub fn extract_description(&self) -> Option<String> {
        self.get_meta_content("og:description")
            .or_else(|| self.get_meta_content("twitter:description"))
            .or_else(|| self.get_meta_content("description"))
    }

    /// Extract publication date with priority fallback:
    /// 1. Meta `article:published_time`
    /// 2. Meta `og:published_time`
    /// 3. JSON-LD `datePublished`
    /// 4. `<time datetime="">` element
    /// 5. Meta `date`
    pub fn extract_published_date(&self) -> Option<String> {
        if let Some(date) = self.get_meta_content("article:published_time") {
            return Some(date);
        }
        if let Some(date) = self.get_meta_content("og:published_time") {
            return Some(date);
        }
        if let Some(date) = self.find_json_ld_str("datePublished") {
            return Some(date);
        }

        if let Ok(Some(element)) = self.select_first("time[datetime]")
            && let Some(datetime) = non_empty(element.attr("datetime"))
        {
            return Some(datetime);
        }

        self.get_meta_content("date")
    }

    /// Extract preview image with priority fallback:
    /// 1. Open Graph `og:image:secure_url`
    /// 2. Open Graph `og:image`
    /// 3. Twitter `twitter:image`
    pub fn extract_image(&self) -> Option<String> {
        self.get_meta_content("og:image:secure_url")
            .or_else(|| self.get_meta_content("og:image"))
            .or_else(|| self.get_meta_content("twitter:image"))
    }

    /// Extract all social metadata at once
    pub fn extract_social_metadata(&self) -> SocialMetadata {
        SocialMetadata {
            title: self.extract_social_title(),
            description: self.extract_description(),
            published_date: self.extract_published_date(),
            image: self.extract_image(),
        }
    }

    /// Get meta tag content by name or property attribute, skipping empty values
    fn get_meta_content(&self, attr: &str) -> Option<String> {
        for key in ["name", "property"] {
            let selector = format!("meta[{key}=\"{attr}\"]");
            if let Ok(elements) = self.select(&selector)
                && let Some(content) = elements.iter().find_map(|el| non_empty(el.attr("content")))
            {
                return Some(content);
            }
        }

        None
    }

    /// First non-empty string stored under `key` in any JSON-LD block
    ///
    /// Top-level arrays and `@graph` containers are searched too.
    fn find_json_ld_str(&self, key: &str) -> Option<String> {
        self.select(r#"script[type="application/ld+json"]"#)
            .ok()?
            .iter()
            .filter_map(|el| serde_json::from_str::<Value>(el.text().trim()).ok())
            .find_map(|value| find_in_json_ld(&value, key))
    }
}

fn find_in_json_ld(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(|item| find_in_json_ld(item, key)),
        Value::Object(map) => {
            if let Some(found) = map.get(key).and_then(Value::as_str).and_then(|s| non_empty(Some(s))) {
                return Some(found);
            }
            map.get("@graph").and_then(|graph| find_in_json_ld(graph, key))
        }
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

const LONG_DATE: &[BorrowedFormatItem<'_>] = format_description!("[month repr:long] [day padding:none], [year]");
const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Formats a stated publication date as `March 5, 2024`.
///
/// Accepts RFC 3339 timestamps (converted to UTC), RFC 2822 dates and
/// anything starting with a plain `YYYY-MM-DD` date. Returns `None` for
/// anything else.
pub fn format_long_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let date = if let Ok(datetime) = OffsetDateTime::parse(raw, &Rfc3339) {
        datetime.to_offset(UtcOffset::UTC).date()
    } else if let Ok(datetime) = OffsetDateTime::parse(raw, &Rfc2822) {
        datetime.to_offset(UtcOffset::UTC).date()
    } else {
        Date::parse(raw.get(..10)?, ISO_DATE).ok()?
    };

    date.format(LONG_DATE).ok()
}
