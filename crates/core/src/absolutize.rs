//! Rewriting relative references to absolute URLs.
//!
//! Runs on the raw page before any extraction so that fragments cut out of
//! the page keep working links and images. Values that do not resolve are
//! left exactly as they were.

use lol_html::{HtmlRewriter, Settings, element};
use url::Url;

/// Resolves `img[src]`, every `href`, and the `og:image` meta tags of `html`
/// against `base_url`.
///
/// Resolution is best-effort: empty or unresolvable values stay untouched,
/// and markup the rewriter cannot stream is returned unchanged. Running the
/// pass twice yields the same markup as running it once.
pub fn absolutize_urls(html: &str, base_url: &Url) -> String {
    let mut output = Vec::new();
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("img[src]", |el| {
                    if let Some(src) = el.get_attribute("src")
                        && let Some(absolute) = resolve(base_url, &src)
                    {
                        el.set_attribute("src", &absolute).ok();
                    }
                    Ok(())
                }),
                element!("[href]", |el| {
                    if let Some(href) = el.get_attribute("href")
                        && let Some(absolute) = resolve(base_url, &href)
                    {
                        el.set_attribute("href", &absolute).ok();
                    }
                    Ok(())
                }),
                element!(r#"meta[property="og:image"]"#, |el| {
                    if let Some(content) = el.get_attribute("content")
                        && let Some(absolute) = resolve(base_url, &content)
                    {
                        el.set_attribute("content", &absolute).ok();
                    }
                    Ok(())
                }),
                element!(r#"meta[property="og:image:secure_url"]"#, |el| {
                    if let Some(content) = el.get_attribute("content")
                        && let Some(absolute) = resolve(base_url, &content)
                    {
                        el.set_attribute("content", &absolute).ok();
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }
    if rewriter.end().is_err() {
        return html.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| html.to_string())
}

/// Joins `value` onto `base`, or `None` when it should be left alone.
///
/// Values that already parse as absolute URLs are kept byte for byte.
fn resolve(base: &Url, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || Url::parse(trimmed).is_ok() {
        return None;
    }
    let absolute = base.join(trimmed).ok()?;
    if absolute.as_str() == value { None } else { Some(absolute.into()) }
}
