//! Choosing the extraction path from a fetched response.
//!
//! This is the last point where a conversion may fail: an error status, a
//! missing or unsupported content type, or an undecodable HTML body all end
//! the invocation here.

use tracing::debug;
use url::Url;

use crate::fetch::FetchedResponse;
use crate::{PagedownError, Result};

/// The two supported content families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Html,
}

/// A response body ready for its extraction path.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw PDF bytes, handed unchanged to the PDF converter.
    Pdf(Vec<u8>),
    /// Decoded HTML and the URL relative references resolve against.
    Html { markup: String, base_url: Url },
}

/// Maps a declared `Content-Type` onto a [`ContentKind`].
///
/// Parameters such as `charset` are ignored, as is case.
pub fn classify_content_type(declared: Option<&str>) -> Result<ContentKind> {
    let Some(declared) = declared else {
        return Err(PagedownError::UnsupportedContentType("<none>".to_string()));
    };

    let essence = declared.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        "application/pdf" => Ok(ContentKind::Pdf),
        "text/html" => Ok(ContentKind::Html),
        _ => Err(PagedownError::UnsupportedContentType(declared.trim().to_string())),
    }
}

/// Validates `response` and selects its extraction path.
///
/// `destination` is the URL the request was planned for and is reported in
/// upstream errors.
pub fn dispatch(response: FetchedResponse, destination: &Url) -> Result<Payload> {
    if response.status >= 400 {
        return Err(PagedownError::Upstream { status: response.status, url: destination.to_string() });
    }

    let kind = classify_content_type(response.content_type())?;
    debug!(status = response.status, ?kind, bytes = response.body.len(), "dispatching response");

    match kind {
        ContentKind::Pdf => Ok(Payload::Pdf(response.body)),
        ContentKind::Html => {
            let markup = String::from_utf8(response.body).map_err(|e| PagedownError::Decode(e.to_string()))?;
            Ok(Payload::Html { markup, base_url: response.url })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_classify_content_type() {
        assert_eq!(classify_content_type(Some("text/html")).unwrap(), ContentKind::Html);
        assert_eq!(
            classify_content_type(Some("Text/HTML; charset=UTF-8")).unwrap(),
            ContentKind::Html
        );
        assert_eq!(classify_content_type(Some("application/pdf")).unwrap(), ContentKind::Pdf);
    }

    #[test]
    fn test_classify_rejects_other_types() {
        let err = classify_content_type(Some("application/xml")).unwrap_err();
        assert!(matches!(err, PagedownError::UnsupportedContentType(ref t) if t == "application/xml"));

        let err = classify_content_type(None).unwrap_err();
        assert!(matches!(err, PagedownError::UnsupportedContentType(_)));
    }

    #[test]
    fn test_error_status_wins_over_content_type() {
        let response = FetchedResponse::new(url(), 404).with_header("Content-Type", "text/html");
        let err = dispatch(response, &url()).unwrap_err();
        assert!(matches!(err, PagedownError::Upstream { status: 404, ref url } if url == "https://example.com/page"));
    }

    #[test]
    fn test_redirect_response_is_dispatched() {
        let response = FetchedResponse::new(url(), 302)
            .with_header("content-type", "text/html")
            .with_body("<html><head><title>Mirror</title></head></html>");

        assert!(matches!(dispatch(response, &url()), Ok(Payload::Html { .. })));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let response = FetchedResponse::new(url(), 200)
            .with_header("Content-Type", "text/html")
            .with_body(vec![0x3c, 0x70, 0x3e, 0xff, 0xfe]);

        assert!(matches!(dispatch(response, &url()), Err(PagedownError::Decode(_))));
    }

    #[test]
    fn test_pdf_bytes_pass_through() {
        let response = FetchedResponse::new(url(), 200)
            .with_header("Content-Type", "application/pdf")
            .with_body(b"%PDF-1.7".to_vec());

        match dispatch(response, &url()).unwrap() {
            Payload::Pdf(bytes) => assert_eq!(bytes, b"%PDF-1.7"),
            other => panic!("expected pdf payload, got {other:?}"),
        }
    }
}
