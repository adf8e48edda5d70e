//! What the core needs to know about a fetched resource.
//!
//! These types carry no I/O: the discovery client fills them from HTTP
//! responses, and tests or other HTTP stacks can build them directly.

use url::Url;

use crate::parser::LinksetFormat;
use crate::signposting::Warning;

/// Metadata of one HTTP response relevant to signposting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// Final URL of the response, after redirects; the default context
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Every `Link` header field value, in received order
    pub link_headers: Vec<String>,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Response body; `None` for `HEAD` or `204 No Content`
    pub body: Option<Vec<u8>>,
}

impl ResponseMetadata {
    /// A `200 OK` response with no headers or body.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            status: 200,
            link_headers: Vec::new(),
            content_type: None,
            body: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_link_header(mut self, value: impl Into<String>) -> Self {
        self.link_headers.push(value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body.into());
        self
    }

    /// Warning implied by the status code, if any.
    ///
    /// `410 Gone` and `203 Non-Authoritative Information` still carry usable
    /// signposting, but the caller should know.
    #[must_use]
    pub fn status_warning(&self) -> Option<Warning> {
        match self.status {
            203 => Some(Warning::NonAuthoritative {
                url: self.url.clone(),
            }),
            410 => Some(Warning::ResourceGone {
                url: self.url.clone(),
            }),
            _ => None,
        }
    }

    /// Whether the body should be searched for `<link>` elements.
    #[must_use]
    pub fn has_html_body(&self) -> bool {
        self.status != 204
            && self.body.as_ref().is_some_and(|body| !body.is_empty())
            && self.content_type.as_deref().is_some_and(is_html_content_type)
    }
}

/// A fetched linkset document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinksetDocument {
    /// URL the linkset was retrieved from; base and default context
    pub url: Url,
    /// Serialization of `body`
    pub format: LinksetFormat,
    /// Raw document bytes
    pub body: Vec<u8>,
}

impl LinksetDocument {
    #[must_use]
    pub fn new(url: Url, format: LinksetFormat, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url,
            format,
            body: body.into(),
        }
    }
}

/// Whether a `Content-Type` value denotes an HTML or XML page.
///
/// Accepts `text/html`, `application/xhtml+xml`, `application/xml` and any
/// `+xml` structured suffix; parameters are ignored.
#[must_use]
pub fn is_html_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        essence.as_str(),
        "text/html" | "application/xhtml+xml" | "application/xml"
    ) || essence.ends_with("+xml")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.org/record/1").unwrap()
    }

    #[test]
    fn test_status_warning() {
        assert!(matches!(
            ResponseMetadata::new(url()).with_status(410).status_warning(),
            Some(Warning::ResourceGone { .. })
        ));
        assert!(matches!(
            ResponseMetadata::new(url()).with_status(203).status_warning(),
            Some(Warning::NonAuthoritative { .. })
        ));
        assert!(ResponseMetadata::new(url()).status_warning().is_none());
        assert!(
            ResponseMetadata::new(url())
                .with_status(204)
                .status_warning()
                .is_none()
        );
    }

    #[test]
    fn test_is_html_content_type() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=UTF-8"));
        assert!(is_html_content_type("Application/XHTML+XML"));
        assert!(is_html_content_type("application/xml"));
        assert!(is_html_content_type("image/svg+xml"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("text/plain"));
    }

    #[test]
    fn test_has_html_body() {
        let html = ResponseMetadata::new(url()).with_body("text/html", "<html></html>");
        assert!(html.has_html_body());
        assert!(!html.clone().with_status(204).has_html_body());
        let json = ResponseMetadata::new(url()).with_body("application/json", "{}");
        assert!(!json.has_html_body());
        assert!(!ResponseMetadata::new(url()).has_html_body());
    }
}
