//! Link extraction from the three places signposting can live.
//!
//! Each parser is a pure function from document text (plus a base URI) to
//! [`LinkRecord`]s tagged with their [`Source`]:
//!
//! - HTTP `Link` header values (RFC 8288)
//! - RFC 9264 linkset documents, text and JSON
//! - HTML `<link>` elements
//!
//! Malformed entries are skipped and reported as [`LinkError`]; only a
//! linkset document as a whole can fail, with [`LinksetError`].
//!
//! # Example
//!
//! ```
//! use signposting::parser::{parse_link_header, Source};
//! use url::Url;
//!
//! let base = Url::parse("https://example.org/record/1").unwrap();
//! let result = parse_link_header(
//!     r#"<https://doi.org/10.1234/x>; rel="cite-as", <meta.ttl>; rel=describedby; type="text/turtle""#,
//!     Some(&base),
//! );
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.links[1].target.as_str(), "https://example.org/record/meta.ttl");
//! assert_eq!(result.links[1].source, Source::Header);
//! ```

mod error;
mod html;
mod link_header;
mod linkset;
mod record;

pub use error::{LinkError, LinksetError, MAX_ENTRY_PREVIEW};
pub use html::parse_html_links;
pub use link_header::{
    LinkParseResult, RawLink, parse_link_header, parse_link_headers, split_link_values,
};
pub use linkset::{LinksetFormat, parse_linkset, parse_linkset_json, parse_linkset_text};
pub use record::{AttrKey, Attributes, LinkRecord, Source};
