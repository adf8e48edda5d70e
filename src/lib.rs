//! FAIR Signposting discovery and aggregation.
//!
//! Signposting exposes typed links (persistent identifier, metadata records,
//! downloadable items, license, authors, semantic types, collections and
//! linksets) for a scholarly web resource. This library finds those links in
//! HTTP `Link` headers, HTML `<link>` elements and RFC 9264 linksets, and
//! folds them into one queryable [`SignpostingSet`] grouped by context.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - `Link` header, linkset and HTML parsers producing source-tagged records
//! - [`aggregate`] - context resolution, classification and cardinality enforcement
//! - [`signpost`] - the typed [`Signpost`] link and its relation/media type types
//! - [`signposting`] - per-context [`Signposting`] and the [`SignpostingSet`] result
//! - [`response`] - I/O-free description of fetched responses and linksets
//! - [`discovery`] - async HTTP client running discovery against live URLs
//!
//! Everything except [`discovery`] is synchronous and performs no I/O.
//!
//! # Example
//!
//! ```
//! use signposting::{LinkRel, find_signposting_http_link};
//! use url::Url;
//!
//! let landing = Url::parse("https://example.org/record/1").unwrap();
//! let set = find_signposting_http_link(
//!     &[r#"<https://doi.org/10.5281/zenodo.1234>; rel="cite-as", <meta.jsonld>; rel="describedby"; type="application/ld+json""#],
//!     &landing,
//! );
//! let primary = set.primary();
//! assert_eq!(primary.cite_as().unwrap().target().as_str(), "https://doi.org/10.5281/zenodo.1234");
//! assert_eq!(primary.for_rel(LinkRel::DescribedBy).len(), 1);
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod discovery;
pub mod parser;
pub mod response;
pub mod signpost;
pub mod signposting;
mod user_agent;

// Re-export commonly used types
pub use aggregate::{
    Aggregator, find_signposting_html_links, find_signposting_http_link,
    find_signposting_linkset_document,
};
pub use discovery::{DiscoveryConfig, DiscoveryError, SignpostingClient};
pub use parser::{LinkError, LinkRecord, LinksetError, LinksetFormat, Source};
pub use response::{LinksetDocument, ResponseMetadata};
pub use signpost::{Cardinality, LinkRel, MediaType, Signpost, SignpostError};
pub use signposting::{Signposting, SignpostingSet, Warning};
pub use user_agent::default_user_agent;
