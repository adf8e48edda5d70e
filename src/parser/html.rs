//! HTML `<link>` element extraction.
//!
//! The document goes through a real HTML5 parser, so markup that only looks
//! like a `<link>` inside `<script>`, `<template>` text or comments is never
//! reported.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::error::LinkError;
use super::record::{
    AttrKey, Attributes, LinkRecord, Source, absolute_profiles, expand_rels, resolve_reference,
};

/// Attributes copied from `<link>` onto the record, in this order.
const COPIED_ATTRIBUTES: [AttrKey; 5] = [
    AttrKey::Type,
    AttrKey::Hreflang,
    AttrKey::Title,
    AttrKey::Media,
    AttrKey::Profile,
];

#[allow(clippy::expect_used)]
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel][href]").expect("link selector is valid") // Static selector
});

#[allow(clippy::expect_used)]
static BASE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("base[href]").expect("base selector is valid") // Static selector
});

/// Extracts link records from every `<link rel=... href=...>` in `html`.
///
/// Targets and profiles resolve against the first `<base href>`, itself
/// resolved against `document_url`. Records carry no explicit context; the
/// document URL becomes their context during aggregation.
///
/// # Example
///
/// ```
/// use signposting::parser::parse_html_links;
/// use url::Url;
///
/// let page = Url::parse("https://example.org/record/1").unwrap();
/// let html = r#"<html><head><link rel="cite-as" href="https://doi.org/10.1234/x"></head></html>"#;
/// let records = parse_html_links(html, &page);
/// assert_eq!(records[0].rel, "cite-as");
/// ```
#[tracing::instrument(skip(html), fields(html_len = html.len()))]
#[must_use]
pub fn parse_html_links(html: &str, document_url: &Url) -> Vec<LinkRecord> {
    let document = Html::parse_document(html);
    let base = document_base(&document, document_url);

    let mut records = Vec::new();
    for element in document.select(&LINK_SELECTOR) {
        match records_from_element(element, &base) {
            Ok(found) => records.extend(found),
            Err(e) => debug!(error = %e, "Skipping <link> element"),
        }
    }
    debug!(count = records.len(), base = %base, "HTML link extraction complete");
    records
}

fn document_base(document: &Html, document_url: &Url) -> Url {
    let Some(href) = document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|base| base.value().attr("href"))
    else {
        return document_url.clone();
    };
    match document_url.join(href.trim()) {
        Ok(base) => base,
        Err(e) => {
            debug!(href, error = %e, "Ignoring unusable <base href>");
            document_url.clone()
        }
    }
}

fn records_from_element(element: ElementRef<'_>, base: &Url) -> Result<Vec<LinkRecord>, LinkError> {
    let node = element.value();
    let href = node.attr("href").unwrap_or_default();
    let rel = node.attr("rel").unwrap_or_default();
    let target = resolve_reference(href, Some(base))?;

    let mut attributes = Attributes::new();
    for key in COPIED_ATTRIBUTES {
        let Some(value) = node.attr(key.name()) else {
            continue;
        };
        let value = if key == AttrKey::Profile {
            absolute_profiles(value, Some(base))
        } else {
            value.to_string()
        };
        attributes.insert(key, value);
    }

    expand_rels(&target, rel, None, &attributes, Source::Html)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/record/12").unwrap()
    }

    #[test]
    fn test_html_links_basic() {
        let html = r#"<!DOCTYPE html>
<html><head>
  <link rel="cite-as" href="https://doi.org/10.5281/zenodo.1234">
  <link rel="describedby" href="/record/12/export/json-ld" type="application/ld+json">
  <link rel="stylesheet" href="/static/site.css">
</head><body></body></html>"#;
        let records = parse_html_links(html, &page());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].rel, "cite-as");
        assert_eq!(records[1].target.as_str(), "https://example.com/record/12/export/json-ld");
        assert_eq!(
            records[1].attributes.get(&AttrKey::Type),
            Some("application/ld+json")
        );
        assert!(records.iter().all(|r| r.source == Source::Html));
        assert!(records.iter().all(|r| r.context.is_none()));
    }

    #[test]
    fn test_html_links_multi_rel_expands() {
        let html = r#"<link rel="item  Alternate" href="data.zip" type="application/zip">"#;
        let records = parse_html_links(html, &page());
        let rels: Vec<_> = records.iter().map(|r| r.rel.as_str()).collect();
        assert_eq!(rels, vec!["item", "alternate"]);
        assert_eq!(records[0].target, records[1].target);
    }

    #[test]
    fn test_html_links_base_href() {
        let html = r#"<html><head>
  <base href="https://static.example.net/files/">
  <link rel="item" href="a.csv" profile="profiles/csvw">
</head></html>"#;
        let records = parse_html_links(html, &page());
        assert_eq!(records[0].target.as_str(), "https://static.example.net/files/a.csv");
        assert_eq!(
            records[0].attributes.get(&AttrKey::Profile),
            Some("https://static.example.net/files/profiles/csvw")
        );
    }

    #[test]
    fn test_html_links_relative_base_href() {
        let html = r#"<base href="../other/"><link rel="item" href="x">"#;
        let records = parse_html_links(html, &page());
        assert_eq!(records[0].target.as_str(), "https://example.com/other/x");
    }

    #[test]
    fn test_html_links_ignores_script_and_comments() {
        let html = r#"<html><head>
<script>document.write('<link rel="item" href="/fake">');</script>
<!-- <link rel="license" href="/also-fake"> -->
<link rel="license" href="https://creativecommons.org/licenses/by/4.0/">
</head></html>"#;
        let records = parse_html_links(html, &page());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rel, "license");
    }

    #[test]
    fn test_html_links_skips_incomplete_elements() {
        let html = r#"<link rel="item"><link href="/x"><link rel="" href="/y"><link rel="author" href="https://orcid.org/0000-0002-1825-0097">"#;
        let records = parse_html_links(html, &page());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rel, "author");
    }

    #[test]
    fn test_html_links_in_body_are_found() {
        let html = r#"<html><body><link rel="type" href="https://schema.org/Dataset"></body></html>"#;
        let records = parse_html_links(html, &page());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target.as_str(), "https://schema.org/Dataset");
    }

    #[test]
    fn test_html_links_copies_attributes() {
        let html = r#"<link rel="item" href="/d" hreflang="en" title="Data" media="screen" data-x="ignored">"#;
        let record = &parse_html_links(html, &page())[0];
        assert_eq!(record.attributes.get(&AttrKey::Hreflang), Some("en"));
        assert_eq!(record.attributes.get(&AttrKey::Title), Some("Data"));
        assert_eq!(record.attributes.get(&AttrKey::Media), Some("screen"));
        assert_eq!(record.attributes.len(), 3);
    }
}
