//! CLI output formatting for discovered signposting.

use std::fmt::Write as _;

use anyhow::Result;
use signposting::{LinkRel, Signpost, Signposting, SignpostingSet};

/// Section label used in text output.
fn section_label(rel: LinkRel) -> &'static str {
    match rel {
        LinkRel::CiteAs => "CiteAs",
        LinkRel::Type => "Type",
        LinkRel::Collection => "Collection",
        LinkRel::License => "License",
        LinkRel::Author => "Author",
        LinkRel::DescribedBy => "DescribedBy",
        LinkRel::Item => "Item",
        LinkRel::Linkset => "Linkset",
    }
}

/// Whether the media type is worth printing next to the target.
fn shows_media_type(rel: LinkRel) -> bool {
    matches!(rel, LinkRel::DescribedBy | LinkRel::Item | LinkRel::Linkset)
}

fn format_target(signpost: &Signpost) -> String {
    let mut line = format!("<{}>", signpost.target());
    if shows_media_type(signpost.rel())
        && let Some(media_type) = signpost.media_type()
    {
        let _ = write!(line, " {media_type}");
    }
    line
}

/// `Header: first` with later lines aligned under the first value.
fn multiline(header: &str, lines: &[String]) -> String {
    let indent = format!("\n{}", " ".repeat(header.len() + 2));
    format!("{header}: {}", lines.join(&indent))
}

/// Renders one context as text, one section per populated relation.
#[must_use]
pub fn format_signposting(signposting: &Signposting) -> String {
    let mut out = format!("Signposting for {}", signposting.context());
    for rel in LinkRel::ALL {
        let lines: Vec<String> = signposting
            .for_rel(rel)
            .into_iter()
            .map(format_target)
            .collect();
        if !lines.is_empty() {
            out.push('\n');
            out.push_str(&multiline(section_label(rel), &lines));
        }
    }
    out
}

/// Renders a discovery result as text: the primary context first, then every
/// other described context separated by blank lines.
#[must_use]
pub fn format_text(set: &SignpostingSet) -> String {
    let mut out = format_signposting(set.primary());
    if set.is_empty() {
        out.push_str("\n(no signposting found)");
    }
    for other in set.other_contexts() {
        out.push_str("\n\n");
        out.push_str(&format_signposting(other));
    }
    out
}

/// Renders a discovery result as pretty JSON.
pub fn format_json(set: &SignpostingSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(set)?)
}

/// Warning lines for stderr.
#[must_use]
pub fn warning_lines(set: &SignpostingSet) -> Vec<String> {
    set.all_warnings()
        .map(|warning| format!("warning: {warning}"))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use signposting::find_signposting_http_link;
    use url::Url;

    use super::*;

    fn sample() -> SignpostingSet {
        let landing = Url::parse("https://example.org/record/1").unwrap();
        find_signposting_http_link(
            &[concat!(
                r#"<https://doi.org/10.5281/zenodo.1234>; rel="cite-as", "#,
                r#"<https://orcid.org/0000-0002-1825-0097>; rel=author, "#,
                r#"<https://orcid.org/0000-0001-5109-3700>; rel=author, "#,
                r#"<https://example.org/record/1/meta.jsonld>; rel=describedby; type="application/ld+json", "#,
                r#"<https://example.org/record/1/data.csv>; rel=item; type="text/csv""#,
            )],
            &landing,
        )
    }

    #[test]
    fn test_format_text_sections_in_order() {
        let text = format_text(&sample());
        let expected = "Signposting for https://example.org/record/1\n\
CiteAs: <https://doi.org/10.5281/zenodo.1234>\n\
Author: <https://orcid.org/0000-0001-5109-3700>\n        <https://orcid.org/0000-0002-1825-0097>\n\
DescribedBy: <https://example.org/record/1/meta.jsonld> application/ld+json\n\
Item: <https://example.org/record/1/data.csv> text/csv";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_format_text_empty_result() {
        let landing = Url::parse("https://example.org/").unwrap();
        let empty = find_signposting_http_link::<&str>(&[], &landing);
        assert!(format_text(&empty).contains("(no signposting found)"));
    }

    #[test]
    fn test_format_text_includes_other_contexts() {
        let landing = Url::parse("https://example.org/").unwrap();
        let set = find_signposting_http_link(
            &[r#"<https://example.org/a.zip>; rel=item; anchor="https://example.org/other""#],
            &landing,
        );
        let text = format_text(&set);
        assert!(text.contains("Signposting for https://example.org/other\nItem: <https://example.org/a.zip>"));
    }

    #[test]
    fn test_format_json_round_trips_as_value() {
        let json = format_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["context_url"], "https://example.org/record/1");
        assert_eq!(
            value["contexts"]["https://example.org/record/1"]["cite_as"]["target"],
            "https://doi.org/10.5281/zenodo.1234"
        );
    }

    #[test]
    fn test_multiline_alignment() {
        let lines = vec!["<a>".to_string(), "<b>".to_string()];
        assert_eq!(multiline("Type", &lines), "Type: <a>\n      <b>");
    }
}
