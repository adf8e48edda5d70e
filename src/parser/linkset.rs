//! RFC 9264 linkset documents.
//!
//! Two serializations share one output contract:
//! - `application/linkset`: `Link` header syntax, possibly spread over lines
//! - `application/linkset+json`: either the RFC 9264 `{"linkset": [...]}`
//!   shape or a map keyed directly by context URI
//!
//! Every record produced here carries an explicit context: the link's anchor,
//! or the linkset document's own URL when no anchor is given.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use super::error::{LinkError, LinksetError};
use super::link_header::{LinkParseResult, resolve_raw_link, split_link_values};
use super::record::{AttrKey, Attributes, LinkRecord, Source, absolute_profiles, resolve_reference};

/// Linkset serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinksetFormat {
    /// `application/linkset+json`
    Json,
    /// `application/linkset`
    Text,
}

impl LinksetFormat {
    /// Detects the serialization from a `Content-Type` value.
    ///
    /// Anything mentioning `json` is treated as JSON; `application/linkset`
    /// and `text/plain` as text. Returns `None` otherwise.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("json") {
            Some(Self::Json)
        } else if content_type.contains("application/linkset") || content_type.contains("text/plain")
        {
            Some(Self::Text)
        } else {
            None
        }
    }

    /// The registered media type.
    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Json => "application/linkset+json",
            Self::Text => "application/linkset",
        }
    }
}

impl fmt::Display for LinksetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

/// Parses a linkset body in the given serialization.
///
/// # Errors
///
/// Returns [`LinksetError`] when the document as a whole is unusable:
/// not UTF-8, invalid JSON, wrong JSON structure, or unbalanced quoting in
/// the text form. Individual bad entries are skipped instead.
pub fn parse_linkset(
    body: &[u8],
    format: LinksetFormat,
    linkset_url: &Url,
) -> Result<LinkParseResult, LinksetError> {
    let text = std::str::from_utf8(body).map_err(|e| LinksetError::InvalidEncoding {
        reason: e.to_string(),
    })?;
    let result = match format {
        LinksetFormat::Json => parse_linkset_json(text, linkset_url)?,
        LinksetFormat::Text => parse_linkset_text(text, linkset_url)?,
    };
    info!(
        linkset = %linkset_url,
        %format,
        links = result.len(),
        skipped = result.skipped_count(),
        "Linkset parsed"
    );
    Ok(result)
}

/// Parses an `application/linkset` document.
///
/// Line breaks are folded into whitespace before tokenizing, as RFC 9264
/// permits links to span several lines.
///
/// # Errors
///
/// Returns [`LinksetError::UnbalancedQuote`] if any quoted-string never closes.
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_linkset_text(body: &str, linkset_url: &Url) -> Result<LinkParseResult, LinksetError> {
    let folded = body.replace(['\r', '\n'], " ");
    let mut result = LinkParseResult::new();

    for raw in split_link_values(&folded) {
        let records = match raw {
            Err(LinkError::UnbalancedQuote { entry }) => {
                return Err(LinksetError::UnbalancedQuote { entry });
            }
            Err(e) => Err(e),
            Ok(raw) => resolve_raw_link(&raw, Some(linkset_url), Source::Linkset),
        };
        match records {
            Ok(records) => result
                .links
                .extend(records.into_iter().map(|record| with_default_context(record, linkset_url))),
            Err(e) => {
                debug!(error = %e, "Skipping malformed linkset entry");
                result.skipped.push(e);
            }
        }
    }

    Ok(result)
}

/// Parses an `application/linkset+json` document.
///
/// # Errors
///
/// Returns [`LinksetError::InvalidJson`] for unparsable JSON and
/// [`LinksetError::InvalidStructure`] when the top level is not an object or
/// `linkset` is not an array.
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_linkset_json(body: &str, linkset_url: &Url) -> Result<LinkParseResult, LinksetError> {
    let document: Value =
        serde_json::from_str(body).map_err(|e| LinksetError::invalid_json(e.to_string()))?;
    let Value::Object(top) = document else {
        return Err(LinksetError::invalid_structure(
            "top level must be a JSON object",
        ));
    };

    let mut result = LinkParseResult::new();
    if let Some(linkset) = top.get("linkset") {
        let Value::Array(link_contexts) = linkset else {
            return Err(LinksetError::invalid_structure(
                "top-level 'linkset' must be an array",
            ));
        };
        for link_context in link_contexts {
            let Value::Object(link_context) = link_context else {
                debug!("Ignoring non-object link context");
                continue;
            };
            let anchor = match link_context.get("anchor") {
                None => linkset_url.clone(),
                Some(Value::String(anchor)) => match resolve_reference(anchor, Some(linkset_url)) {
                    Ok(anchor) => anchor,
                    Err(e) => {
                        debug!(error = %e, "Ignoring link context with invalid anchor");
                        result.skipped.push(e);
                        continue;
                    }
                },
                Some(_) => {
                    debug!("Ignoring link context with non-string anchor");
                    continue;
                }
            };
            collect_relations(link_context, &anchor, linkset_url, &mut result);
        }
    } else {
        for (context, relations) in &top {
            let anchor = match resolve_reference(context, Some(linkset_url)) {
                Ok(anchor) => anchor,
                Err(e) => {
                    debug!(error = %e, "Ignoring invalid context key");
                    result.skipped.push(e);
                    continue;
                }
            };
            let Value::Object(relations) = relations else {
                debug!(context = %anchor, "Ignoring context whose value is not an object");
                continue;
            };
            collect_relations(relations, &anchor, linkset_url, &mut result);
        }
    }

    Ok(result)
}

fn with_default_context(mut record: LinkRecord, linkset_url: &Url) -> LinkRecord {
    if record.context.is_none() {
        record.context = Some(linkset_url.clone());
    }
    record
}

fn collect_relations(
    relations: &Map<String, Value>,
    anchor: &Url,
    linkset_url: &Url,
    result: &mut LinkParseResult,
) {
    for (rel, targets) in relations {
        if rel == "anchor" {
            continue;
        }
        let Value::Array(targets) = targets else {
            debug!(rel = %rel, "Not an array, ignoring link targets");
            result
                .skipped
                .push(LinkError::unexpected_content(&format!("{rel}: {targets}")));
            continue;
        };
        for target in targets {
            match record_from_target_object(rel, target, anchor, linkset_url) {
                Ok(record) => result.links.push(record),
                Err(e) => {
                    debug!(rel = %rel, error = %e, "Skipping linkset target object");
                    result.skipped.push(e);
                }
            }
        }
    }
}

fn record_from_target_object(
    rel: &str,
    target: &Value,
    anchor: &Url,
    linkset_url: &Url,
) -> Result<LinkRecord, LinkError> {
    let Some(href) = target.get("href").and_then(Value::as_str) else {
        return Err(LinkError::missing_target(&target.to_string()));
    };
    let target_url = resolve_reference(href, Some(linkset_url))?;
    if rel.trim().is_empty() {
        return Err(LinkError::missing_rel(href));
    }

    let mut attributes = Attributes::new();
    let mut ext_title = None;
    if let Value::Object(members) = target {
        for (name, value) in members {
            match name.as_str() {
                "href" => {}
                "title*" => {
                    if ext_title.is_none() {
                        ext_title = string_values(value).into_iter().next();
                    }
                }
                _ => {
                    let key = AttrKey::from_name(name);
                    for value in string_values(value) {
                        let value = if key == AttrKey::Profile {
                            absolute_profiles(&value, Some(linkset_url))
                        } else {
                            value
                        };
                        attributes.insert(key.clone(), value);
                    }
                }
            }
        }
    }
    if let Some(title) = ext_title {
        attributes.replace(AttrKey::Title, title);
    }

    let mut record = LinkRecord::new(target_url, rel.trim(), Source::Linkset).with_context(anchor.clone());
    record.attributes = attributes;
    Ok(record)
}

/// Flattens a JSON target attribute into strings.
///
/// Accepts a string, an array of strings, or RFC 9264 internationalized
/// objects (`{"value": ..., "language": ...}`).
fn string_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj.get("value").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Value::Object(obj) => obj
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}
