//! RFC 8288 `Link` header parsing.
//!
//! A header field value holds comma-separated link-values:
//!
//! ```text
//! link-value = "<" URI-Reference ">" *( OWS ";" OWS link-param )
//! link-param = token BWS [ "=" BWS ( token / quoted-string ) ]
//! ```
//!
//! Each entry is parsed on its own. A malformed entry is skipped and reported
//! without affecting its siblings.

use std::fmt;

use tracing::{debug, trace};
use url::Url;

use super::error::LinkError;
use super::record::{
    AttrKey, Attributes, LinkRecord, Source, absolute_profiles, expand_rels, resolve_reference,
};

/// A syntactically valid link-value before target resolution and `rel` expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    /// URI-Reference between the angle brackets, unresolved
    pub target: String,
    /// Parameters in order, names lower-cased, quoted values unescaped
    pub params: Vec<(String, String)>,
}

impl RawLink {
    /// First value of a parameter; RFC 8288 ignores later `rel`/`anchor`/`type` occurrences.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Links parsed from one or more header values.
#[derive(Debug, Clone, Default)]
pub struct LinkParseResult {
    /// Records, one per (entry, relation) pair, in header order
    pub links: Vec<LinkRecord>,
    /// Entries that were rejected
    pub skipped: Vec<LinkError>,
}

impl LinkParseResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    fn merge(&mut self, other: Self) {
        self.links.extend(other.links);
        self.skipped.extend(other.skipped);
    }
}

impl fmt::Display for LinkParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parsed {} links ({} skipped)",
            self.links.len(),
            self.skipped.len()
        )
    }
}

/// Parses one `Link` header field value.
///
/// Relative targets, `anchor` and `profile` values are resolved against
/// `base`. Without a base, relative references are rejected.
///
/// # Example
///
/// ```
/// use signposting::parser::parse_link_header;
/// use url::Url;
///
/// let base = Url::parse("https://example.org/record/1").unwrap();
/// let result = parse_link_header(
///     r#"<meta.ttl>; rel="describedby"; type="text/turtle", <https://doi.org/10.1/x>; rel=cite-as"#,
///     Some(&base),
/// );
/// assert_eq!(result.len(), 2);
/// assert_eq!(result.links[0].target.as_str(), "https://example.org/record/meta.ttl");
/// ```
#[tracing::instrument(skip(value, base), fields(value_len = value.len()))]
#[must_use]
pub fn parse_link_header(value: &str, base: Option<&Url>) -> LinkParseResult {
    parse_link_value(value, base, Source::Header)
}

/// Parses several `Link` header field values, in order.
#[must_use]
pub fn parse_link_headers<S: AsRef<str>>(values: &[S], base: Option<&Url>) -> LinkParseResult {
    let mut result = LinkParseResult::new();
    for value in values {
        result.merge(parse_link_header(value.as_ref(), base));
    }
    debug!(
        links = result.len(),
        skipped = result.skipped_count(),
        "Link headers parsed"
    );
    result
}

pub(crate) fn parse_link_value(value: &str, base: Option<&Url>, source: Source) -> LinkParseResult {
    let mut result = LinkParseResult::new();
    for raw in split_link_values(value) {
        match raw.and_then(|raw| resolve_raw_link(&raw, base, source)) {
            Ok(records) => result.links.extend(records),
            Err(e) => {
                debug!(error = %e, %source, "Skipping malformed link entry");
                result.skipped.push(e);
            }
        }
    }
    result
}

/// Turns a raw link-value into records: resolves URIs, lifts `anchor` and
/// expands each `rel` token.
pub(crate) fn resolve_raw_link(
    raw: &RawLink,
    base: Option<&Url>,
    source: Source,
) -> Result<Vec<LinkRecord>, LinkError> {
    let target = resolve_reference(&raw.target, base)?;
    let rel = raw
        .param("rel")
        .ok_or_else(|| LinkError::missing_rel(&raw.target))?;
    let context = raw
        .param("anchor")
        .map(|anchor| resolve_reference(anchor, base))
        .transpose()?;

    let mut attributes = Attributes::new();
    let mut ext_title = None;
    for (name, value) in &raw.params {
        match name.as_str() {
            "rel" | "anchor" | "rev" => {}
            "title*" => {
                if ext_title.is_none() {
                    ext_title = decode_ext_value(value);
                }
            }
            _ => {
                let key = AttrKey::from_name(name);
                let value = if key == AttrKey::Profile {
                    absolute_profiles(value, base)
                } else {
                    value.clone()
                };
                if !attributes.insert(key, value) {
                    trace!(param = %name, "Ignoring repeated link parameter");
                }
            }
        }
    }
    if let Some(title) = ext_title {
        attributes.replace(AttrKey::Title, title);
    }

    expand_rels(&target, rel, context.as_ref(), &attributes, source)
}

/// Splits a header value into link-values without resolving anything.
///
/// Returns one result per entry. An unbalanced quote consumes the remainder
/// of the value, so it is always the last result.
#[must_use]
pub fn split_link_values(input: &str) -> Vec<Result<RawLink, LinkError>> {
    let chars: Vec<char> = input.chars().collect();
    let mut results = Vec::new();
    let mut pos = 0usize;

    loop {
        while pos < chars.len() && (chars[pos].is_whitespace() || chars[pos] == ',') {
            pos += 1;
        }
        if pos >= chars.len() {
            break;
        }

        let start = pos;
        match parse_entry(&chars, &mut pos) {
            Ok(raw) => results.push(Ok(raw)),
            Err(failure) => {
                let failure = if failure == Failure::Quote || skip_to_next_entry(&chars, &mut pos)
                {
                    Failure::Quote
                } else {
                    failure
                };
                let entry: String = chars[start..pos].iter().collect();
                results.push(Err(failure.into_error(&entry)));
            }
        }
    }

    results
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    MissingTarget,
    UnterminatedTarget,
    Quote,
    Unexpected,
}

impl Failure {
    fn into_error(self, entry: &str) -> LinkError {
        match self {
            Self::MissingTarget => LinkError::missing_target(entry),
            Self::UnterminatedTarget => LinkError::unterminated_target(entry),
            Self::Quote => LinkError::unbalanced_quote(entry),
            Self::Unexpected => LinkError::unexpected_content(entry),
        }
    }
}

fn parse_entry(chars: &[char], pos: &mut usize) -> Result<RawLink, Failure> {
    if chars[*pos] != '<' {
        return Err(Failure::MissingTarget);
    }
    *pos += 1;
    let target_start = *pos;
    while *pos < chars.len() && chars[*pos] != '>' {
        *pos += 1;
    }
    if *pos >= chars.len() {
        return Err(Failure::UnterminatedTarget);
    }
    let target: String = chars[target_start..*pos].iter().collect();
    *pos += 1;

    let mut params = Vec::new();
    loop {
        skip_whitespace(chars, pos);
        if *pos >= chars.len() {
            break;
        }
        match chars[*pos] {
            ',' => {
                *pos += 1;
                break;
            }
            ';' => {
                *pos += 1;
                if let Some(param) = parse_param(chars, pos)? {
                    params.push(param);
                }
            }
            _ => return Err(Failure::Unexpected),
        }
    }

    Ok(RawLink {
        target: target.trim().to_string(),
        params,
    })
}

/// Parses `token [ "=" ( token / quoted-string ) ]` after a `;`.
///
/// Empty parameters (`;;`, trailing `;`) are tolerated and yield `None`.
fn parse_param(chars: &[char], pos: &mut usize) -> Result<Option<(String, String)>, Failure> {
    skip_whitespace(chars, pos);
    let name_start = *pos;
    while *pos < chars.len() && is_tchar(chars[*pos]) {
        *pos += 1;
    }
    let name: String = chars[name_start..*pos].iter().collect();
    if name.is_empty() {
        return match chars.get(*pos) {
            None | Some(';' | ',') => Ok(None),
            Some(_) => Err(Failure::Unexpected),
        };
    }

    skip_whitespace(chars, pos);
    if chars.get(*pos) != Some(&'=') {
        return Ok(Some((name.to_ascii_lowercase(), String::new())));
    }
    *pos += 1;
    skip_whitespace(chars, pos);

    let value = if chars.get(*pos) == Some(&'"') {
        *pos += 1;
        parse_quoted(chars, pos)?
    } else {
        let value_start = *pos;
        while *pos < chars.len() && !matches!(chars[*pos], ';' | ',') && !chars[*pos].is_whitespace()
        {
            *pos += 1;
        }
        chars[value_start..*pos].iter().collect()
    };

    Ok(Some((name.to_ascii_lowercase(), value)))
}

fn parse_quoted(chars: &[char], pos: &mut usize) -> Result<String, Failure> {
    let mut value = String::new();
    loop {
        let Some(&c) = chars.get(*pos) else {
            return Err(Failure::Quote);
        };
        *pos += 1;
        match c {
            '"' => return Ok(value),
            '\\' => {
                let Some(&escaped) = chars.get(*pos) else {
                    return Err(Failure::Quote);
                };
                value.push(escaped);
                *pos += 1;
            }
            _ => value.push(c),
        }
    }
}

/// Advances past the next top-level comma. Returns true if an unbalanced
/// quote swallowed the rest of the input.
fn skip_to_next_entry(chars: &[char], pos: &mut usize) -> bool {
    let mut in_quotes = false;
    while *pos < chars.len() {
        let c = chars[*pos];
        *pos += 1;
        match c {
            '\\' if in_quotes => *pos += 1,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return false,
            _ => {}
        }
    }
    *pos = (*pos).min(chars.len());
    in_quotes
}

fn skip_whitespace(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

/// RFC 9110 `tchar`.
fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

/// Decodes an RFC 8187 ext-value such as `UTF-8'en'%c2%a3%20rates`.
fn decode_ext_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?.trim();
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if charset.eq_ignore_ascii_case("utf-8") {
        urlencoding::decode(encoded).ok().map(|s| s.into_owned())
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(
            urlencoding::decode_binary(encoded.as_bytes())
                .iter()
                .map(|&b| char::from(b))
                .collect(),
        )
    } else {
        debug!(charset, "Unsupported charset in ext-value");
        None
    }
}
