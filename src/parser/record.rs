//! Source-tagged link records shared by every parser.

use std::fmt;

use tracing::debug;
use url::Url;

use super::error::LinkError;

/// Where a link record was discovered.
///
/// The derived ordering is the precedence used when cardinality-one
/// relations conflict: headers first, then HTML, then linksets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// HTTP `Link` header
    Header,
    /// HTML `<link>` element
    Html,
    /// RFC 9264 linkset document
    Linkset,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Html => write!(f, "html"),
            Self::Linkset => write!(f, "linkset"),
        }
    }
}

/// Recognized link target attributes.
///
/// `rel` and `anchor` are not attributes here; they live on [`LinkRecord`]
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrKey {
    /// `type` - media type hint
    Type,
    /// `profile` - space-separated profile URIs; may repeat
    Profile,
    /// `hreflang` - may repeat
    Hreflang,
    /// `title` (or decoded `title*`)
    Title,
    /// `media`
    Media,
    /// Any extension attribute, lower-cased
    Other(String),
}

impl AttrKey {
    /// Maps a parameter name (case-insensitive) to its key.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "type" => Self::Type,
            "profile" => Self::Profile,
            "hreflang" => Self::Hreflang,
            "title" => Self::Title,
            "media" => Self::Media,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Type => "type",
            Self::Profile => "profile",
            Self::Hreflang => "hreflang",
            Self::Title => "title",
            Self::Media => "media",
            Self::Other(name) => name,
        }
    }

    /// Whether a later occurrence may add another value instead of being ignored.
    #[must_use]
    pub fn repeatable(&self) -> bool {
        matches!(self, Self::Profile | Self::Hreflang | Self::Other(_))
    }
}

/// Ordered attribute map allowing several values per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(AttrKey, String)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, keeping only the first occurrence of single-valued keys.
    ///
    /// Returns `false` when the value was ignored as a repeat.
    pub fn insert(&mut self, key: AttrKey, value: impl Into<String>) -> bool {
        if !key.repeatable() && self.contains(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    /// Sets a single-valued key, replacing any earlier value.
    pub fn replace(&mut self, key: AttrKey, value: impl Into<String>) {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value.into()));
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &AttrKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in declaration order.
    pub fn get_all<'a>(&'a self, key: &'a AttrKey) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &AttrKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttrKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One link relation from one source, before classification.
///
/// Every record has an absolute target and a non-empty, lower-cased relation
/// token. A declaration listing several relations yields one record per
/// relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Absolute link target
    pub target: Url,
    /// Lower-cased relation token, e.g. `describedby`
    pub rel: String,
    /// Explicit context (`anchor`, linkset key); `None` means the fetched resource
    pub context: Option<Url>,
    /// Target attributes
    pub attributes: Attributes,
    /// Discovery source
    pub source: Source,
}

impl LinkRecord {
    #[must_use]
    pub fn new(target: Url, rel: impl Into<String>, source: Source) -> Self {
        Self {
            target,
            rel: rel.into().to_ascii_lowercase(),
            context: None,
            attributes: Attributes::new(),
            source,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: Url) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: AttrKey, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }
}

/// Serializes the record back to `Link` header syntax.
impl fmt::Display for LinkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>; rel=\"{}\"", self.target, self.rel)?;
        if let Some(context) = &self.context {
            write!(f, "; anchor=\"{context}\"")?;
        }
        for (key, value) in self.attributes.iter() {
            write!(f, "; {}=\"{}\"", key.name(), escape_quoted(value))?;
        }
        Ok(())
    }
}

/// Resolves a URI reference against an optional base, yielding an absolute URL.
pub(crate) fn resolve_reference(reference: &str, base: Option<&Url>) -> Result<Url, LinkError> {
    let reference = reference.trim();
    if reference.is_empty() && base.is_none() {
        return Err(LinkError::invalid_target(reference, "empty URI reference"));
    }
    match base {
        Some(base) => base.join(reference),
        None => Url::parse(reference),
    }
    .map_err(|e| LinkError::invalid_target(reference, e.to_string()))
}

/// Rewrites a space-separated profile list so every entry is absolute.
///
/// Entries that cannot be resolved are dropped.
pub(crate) fn absolute_profiles(value: &str, base: Option<&Url>) -> String {
    value
        .split_whitespace()
        .filter_map(|profile| match resolve_reference(profile, base) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!(profile, error = %e, "Dropping unresolvable profile URI");
                None
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expands a (possibly multi-token) `rel` value into one record per relation.
///
/// # Errors
///
/// Returns [`LinkError::MissingRel`] when `rel` holds no tokens.
pub(crate) fn expand_rels(
    target: &Url,
    rel: &str,
    context: Option<&Url>,
    attributes: &Attributes,
    source: Source,
) -> Result<Vec<LinkRecord>, LinkError> {
    let records: Vec<LinkRecord> = rel
        .split_whitespace()
        .map(|token| LinkRecord {
            target: target.clone(),
            rel: token.to_ascii_lowercase(),
            context: context.cloned(),
            attributes: attributes.clone(),
            source,
        })
        .collect();
    if records.is_empty() {
        return Err(LinkError::missing_rel(target.as_str()));
    }
    Ok(records)
}

fn escape_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
