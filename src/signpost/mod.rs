//! The canonical signposting link: one typed relation to one target.
//!
//! A [`Signpost`] lifts only the navigational attributes of a link (relation,
//! target, media type, profiles) plus an optional title. Identity is defined
//! by relation, target, media type and profile set, so signposts can live in
//! deduplicating sets regardless of which source declared them.

mod error;
mod media_type;
mod rel;

pub use error::{MAX_MEDIA_TYPE_LENGTH, MAX_MEDIA_TYPE_PART_LENGTH, SignpostError};
pub use media_type::{IANA_MAIN_TYPES, MediaType};
pub use rel::{Cardinality, LinkRel};

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use url::Url;

/// An individual signposting link, e.g. for `rel=cite-as`.
#[derive(Debug, Clone, Serialize)]
pub struct Signpost {
    rel: LinkRel,
    target: Url,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    media_type: Option<MediaType>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    profiles: BTreeSet<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Url>,
}

impl Signpost {
    /// Creates a signpost with no media type, profiles, title or context.
    #[must_use]
    pub fn new(rel: LinkRel, target: Url) -> Self {
        Self {
            rel,
            target,
            media_type: None,
            profiles: BTreeSet::new(),
            title: None,
            context: None,
        }
    }

    /// Builds a signpost from plain strings.
    ///
    /// `profiles` is a space-separated list of absolute URIs, as in the
    /// `profile` link parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SignpostError`] if the relation is not a signposting relation,
    /// a URI is not absolute, or the media type is invalid.
    pub fn parse(
        rel: &str,
        target: &str,
        media_type: Option<&str>,
        profiles: Option<&str>,
        context: Option<&str>,
    ) -> Result<Self, SignpostError> {
        let rel: LinkRel = rel.parse()?;
        let mut signpost = Self::new(rel, parse_absolute(target)?);
        if let Some(media_type) = media_type.filter(|t| !t.trim().is_empty()) {
            signpost.media_type = Some(MediaType::parse(media_type)?);
        }
        if let Some(profiles) = profiles {
            signpost.profiles = profiles
                .split_whitespace()
                .map(parse_absolute)
                .collect::<Result<_, _>>()?;
        }
        if let Some(context) = context {
            signpost.context = Some(parse_absolute(context)?);
        }
        Ok(signpost)
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    #[must_use]
    pub fn with_profiles(mut self, profiles: impl IntoIterator<Item = Url>) -> Self {
        self.profiles = profiles.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Url) -> Self {
        self.context = Some(context);
        self
    }

    /// The link relation of this signpost.
    #[must_use]
    pub fn rel(&self) -> LinkRel {
        self.rel
    }

    /// The absolute URI this link points to.
    #[must_use]
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Expected media type of the target, recommended for content negotiation.
    #[must_use]
    pub fn media_type(&self) -> Option<&MediaType> {
        self.media_type.as_ref()
    }

    /// Profile URIs describing conventions the target follows.
    #[must_use]
    pub fn profiles(&self) -> &BTreeSet<Url> {
        &self.profiles
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The resource this signpost was asserted for, when known.
    #[must_use]
    pub fn context(&self) -> Option<&Url> {
        self.context.as_ref()
    }

    fn identity(&self) -> (&Url, LinkRel, Option<&MediaType>, &BTreeSet<Url>) {
        (&self.target, self.rel, self.media_type.as_ref(), &self.profiles)
    }
}

fn parse_absolute(uri: &str) -> Result<Url, SignpostError> {
    Url::parse(uri.trim()).map_err(|e| SignpostError::invalid_uri(uri, e.to_string()))
}

impl PartialEq for Signpost {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Signpost {}

impl Hash for Signpost {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Signpost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signpost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Signpost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>; rel={}", self.target, self.rel)?;
        if let Some(media_type) = &self.media_type {
            write!(f, "; type=\"{media_type}\"")?;
        }
        if !self.profiles.is_empty() {
            let joined: Vec<&str> = self.profiles.iter().map(Url::as_str).collect();
            write!(f, "; profile=\"{}\"", joined.join(" "))?;
        }
        Ok(())
    }
}
