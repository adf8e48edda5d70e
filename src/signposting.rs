//! Aggregated signposting, grouped by context.
//!
//! [`Signposting`] holds the classified links asserted for one context
//! resource; [`SignpostingSet`] is the result of one discovery, holding every
//! context seen plus response-level [`Warning`]s.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use url::Url;

use crate::signpost::{Cardinality, LinkRel, Signpost};

/// A non-fatal condition noticed while collecting signposting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A cardinality-one relation was declared with two different targets
    ConflictingValue {
        /// Context the relation belongs to
        context: Url,
        /// The relation, `cite-as` or `license`
        rel: LinkRel,
        /// Target that was kept (first seen)
        kept: Url,
        /// Target that was ignored
        ignored: Url,
    },
    /// Response was `410 Gone`; its links still describe the resource
    ResourceGone {
        /// URL of the gone resource
        url: Url,
    },
    /// Response was `203 Non-Authoritative Information`
    NonAuthoritative {
        /// URL of the transformed response
        url: Url,
    },
    /// A linkset document could not be used at all
    MalformedDocument {
        /// URL of the document
        url: Url,
        /// What was wrong with it
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictingValue {
                context,
                rel,
                kept,
                ignored,
            } => write!(
                f,
                "conflicting rel={rel} for {context}: kept <{kept}>, ignored <{ignored}>"
            ),
            Self::ResourceGone { url } => {
                write!(f, "{url} is gone (HTTP 410); signposting may describe a tombstone")
            }
            Self::NonAuthoritative { url } => write!(
                f,
                "{url} returned HTTP 203; signposting may have been modified by a proxy"
            ),
            Self::MalformedDocument { url, reason } => {
                write!(f, "linkset {url} is malformed: {reason}")
            }
        }
    }
}

/// Outcome of adding one signpost to a [`Signposting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Insertion {
    Added,
    Duplicate,
    /// Cardinality-one slot already holds a different signpost
    Conflict { kept: Url },
}

/// Signposting links asserted for a single context resource.
///
/// Built by the aggregator and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signposting {
    context: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    cite_as: Option<Signpost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<Signpost>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    described_by: BTreeSet<Signpost>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    items: BTreeSet<Signpost>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    authors: BTreeSet<Signpost>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    types: BTreeSet<Signpost>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    collections: BTreeSet<Signpost>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    linksets: BTreeSet<Signpost>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<Warning>,
}

impl Signposting {
    /// Empty signposting for `context`.
    #[must_use]
    pub fn new(context: Url) -> Self {
        Self {
            context,
            cite_as: None,
            license: None,
            described_by: BTreeSet::new(),
            items: BTreeSet::new(),
            authors: BTreeSet::new(),
            types: BTreeSet::new(),
            collections: BTreeSet::new(),
            linksets: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }

    /// The resource these links describe.
    #[must_use]
    pub fn context(&self) -> &Url {
        &self.context
    }

    /// Persistent identifier to use when citing the resource.
    #[must_use]
    pub fn cite_as(&self) -> Option<&Signpost> {
        self.cite_as.as_ref()
    }

    /// License of the resource.
    #[must_use]
    pub fn license(&self) -> Option<&Signpost> {
        self.license.as_ref()
    }

    /// Metadata records describing the resource, possibly in several formats.
    #[must_use]
    pub fn described_by(&self) -> &BTreeSet<Signpost> {
        &self.described_by
    }

    /// Downloadable content of the resource.
    #[must_use]
    pub fn items(&self) -> &BTreeSet<Signpost> {
        &self.items
    }

    /// Author identifiers, e.g. ORCID URIs.
    #[must_use]
    pub fn authors(&self) -> &BTreeSet<Signpost> {
        &self.authors
    }

    /// Semantic types, e.g. `https://schema.org/Dataset`.
    #[must_use]
    pub fn types(&self) -> &BTreeSet<Signpost> {
        &self.types
    }

    /// Collections the resource is part of.
    #[must_use]
    pub fn collections(&self) -> &BTreeSet<Signpost> {
        &self.collections
    }

    /// Linkset documents with further signposting.
    #[must_use]
    pub fn linksets(&self) -> &BTreeSet<Signpost> {
        &self.linksets
    }

    /// Ambiguities found while building this context.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Signposts for one relation.
    #[must_use]
    pub fn for_rel(&self, rel: LinkRel) -> Vec<&Signpost> {
        match rel {
            LinkRel::CiteAs => self.cite_as.iter().collect(),
            LinkRel::License => self.license.iter().collect(),
            LinkRel::DescribedBy => self.described_by.iter().collect(),
            LinkRel::Item => self.items.iter().collect(),
            LinkRel::Author => self.authors.iter().collect(),
            LinkRel::Type => self.types.iter().collect(),
            LinkRel::Collection => self.collections.iter().collect(),
            LinkRel::Linkset => self.linksets.iter().collect(),
        }
    }

    /// Every signpost, grouped by relation in [`LinkRel::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Signpost> {
        LinkRel::ALL.into_iter().flat_map(|rel| self.for_rel(rel))
    }

    /// Number of signposts across all relations.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.cite_as.is_some())
            + usize::from(self.license.is_some())
            + self.described_by.len()
            + self.items.len()
            + self.authors.len()
            + self.types.len()
            + self.collections.len()
            + self.linksets.len()
    }

    /// True when no signposts were asserted for this context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a signpost, honoring the relation's cardinality.
    ///
    /// Cardinality-one slots keep the first signpost. A later one with the
    /// same target is a duplicate even if its attributes differ; a later one
    /// with another target is a conflict.
    pub(crate) fn insert(&mut self, signpost: Signpost) -> Insertion {
        let rel = signpost.rel();
        match rel.cardinality() {
            Cardinality::One => {
                let slot = match rel {
                    LinkRel::License => &mut self.license,
                    _ => &mut self.cite_as,
                };
                if let Some(existing) = slot.as_ref() {
                    if existing.target() == signpost.target() {
                        Insertion::Duplicate
                    } else {
                        Insertion::Conflict {
                            kept: existing.target().clone(),
                        }
                    }
                } else {
                    *slot = Some(signpost);
                    Insertion::Added
                }
            }
            Cardinality::Many => {
                let set = match rel {
                    LinkRel::DescribedBy => &mut self.described_by,
                    LinkRel::Item => &mut self.items,
                    LinkRel::Author => &mut self.authors,
                    LinkRel::Type => &mut self.types,
                    LinkRel::Collection => &mut self.collections,
                    _ => &mut self.linksets,
                };
                if set.insert(signpost) {
                    Insertion::Added
                } else {
                    Insertion::Duplicate
                }
            }
        }
    }

    pub(crate) fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

/// All signposting found by one discovery, keyed by context.
///
/// The context at [`context_url`](Self::context_url) is always present, even
/// when nothing was asserted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignpostingSet {
    context_url: Url,
    contexts: BTreeMap<Url, Signposting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<Warning>,
}

impl SignpostingSet {
    pub(crate) fn new(
        context_url: Url,
        mut contexts: BTreeMap<Url, Signposting>,
        warnings: Vec<Warning>,
    ) -> Self {
        contexts
            .entry(context_url.clone())
            .or_insert_with(|| Signposting::new(context_url.clone()));
        Self {
            context_url,
            contexts,
            warnings,
        }
    }

    /// The fetched resource (or linkset document) this discovery started from.
    #[must_use]
    pub fn context_url(&self) -> &Url {
        &self.context_url
    }

    /// Signposting for the fetched resource itself.
    #[must_use]
    pub fn primary(&self) -> &Signposting {
        // new() guarantees the entry
        &self.contexts[&self.context_url]
    }

    #[must_use]
    pub fn for_context(&self, context: &Url) -> Option<&Signposting> {
        self.contexts.get(context)
    }

    /// Every context, in URL order, including the primary one.
    pub fn contexts(&self) -> impl Iterator<Item = &Signposting> {
        self.contexts.values()
    }

    /// Contexts other than [`context_url`](Self::context_url) that were
    /// described, typically by a linkset.
    pub fn other_contexts(&self) -> impl Iterator<Item = &Signposting> {
        self.contexts
            .iter()
            .filter(|(url, _)| **url != self.context_url)
            .map(|(_, signposting)| signposting)
    }

    /// Response-level warnings; per-context ones live on each [`Signposting`].
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Every warning, response-level first, then per context.
    pub fn all_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .chain(self.contexts.values().flat_map(Signposting::warnings))
    }

    /// True when no context has any signposts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.values().all(Signposting::is_empty)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::signpost::MediaType;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    fn signpost(rel: LinkRel, target: &str) -> Signpost {
        Signpost::new(rel, url(target))
    }

    // ==================== Signposting ====================

    #[test]
    fn test_signposting_cardinality_one_first_wins() {
        let mut s = Signposting::new(url("https://example.org/"));
        assert_eq!(
            s.insert(signpost(LinkRel::CiteAs, "https://doi.org/10.1/a")),
            Insertion::Added
        );
        assert_eq!(
            s.insert(signpost(LinkRel::CiteAs, "https://doi.org/10.1/a")),
            Insertion::Duplicate
        );
        assert_eq!(
            s.insert(signpost(LinkRel::CiteAs, "https://doi.org/10.1/b")),
            Insertion::Conflict {
                kept: url("https://doi.org/10.1/a")
            }
        );
        assert_eq!(s.cite_as().unwrap().target().as_str(), "https://doi.org/10.1/a");
    }

    #[test]
    fn test_signposting_cardinality_one_same_target_other_attributes() {
        let mut s = Signposting::new(url("https://example.org/"));
        s.insert(signpost(LinkRel::CiteAs, "https://doi.org/10.1/x"));
        let typed = signpost(LinkRel::CiteAs, "https://doi.org/10.1/x")
            .with_media_type(MediaType::parse("application/vnd.citationstyles.csl+json").unwrap())
            .with_profiles([url("https://example.org/profile")]);
        assert_eq!(s.insert(typed), Insertion::Duplicate);
        assert!(s.cite_as().unwrap().media_type().is_none());
        assert!(s.warnings().is_empty());
    }

    #[test]
    fn test_signposting_license_slot_is_separate() {
        let mut s = Signposting::new(url("https://example.org/"));
        s.insert(signpost(LinkRel::CiteAs, "https://doi.org/10.1/a"));
        assert_eq!(
            s.insert(signpost(
                LinkRel::License,
                "https://creativecommons.org/licenses/by/4.0/"
            )),
            Insertion::Added
        );
        assert!(s.license().is_some());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_signposting_many_dedupes() {
        let mut s = Signposting::new(url("https://example.org/"));
        s.insert(signpost(LinkRel::Item, "https://example.org/a.csv"));
        s.insert(signpost(LinkRel::Item, "https://example.org/b.csv"));
        assert_eq!(
            s.insert(signpost(LinkRel::Item, "https://example.org/a.csv")),
            Insertion::Duplicate
        );
        assert_eq!(s.items().len(), 2);
        assert_eq!(s.for_rel(LinkRel::Item).len(), 2);
    }

    #[test]
    fn test_signposting_iter_follows_rel_order() {
        let mut s = Signposting::new(url("https://example.org/"));
        s.insert(signpost(LinkRel::Item, "https://example.org/a.csv"));
        s.insert(signpost(LinkRel::Author, "https://orcid.org/0000-0002-1825-0097"));
        s.insert(signpost(LinkRel::CiteAs, "https://doi.org/10.1/a"));
        let rels: Vec<_> = s.iter().map(Signpost::rel).collect();
        assert_eq!(rels, vec![LinkRel::CiteAs, LinkRel::Author, LinkRel::Item]);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_signposting_serializes_only_populated_fields() {
        let mut s = Signposting::new(url("https://example.org/"));
        s.insert(signpost(LinkRel::CiteAs, "https://doi.org/10.1/a"));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["context"], "https://example.org/");
        assert_eq!(json["cite_as"]["target"], "https://doi.org/10.1/a");
        assert!(json.get("items").is_none());
        assert!(json.get("warnings").is_none());
    }

    // ==================== SignpostingSet ====================

    #[test]
    fn test_set_always_has_primary() {
        let set = SignpostingSet::new(url("https://example.org/"), BTreeMap::new(), Vec::new());
        assert!(set.primary().is_empty());
        assert!(set.is_empty());
        assert_eq!(set.contexts().count(), 1);
        assert_eq!(set.other_contexts().count(), 0);
    }

    #[test]
    fn test_set_other_contexts() {
        let mut other = Signposting::new(url("https://example.org/other"));
        other.insert(signpost(LinkRel::Item, "https://example.org/other.zip"));
        let contexts = BTreeMap::from([(other.context().clone(), other)]);
        let set = SignpostingSet::new(
            url("https://example.org/"),
            contexts,
            vec![Warning::ResourceGone {
                url: url("https://example.org/"),
            }],
        );
        assert!(!set.is_empty());
        let others: Vec<_> = set.other_contexts().map(|s| s.context().as_str()).collect();
        assert_eq!(others, vec!["https://example.org/other"]);
        assert!(set.for_context(&url("https://example.org/other")).is_some());
        assert_eq!(set.warnings().len(), 1);
        assert_eq!(set.all_warnings().count(), 1);
    }

    #[test]
    fn test_warning_display_and_serialize() {
        let w = Warning::ConflictingValue {
            context: url("https://example.org/"),
            rel: LinkRel::CiteAs,
            kept: url("https://doi.org/10.1/a"),
            ignored: url("https://doi.org/10.1/b"),
        };
        let msg = w.to_string();
        assert!(msg.contains("rel=cite-as"));
        assert!(msg.contains("kept <https://doi.org/10.1/a>"));
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "conflicting_value");
        assert_eq!(json["rel"], "cite-as");
    }
}
