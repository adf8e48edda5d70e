//! Signposting link relations and their cardinality.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::SignpostError;

/// How many values of a relation a single context may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Zero or one value (`cite-as`, `license`).
    One,
    /// Zero or more values.
    Many,
}

/// A link relation recognized by FAIR Signposting.
///
/// Link relations are defined by RFC 8288, but only the relations listed in
/// the FAIR Signposting conventions are represented. Anything else is dropped
/// during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LinkRel {
    #[serde(rename = "author")]
    Author,
    #[serde(rename = "collection")]
    Collection,
    #[serde(rename = "describedby")]
    DescribedBy,
    #[serde(rename = "item")]
    Item,
    #[serde(rename = "cite-as")]
    CiteAs,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "license")]
    License,
    #[serde(rename = "linkset")]
    Linkset,
}

impl LinkRel {
    /// Every recognized relation, in display order.
    pub const ALL: [LinkRel; 8] = [
        Self::CiteAs,
        Self::Type,
        Self::Collection,
        Self::License,
        Self::Author,
        Self::DescribedBy,
        Self::Item,
        Self::Linkset,
    ];

    /// Looks up a relation token, ignoring ASCII case and surrounding whitespace.
    ///
    /// Returns `None` for relations outside the signposting set, such as
    /// `stylesheet` or `canonical`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|rel| rel.as_str().eq_ignore_ascii_case(token))
    }

    /// The registered relation name, e.g. `cite-as`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Collection => "collection",
            Self::DescribedBy => "describedby",
            Self::Item => "item",
            Self::CiteAs => "cite-as",
            Self::Type => "type",
            Self::License => "license",
            Self::Linkset => "linkset",
        }
    }

    #[must_use]
    pub fn cardinality(self) -> Cardinality {
        match self {
            Self::CiteAs | Self::License => Cardinality::One,
            Self::Author
            | Self::Collection
            | Self::DescribedBy
            | Self::Item
            | Self::Type
            | Self::Linkset => Cardinality::Many,
        }
    }
}

impl fmt::Display for LinkRel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkRel {
    type Err = SignpostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SignpostError::unknown_relation(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_link_rel_display_matches_registered_names() {
        assert_eq!(LinkRel::Author.to_string(), "author");
        assert_eq!(LinkRel::Collection.to_string(), "collection");
        assert_eq!(LinkRel::DescribedBy.to_string(), "describedby");
        assert_eq!(LinkRel::Item.to_string(), "item");
        assert_eq!(LinkRel::CiteAs.to_string(), "cite-as");
        assert_eq!(LinkRel::Type.to_string(), "type");
        assert_eq!(LinkRel::License.to_string(), "license");
        assert_eq!(LinkRel::Linkset.to_string(), "linkset");
    }

    #[test]
    fn test_link_rel_parse_is_case_insensitive_and_trimmed() {
        assert_eq!(LinkRel::parse("CITE-AS"), Some(LinkRel::CiteAs));
        assert_eq!(LinkRel::parse("  DescribedBy "), Some(LinkRel::DescribedBy));
        assert_eq!(LinkRel::parse("ITEM"), Some(LinkRel::Item));
    }

    #[test]
    fn test_link_rel_parse_rejects_other_relations() {
        assert_eq!(LinkRel::parse("stylesheet"), None);
        assert_eq!(LinkRel::parse("canonical"), None);
        assert_eq!(LinkRel::parse("cite_as"), None);
        assert_eq!(LinkRel::parse(""), None);
    }

    #[test]
    fn test_link_rel_from_str_round_trips_every_variant() {
        for rel in LinkRel::ALL {
            assert_eq!(rel.as_str().parse::<LinkRel>().unwrap(), rel);
        }
        assert!("alternate".parse::<LinkRel>().is_err());
    }

    #[test]
    fn test_link_rel_cardinality_table() {
        assert_eq!(LinkRel::CiteAs.cardinality(), Cardinality::One);
        assert_eq!(LinkRel::License.cardinality(), Cardinality::One);
        for rel in [
            LinkRel::Author,
            LinkRel::Collection,
            LinkRel::DescribedBy,
            LinkRel::Item,
            LinkRel::Type,
            LinkRel::Linkset,
        ] {
            assert_eq!(rel.cardinality(), Cardinality::Many, "{rel}");
        }
    }

    #[test]
    fn test_link_rel_serializes_as_relation_name() {
        let json = serde_json::to_string(&LinkRel::CiteAs).unwrap();
        assert_eq!(json, "\"cite-as\"");
    }
}
