//! Error types for building signposts from raw values.

use thiserror::Error;

/// Maximum length of a media type string (RFC 6838 §4.2).
pub const MAX_MEDIA_TYPE_LENGTH: usize = 255;

/// Maximum length of the main type or the sub-type of a media type.
pub const MAX_MEDIA_TYPE_PART_LENGTH: usize = 127;

/// Errors raised when a raw value cannot become part of a [`Signpost`](super::Signpost).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignpostError {
    /// Relation is not one of the FAIR Signposting relations
    #[error("unknown signposting relation '{rel}'\n  Suggestion: {suggestion}")]
    UnknownRelation {
        /// The relation token as supplied
        rel: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// Media type does not follow RFC 6838
    #[error("invalid media type '{media_type}': {reason}")]
    InvalidMediaType {
        /// The rejected media type
        media_type: String,
        /// Why it was rejected
        reason: String,
    },

    /// URI reference could not be made absolute
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri {
        /// The rejected URI reference
        uri: String,
        /// Why it was rejected
        reason: String,
    },
}

impl SignpostError {
    #[must_use]
    pub fn unknown_relation(rel: &str) -> Self {
        Self::UnknownRelation {
            rel: rel.to_string(),
            suggestion: "Use one of: author, collection, describedby, item, cite-as, type, license, linkset"
                .to_string(),
        }
    }

    #[must_use]
    pub fn invalid_media_type(media_type: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMediaType {
            media_type: media_type.chars().take(64).collect(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_uri(uri: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_relation_message_lists_known_relations() {
        let msg = SignpostError::unknown_relation("stylesheet").to_string();
        assert!(msg.contains("stylesheet"));
        assert!(msg.contains("cite-as"), "suggestion should list relations");
    }

    #[test]
    fn test_invalid_media_type_truncates_long_input() {
        let long = "a".repeat(500);
        let err = SignpostError::invalid_media_type(&long, "too long");
        if let SignpostError::InvalidMediaType { media_type, .. } = err {
            assert_eq!(media_type.len(), 64);
        } else {
            panic!("Expected InvalidMediaType");
        }
    }
}
