//! Error types for link parsing operations.
//!
//! [`LinkError`] describes a single rejected link entry and is always
//! recovered from. [`LinksetError`] rejects a whole linkset document.

use thiserror::Error;

/// Longest entry excerpt kept in an error for display.
pub const MAX_ENTRY_PREVIEW: usize = 80;

/// A single `Link` entry, linkset entry or `<link>` element that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Entry does not start with `<URI-Reference>`
    #[error("link entry has no <target>: {entry}\n  Suggestion: Each link must start with a URI in angle brackets")]
    MissingTarget {
        /// Excerpt of the rejected entry
        entry: String,
    },

    /// Opening `<` without a closing `>`
    #[error("link target is not terminated by '>': {entry}")]
    UnterminatedTarget {
        /// Excerpt of the rejected entry
        entry: String,
    },

    /// Target cannot be resolved to an absolute URI
    #[error("invalid link target '{target}': {reason}")]
    InvalidTarget {
        /// The target as written
        target: String,
        /// Why it could not be resolved
        reason: String,
    },

    /// Entry has no usable `rel` parameter
    #[error("link to '{target}' has no rel parameter\n  Suggestion: Add rel=\"...\" to the link")]
    MissingRel {
        /// The target as written
        target: String,
    },

    /// Quoted-string is never closed
    #[error("unbalanced quote in link entry: {entry}")]
    UnbalancedQuote {
        /// Excerpt of the rejected entry
        entry: String,
    },

    /// Unexpected characters where `;` or `,` was expected
    #[error("unexpected content in link entry: {entry}")]
    UnexpectedContent {
        /// Excerpt of the rejected entry
        entry: String,
    },
}

impl LinkError {
    #[must_use]
    pub fn missing_target(entry: &str) -> Self {
        Self::MissingTarget {
            entry: preview(entry),
        }
    }

    #[must_use]
    pub fn unterminated_target(entry: &str) -> Self {
        Self::UnterminatedTarget {
            entry: preview(entry),
        }
    }

    #[must_use]
    pub fn invalid_target(target: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: preview(target),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn missing_rel(target: &str) -> Self {
        Self::MissingRel {
            target: preview(target),
        }
    }

    #[must_use]
    pub fn unbalanced_quote(entry: &str) -> Self {
        Self::UnbalancedQuote {
            entry: preview(entry),
        }
    }

    #[must_use]
    pub fn unexpected_content(entry: &str) -> Self {
        Self::UnexpectedContent {
            entry: preview(entry),
        }
    }
}

/// A linkset document that cannot be used at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinksetError {
    /// Body is not valid JSON
    #[error("linkset is not valid JSON: {reason}\n  Suggestion: Check the document is application/linkset+json")]
    InvalidJson {
        /// Parser message
        reason: String,
    },

    /// JSON is valid but not shaped like a linkset
    #[error("not a valid RFC 9264 linkset: {reason}")]
    InvalidStructure {
        /// What is wrong with the structure
        reason: String,
    },

    /// Text linkset with a quoted-string that never closes
    #[error("linkset text has unbalanced quoting: {entry}")]
    UnbalancedQuote {
        /// Excerpt of the offending entry
        entry: String,
    },

    /// Body is not UTF-8
    #[error("linkset body is not valid UTF-8: {reason}")]
    InvalidEncoding {
        /// Decoder message
        reason: String,
    },
}

impl LinksetError {
    #[must_use]
    pub fn invalid_json(reason: impl Into<String>) -> Self {
        Self::InvalidJson {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_structure(reason: impl Into<String>) -> Self {
        Self::InvalidStructure {
            reason: reason.into(),
        }
    }
}

fn preview(entry: &str) -> String {
    let trimmed = entry.trim();
    if trimmed.chars().count() > MAX_ENTRY_PREVIEW {
        let mut cut: String = trimmed.chars().take(MAX_ENTRY_PREVIEW).collect();
        cut.push_str("...");
        cut
    } else {
        trimmed.to_string()
    }
}
