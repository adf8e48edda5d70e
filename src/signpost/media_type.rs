//! RFC 6838 media types as carried by the `type` link parameter.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::error::{MAX_MEDIA_TYPE_LENGTH, MAX_MEDIA_TYPE_PART_LENGTH, SignpostError};

/// Top level type trees registered with IANA (as of 2022-05-17).
pub const IANA_MAIN_TYPES: [&str; 10] = [
    "application",
    "audio",
    "example",
    "font",
    "image",
    "message",
    "model",
    "multipart",
    "text",
    "video",
];

/// `type-name "/" subtype-name` restricted-name grammar, RFC 6838 §4.2.
#[allow(clippy::expect_used)]
static MEDIA_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9][a-z0-9!\#\$\&\^_\-]*)/([a-z0-9][a-z0-9!\#\$\&\^_+.\-]*)$")
        .expect("media type regex is valid") // Static pattern, safe to panic
});

/// A validated, lower-cased media type such as `text/turtle`.
///
/// Content type parameters (`;charset=UTF-8`, `;profile=...`) are not part of
/// the registration and are stripped. Unregistered main trees are accepted but
/// logged, since RFC 6838 only constrains the syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MediaType(String);

impl MediaType {
    /// Parses and normalizes a media type.
    ///
    /// # Errors
    ///
    /// Returns [`SignpostError::InvalidMediaType`] when the value is too long
    /// or does not match the RFC 6838 restricted-name grammar.
    pub fn parse(value: &str) -> Result<Self, SignpostError> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        if essence.len() > MAX_MEDIA_TYPE_LENGTH {
            // Guard before handing a large value to the regex
            return Err(SignpostError::invalid_media_type(
                value,
                format!("longer than {MAX_MEDIA_TYPE_LENGTH} characters"),
            ));
        }

        let lowered = essence.to_ascii_lowercase();
        let Some(caps) = MEDIA_TYPE_PATTERN.captures(&lowered) else {
            return Err(SignpostError::invalid_media_type(
                value,
                "not a valid RFC 6838 type/subtype",
            ));
        };

        let main = caps.get(1).map_or("", |m| m.as_str());
        let sub = caps.get(2).map_or("", |m| m.as_str());
        if main.len() > MAX_MEDIA_TYPE_PART_LENGTH {
            return Err(SignpostError::invalid_media_type(
                value,
                format!("main type longer than {MAX_MEDIA_TYPE_PART_LENGTH} characters"),
            ));
        }
        if sub.len() > MAX_MEDIA_TYPE_PART_LENGTH {
            return Err(SignpostError::invalid_media_type(
                value,
                format!("sub-type longer than {MAX_MEDIA_TYPE_PART_LENGTH} characters"),
            ));
        }
        if !IANA_MAIN_TYPES.contains(&main) {
            warn!(media_type = %lowered, main, "Unrecognized media type main tree");
        }

        Ok(Self(lowered))
    }

    /// The main type, e.g. `image`.
    #[must_use]
    pub fn main(&self) -> &str {
        self.0.split_once('/').map_or("", |(main, _)| main)
    }

    /// The sub-type, e.g. `jpeg`.
    #[must_use]
    pub fn sub(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, sub)| sub)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MediaType {
    type Err = SignpostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_plain() {
        let t = MediaType::parse("text/plain").unwrap();
        assert_eq!(t.as_str(), "text/plain");
        assert_eq!(t.main(), "text");
        assert_eq!(t.sub(), "plain");
    }

    #[test]
    fn test_media_type_lowercases() {
        assert_eq!(MediaType::parse("Text/PLAIN").unwrap().as_str(), "text/plain");
    }

    #[test]
    fn test_media_type_strips_parameters() {
        let t = MediaType::parse("text/html; charset=UTF-8").unwrap();
        assert_eq!(t.as_str(), "text/html");
    }

    #[test]
    fn test_media_type_accepts_structured_suffixes_and_vendor_trees() {
        for value in [
            "application/ld+json",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "example/prs.example.test",
            "example/x.example.test",
        ] {
            assert_eq!(MediaType::parse(value).unwrap().as_str(), value);
        }
    }

    #[test]
    fn test_media_type_surprisingly_valid() {
        assert!(MediaType::parse("example/92-#-z-$-x-&-^-_-+-.").is_ok());
        assert!(MediaType::parse("9/2").is_ok());
    }

    #[test]
    fn test_media_type_unknown_main_tree_is_accepted() {
        assert_eq!(MediaType::parse("other/example").unwrap().main(), "other");
    }

    #[test]
    fn test_media_type_rejects_invalid_syntax() {
        for value in [
            "",
            "text",
            "text/",
            "/plain",
            "text/plain/extra",
            "-text/plain",
            "text/.plain",
            "text plain",
            "text/pl ain",
        ] {
            assert!(MediaType::parse(value).is_err(), "should reject {value:?}");
        }
    }

    #[test]
    fn test_media_type_rejects_overlong_parts() {
        let main = "a".repeat(128);
        assert!(MediaType::parse(&format!("{main}/plain")).is_err());
        let sub = "b".repeat(128);
        assert!(MediaType::parse(&format!("text/{sub}")).is_err());
        let total = format!("text/{}", "c".repeat(260));
        let err = MediaType::parse(&total).unwrap_err();
        assert!(err.to_string().contains("255"));
    }
}
