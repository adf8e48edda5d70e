//! Lifting link records into typed signposts.

use tracing::{debug, trace};

use crate::parser::{AttrKey, LinkRecord};
use crate::signpost::{LinkRel, MediaType, Signpost};

/// Builds a [`Signpost`] from a record with a signposting relation.
///
/// Returns `None` for relations outside the signposting set and for records
/// whose `type` is not a valid media type. Profiles are resolved against the
/// target; unresolvable ones are dropped.
#[must_use]
pub fn classify(record: &LinkRecord) -> Option<Signpost> {
    let Some(rel) = LinkRel::parse(&record.rel) else {
        trace!(rel = %record.rel, href = %record.target, "Not a signposting relation");
        return None;
    };

    let mut signpost = Signpost::new(rel, record.target.clone());

    if let Some(media_type) = record
        .attributes
        .get(&AttrKey::Type)
        .filter(|t| !t.trim().is_empty())
    {
        match MediaType::parse(media_type) {
            Ok(media_type) => signpost = signpost.with_media_type(media_type),
            Err(e) => {
                debug!(
                    href = %record.target,
                    %rel,
                    error = %e,
                    "Dropping signpost with invalid media type"
                );
                return None;
            }
        }
    }

    let profiles: Vec<_> = record
        .attributes
        .get_all(&AttrKey::Profile)
        .flat_map(str::split_whitespace)
        .filter_map(|profile| record.target.join(profile).ok())
        .collect();
    if !profiles.is_empty() {
        signpost = signpost.with_profiles(profiles);
    }

    if let Some(title) = record.attributes.get(&AttrKey::Title) {
        signpost = signpost.with_title(title);
    }
    if let Some(context) = &record.context {
        signpost = signpost.with_context(context.clone());
    }

    Some(signpost)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;
    use crate::parser::Source;

    fn record(rel: &str) -> LinkRecord {
        LinkRecord::new(
            Url::parse("https://example.org/meta.jsonld").unwrap(),
            rel,
            Source::Header,
        )
    }

    #[test]
    fn test_classify_known_relation() {
        let signpost = classify(
            &record("describedby")
                .with_attribute(AttrKey::Type, "application/ld+json")
                .with_attribute(AttrKey::Profile, "https://w3id.org/ro/crate/1.1")
                .with_attribute(AttrKey::Title, "RO-Crate"),
        )
        .unwrap();
        assert_eq!(signpost.rel(), LinkRel::DescribedBy);
        assert_eq!(signpost.media_type().unwrap().as_str(), "application/ld+json");
        assert_eq!(signpost.profiles().len(), 1);
        assert_eq!(signpost.title(), Some("RO-Crate"));
    }

    #[test]
    fn test_classify_drops_unknown_relation() {
        assert!(classify(&record("stylesheet")).is_none());
        assert!(classify(&record("canonical")).is_none());
    }

    #[test]
    fn test_classify_drops_invalid_media_type() {
        assert!(classify(&record("item").with_attribute(AttrKey::Type, "not a media type")).is_none());
    }

    #[test]
    fn test_classify_ignores_empty_type() {
        let signpost = classify(&record("item").with_attribute(AttrKey::Type, " ")).unwrap();
        assert!(signpost.media_type().is_none());
    }

    #[test]
    fn test_classify_strips_media_type_parameters() {
        let signpost = classify(
            &record("item").with_attribute(AttrKey::Type, "text/csv; charset=UTF-8"),
        )
        .unwrap();
        assert_eq!(signpost.media_type().unwrap().as_str(), "text/csv");
    }

    #[test]
    fn test_classify_carries_context() {
        let context = Url::parse("https://example.org/landing").unwrap();
        let signpost = classify(&record("cite-as").with_context(context.clone())).unwrap();
        assert_eq!(signpost.context(), Some(&context));
    }
}
