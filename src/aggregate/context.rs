//! Grouping link records by the resource they describe.

use std::collections::BTreeMap;

use tracing::trace;
use url::Url;

use crate::parser::LinkRecord;

/// Groups records by context.
///
/// A record without an explicit context (no `anchor`, not from a linkset)
/// describes `fetched_url`: the final URL of the response it came from. A
/// redirect's `Location` or a `Content-Location` header never becomes the
/// context. Every returned record has `context` set to its group key, and
/// records keep their input order within a group.
pub fn resolve_contexts(
    records: impl IntoIterator<Item = LinkRecord>,
    fetched_url: &Url,
) -> BTreeMap<Url, Vec<LinkRecord>> {
    let mut groups: BTreeMap<Url, Vec<LinkRecord>> = BTreeMap::new();
    for record in assign_default_context(records, fetched_url) {
        let context = record.context.clone().unwrap_or_else(|| fetched_url.clone());
        groups.entry(context).or_default().push(record);
    }
    trace!(contexts = groups.len(), fetched = %fetched_url, "Records grouped by context");
    groups
}

/// Fills in `fetched_url` as the context of records that have none.
pub(crate) fn assign_default_context(
    records: impl IntoIterator<Item = LinkRecord>,
    fetched_url: &Url,
) -> impl Iterator<Item = LinkRecord> {
    records.into_iter().map(move |mut record| {
        if record.context.is_none() {
            record.context = Some(fetched_url.clone());
        }
        record
    })
}
