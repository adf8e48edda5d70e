//! Folding link records from every source into a [`SignpostingSet`].
//!
//! The [`Aggregator`] accepts contributions in any order: header values, HTML
//! bodies, linkset documents, whole responses or pre-parsed records. On
//! [`finish`](Aggregator::finish) it:
//!
//! 1. orders records by source precedence (header, then HTML, then linkset)
//! 2. groups them by context
//! 3. classifies them into signposts, dropping non-signposting relations
//! 4. enforces cardinality: the first `cite-as`/`license` wins and a
//!    differing later one is recorded as a [`Warning::ConflictingValue`]
//!
//! The fold is deterministic, so feeding the same input twice (or with exact
//! duplicates appended) yields an equal result.

mod classify;
mod context;

pub use classify::classify;
pub use context::resolve_contexts;

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};
use url::Url;

use crate::parser::{LinkRecord, LinksetError, parse_html_links, parse_link_headers, parse_linkset};
use crate::response::{LinksetDocument, ResponseMetadata};
use crate::signposting::{Insertion, Signposting, SignpostingSet, Warning};

use context::assign_default_context;

/// Collects link records and folds them into a [`SignpostingSet`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    context_url: Url,
    records: Vec<LinkRecord>,
    warnings: Vec<Warning>,
}

impl Aggregator {
    /// Starts an aggregation whose primary context is `context_url`.
    #[must_use]
    pub fn new(context_url: Url) -> Self {
        Self {
            context_url,
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn context_url(&self) -> &Url {
        &self.context_url
    }

    /// Adds `Link` header values received from `url`.
    pub fn add_header_values<S: AsRef<str>>(&mut self, values: &[S], url: &Url) -> &mut Self {
        let parsed = parse_link_headers(values, Some(url));
        debug!(%url, %parsed, "Adding header links");
        self.records
            .extend(assign_default_context(parsed.links, url));
        self
    }

    /// Adds `<link>` elements of an HTML page served at `url`.
    pub fn add_html(&mut self, html: &str, url: &Url) -> &mut Self {
        let links = parse_html_links(html, url);
        debug!(%url, links = links.len(), "Adding HTML links");
        self.records.extend(assign_default_context(links, url));
        self
    }

    /// Adds a linkset document.
    ///
    /// A document that cannot be parsed contributes a
    /// [`Warning::MalformedDocument`] instead of links.
    pub fn add_linkset(&mut self, document: &LinksetDocument) -> &mut Self {
        match parse_linkset(&document.body, document.format, &document.url) {
            Ok(parsed) => {
                debug!(url = %document.url, %parsed, "Adding linkset links");
                self.records
                    .extend(assign_default_context(parsed.links, &document.url));
            }
            Err(e) => self.add_malformed(&document.url, &e),
        }
        self
    }

    /// Adds everything one response offers: its status warning, its `Link`
    /// headers and, for HTML/XML bodies, its `<link>` elements.
    pub fn add_response(&mut self, response: &ResponseMetadata) -> &mut Self {
        if let Some(warning) = response.status_warning() {
            self.add_warning(warning);
        }
        self.add_header_values(&response.link_headers, &response.url);
        if response.has_html_body()
            && let Some(body) = &response.body
        {
            let html = String::from_utf8_lossy(body);
            self.add_html(&html, &response.url);
        }
        self
    }

    /// Adds pre-parsed records. Records without context describe
    /// [`context_url`](Self::context_url).
    pub fn add_records(&mut self, records: impl IntoIterator<Item = LinkRecord>) -> &mut Self {
        self.records
            .extend(assign_default_context(records, &self.context_url));
        self
    }

    /// Records a response-level warning, ignoring exact repeats.
    pub fn add_warning(&mut self, warning: Warning) -> &mut Self {
        if !self.warnings.contains(&warning) {
            warn!(%warning, "Signposting warning");
            self.warnings.push(warning);
        }
        self
    }

    pub(crate) fn add_malformed(&mut self, url: &Url, error: &LinksetError) {
        self.add_warning(Warning::MalformedDocument {
            url: url.clone(),
            reason: error.to_string(),
        });
    }

    /// Number of records collected so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Folds every contribution into the final result.
    #[must_use]
    pub fn finish(self) -> SignpostingSet {
        let Self {
            context_url,
            mut records,
            warnings,
        } = self;

        // Stable: equal sources keep their arrival order.
        records.sort_by_key(|record| record.source);
        let total = records.len();

        let mut contexts = BTreeMap::new();
        for (context, group) in resolve_contexts(records, &context_url) {
            let signposting = fold_context(&context, &group);
            if signposting.is_empty() && signposting.warnings().is_empty() {
                trace!(%context, "No signposting for context");
                continue;
            }
            contexts.insert(context, signposting);
        }

        let set = SignpostingSet::new(context_url, contexts, warnings);
        info!(
            context = %set.context_url(),
            records = total,
            signposts = set.contexts().map(Signposting::len).sum::<usize>(),
            contexts = set.contexts().count(),
            "Signposting aggregated"
        );
        set
    }
}

fn fold_context(context: &Url, records: &[LinkRecord]) -> Signposting {
    let mut signposting = Signposting::new(context.clone());
    for record in records {
        let Some(signpost) = classify(record) else {
            continue;
        };
        let rel = signpost.rel();
        let ignored = signpost.target().clone();
        match signposting.insert(signpost) {
            Insertion::Added => {}
            Insertion::Duplicate => trace!(%context, %rel, href = %ignored, "Duplicate signpost"),
            Insertion::Conflict { kept } => {
                let warning = Warning::ConflictingValue {
                    context: context.clone(),
                    rel,
                    kept,
                    ignored,
                };
                if !signposting.warnings().contains(&warning) {
                    warn!(
                        %context,
                        %rel,
                        source = %record.source,
                        "{warning}"
                    );
                    signposting.push_warning(warning);
                }
            }
        }
    }
    signposting
}

/// Signposting from the `Link` header values of a response at `url`.
#[must_use]
pub fn find_signposting_http_link<S: AsRef<str>>(values: &[S], url: &Url) -> SignpostingSet {
    let mut aggregator = Aggregator::new(url.clone());
    aggregator.add_header_values(values, url);
    aggregator.finish()
}

/// Signposting from the `<link>` elements of an HTML page at `url`.
#[must_use]
pub fn find_signposting_html_links(html: &str, url: &Url) -> SignpostingSet {
    let mut aggregator = Aggregator::new(url.clone());
    aggregator.add_html(html, url);
    aggregator.finish()
}

/// Signposting from a single linkset document.
///
/// The primary context is the linkset's own URL; the described resources
/// usually appear under [`SignpostingSet::other_contexts`].
///
/// # Errors
///
/// Returns [`LinksetError`] when the document cannot be parsed.
pub fn find_signposting_linkset_document(
    document: &LinksetDocument,
) -> Result<SignpostingSet, LinksetError> {
    let parsed = parse_linkset(&document.body, document.format, &document.url)?;
    let mut aggregator = Aggregator::new(document.url.clone());
    aggregator.add_records(parsed.links);
    Ok(aggregator.finish())
}
