//! Signposting discovery over HTTP.
//!
//! Thin async orchestrators around the pure core: they fetch a resource,
//! turn the response into [`ResponseMetadata`](crate::response::ResponseMetadata)
//! or a [`LinksetDocument`](crate::response::LinksetDocument), and hand it to
//! the [`Aggregator`](crate::aggregate::Aggregator).
//!
//! | Operation | Request | Reads |
//! |---|---|---|
//! | [`SignpostingClient::find_signposting_http`] | `HEAD` | `Link` headers |
//! | [`SignpostingClient::find_signposting_html`] | `GET` | HTML `<link>` elements |
//! | [`SignpostingClient::find_signposting_linkset`] | `GET` | linkset document |
//! | [`SignpostingClient::find_signposting`] | `GET` | all of the above, following `rel=linkset` |

mod client;
mod error;

pub use client::SignpostingClient;
pub use error::DiscoveryError;

use crate::user_agent;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Default number of `rel=linkset` documents followed by
/// [`SignpostingClient::find_signposting`].
pub const DEFAULT_MAX_LINKSETS: usize = 5;

/// `Accept` header for landing pages.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9";

/// `Accept` header for linksets of unknown serialization.
pub const ACCEPT_LINKSET: &str =
    "application/linkset+json,application/linkset;q=0.9,application/json;q=0.3,text/plain;q=0.2";

/// HTTP settings for a [`SignpostingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub read_timeout_secs: u64,
    /// `User-Agent` header value
    pub user_agent: String,
    /// Upper bound on linksets followed from one landing page
    pub max_linksets: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            user_agent: user_agent::default_user_agent(),
            max_linksets: DEFAULT_MAX_LINKSETS,
        }
    }
}
