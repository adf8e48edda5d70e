//! HTTP client performing signposting discovery.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{Client, ClientBuilder, Method, Proxy};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::DiscoveryError;
use super::{ACCEPT_HTML, ACCEPT_LINKSET, DiscoveryConfig};
use crate::aggregate::Aggregator;
use crate::parser::{LinksetFormat, parse_linkset};
use crate::response::{LinksetDocument, ResponseMetadata, is_html_content_type};
use crate::signpost::LinkRel;
use crate::signposting::{SignpostingSet, Warning};

/// Async client for discovering signposting of web resources.
///
/// Create once and reuse; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use signposting::discovery::{DiscoveryConfig, SignpostingClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SignpostingClient::new(DiscoveryConfig::default())?;
/// let set = client.find_signposting("https://example.org/record/1").await?;
/// if let Some(pid) = set.primary().cite_as() {
///     println!("Cite as {}", pid.target());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SignpostingClient {
    client: Client,
    config: DiscoveryConfig,
}

impl SignpostingClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::ClientBuild`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Signposting from the `Link` headers of a `HEAD` request.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] for invalid URLs, network failures and
    /// error statuses other than `410`.
    #[instrument(level = "debug", skip(self))]
    pub async fn find_signposting_http(&self, url: &str) -> Result<SignpostingSet, DiscoveryError> {
        let url = parse_http_url(url)?;
        let response = self.fetch(Method::HEAD, &url, ACCEPT_HTML, false).await?;

        let mut aggregator = Aggregator::new(response.url.clone());
        aggregator.add_response(&response);
        Ok(aggregator.finish())
    }

    /// Signposting from the `<link>` elements of an HTML page.
    ///
    /// `Link` headers of the same response are not consulted.
    ///
    /// # Errors
    ///
    /// As [`find_signposting_http`](Self::find_signposting_http), plus
    /// [`DiscoveryError::UnrecognizedContentType`] when the response is not
    /// HTML or XHTML.
    #[instrument(level = "debug", skip(self))]
    pub async fn find_signposting_html(&self, url: &str) -> Result<SignpostingSet, DiscoveryError> {
        let url = parse_http_url(url)?;
        let response = self.fetch(Method::GET, &url, ACCEPT_HTML, true).await?;

        let mut aggregator = Aggregator::new(response.url.clone());
        if let Some(warning) = response.status_warning() {
            aggregator.add_warning(warning);
        }
        if response.status != 204 {
            if !response.has_html_body() {
                if response.content_type.as_deref().is_some_and(is_html_content_type) {
                    debug!(url = %response.url, "Empty HTML body");
                } else {
                    return Err(DiscoveryError::unrecognized_content_type(
                        response.url.as_str(),
                        response.content_type.as_deref(),
                        "text/html or application/xhtml+xml",
                    ));
                }
            }
            if let Some(body) = &response.body {
                aggregator.add_html(&String::from_utf8_lossy(body), &response.url);
            }
        }
        Ok(aggregator.finish())
    }

    /// Signposting from a linkset document.
    ///
    /// With `format` set, only that serialization is requested and accepted;
    /// otherwise both are negotiated and the response `Content-Type` decides.
    ///
    /// # Errors
    ///
    /// As [`find_signposting_http`](Self::find_signposting_http), plus
    /// [`DiscoveryError::UnrecognizedContentType`] for a mismatching content
    /// type and [`DiscoveryError::Linkset`] for a malformed document.
    #[instrument(level = "debug", skip(self))]
    pub async fn find_signposting_linkset(
        &self,
        url: &str,
        format: Option<LinksetFormat>,
    ) -> Result<SignpostingSet, DiscoveryError> {
        let url = parse_http_url(url)?;
        let (response, document) = self.fetch_linkset(&url, format).await?;

        let parsed = parse_linkset(&document.body, document.format, &document.url)
            .map_err(|e| DiscoveryError::linkset(document.url.as_str(), e))?;
        let mut aggregator = Aggregator::new(document.url.clone());
        if let Some(warning) = response.status_warning() {
            aggregator.add_warning(warning);
        }
        aggregator.add_records(parsed.links);
        Ok(aggregator.finish())
    }

    /// Full discovery: `Link` headers and HTML of a `GET`, then every linkset
    /// the landing page points to, up to `max_linksets`.
    ///
    /// A linkset that cannot be fetched or parsed becomes a
    /// [`Warning::MalformedDocument`]; the rest of the result stands.
    ///
    /// # Errors
    ///
    /// As [`find_signposting_http`](Self::find_signposting_http), for the
    /// landing page only.
    #[instrument(level = "debug", skip(self))]
    pub async fn find_signposting(&self, url: &str) -> Result<SignpostingSet, DiscoveryError> {
        let url = parse_http_url(url)?;
        let response = self.fetch(Method::GET, &url, ACCEPT_HTML, true).await?;

        let mut aggregator = Aggregator::new(response.url.clone());
        aggregator.add_response(&response);

        let linksets: Vec<(Url, Option<LinksetFormat>)> = aggregator
            .clone()
            .finish()
            .primary()
            .for_rel(LinkRel::Linkset)
            .into_iter()
            .map(|signpost| {
                let format = signpost
                    .media_type()
                    .and_then(|t| LinksetFormat::from_content_type(t.as_str()));
                (signpost.target().clone(), format)
            })
            .collect();

        if linksets.len() > self.config.max_linksets {
            warn!(
                found = linksets.len(),
                max = self.config.max_linksets,
                "Too many linksets; following only the first ones"
            );
        }

        for (linkset_url, format) in linksets.into_iter().take(self.config.max_linksets) {
            if linkset_url == response.url {
                continue;
            }
            match self.fetch_linkset(&linkset_url, format).await {
                Ok((linkset_response, document)) => {
                    if let Some(warning) = linkset_response.status_warning() {
                        aggregator.add_warning(warning);
                    }
                    aggregator.add_linkset(&document);
                }
                Err(e) => {
                    aggregator.add_warning(Warning::MalformedDocument {
                        url: linkset_url,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(aggregator.finish())
    }

    async fn fetch_linkset(
        &self,
        url: &Url,
        format: Option<LinksetFormat>,
    ) -> Result<(ResponseMetadata, LinksetDocument), DiscoveryError> {
        let accept = format.map_or(ACCEPT_LINKSET, LinksetFormat::media_type);
        let mut response = self.fetch(Method::GET, url, accept, true).await?;

        let detected = response
            .content_type
            .as_deref()
            .and_then(LinksetFormat::from_content_type);
        let format = match (format, detected) {
            (Some(wanted), Some(got)) if wanted == got => got,
            (None, Some(got)) => got,
            _ => {
                return Err(DiscoveryError::unrecognized_content_type(
                    response.url.as_str(),
                    response.content_type.as_deref(),
                    format.map_or("application/linkset or application/linkset+json", LinksetFormat::media_type),
                ));
            }
        };

        let body = response.body.take().unwrap_or_default();
        let document = LinksetDocument::new(response.url.clone(), format, body);
        Ok((response, document))
    }

    async fn fetch(
        &self,
        method: Method,
        url: &Url,
        accept: &str,
        read_body: bool,
    ) -> Result<ResponseMetadata, DiscoveryError> {
        debug!(%method, %url, accept, "Sending request");
        let response = self
            .client
            .request(method, url.clone())
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| DiscoveryError::from_reqwest(url.as_str(), e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        if final_url != *url {
            debug!(%url, %final_url, "Followed redirect");
        }
        if status >= 400 && status != 410 {
            return Err(DiscoveryError::http_status(final_url.as_str(), status));
        }

        let link_headers: Vec<String> = response
            .headers()
            .get_all(LINK)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        let body = if read_body && status != 204 {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| DiscoveryError::from_reqwest(final_url.as_str(), e))?;
            Some(bytes.to_vec())
        } else {
            None
        };

        info!(
            url = %final_url,
            status,
            link_headers = link_headers.len(),
            content_type = content_type.as_deref().unwrap_or_default(),
            "Response received"
        );

        Ok(ResponseMetadata {
            url: final_url,
            status,
            link_headers,
            content_type,
            body,
        })
    }
}

fn parse_http_url(url: &str) -> Result<Url, DiscoveryError> {
    let parsed = Url::parse(url.trim()).map_err(|_| DiscoveryError::invalid_url(url))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(DiscoveryError::invalid_url(url)),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

/// Builds the shared client: connect/read timeouts, project User-Agent, gzip.
///
/// Some sandboxed environments panic while reading system proxy settings; in
/// that case the client is rebuilt with only environment proxies.
fn build_http_client(config: &DiscoveryConfig) -> Result<Client, DiscoveryError> {
    match try_build_client(config, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(config, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(DiscoveryError::client_build(
                    "client construction panicked while reading proxy settings",
                )),
                Err(BuildClientFailure::Build(error)) => {
                    Err(DiscoveryError::client_build(error.to_string()))
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(DiscoveryError::client_build(error.to_string())),
    }
}

fn try_build_client(
    config: &DiscoveryConfig,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(|| {
        let mut builder = base_builder(config);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(config: &DiscoveryConfig) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .user_agent(config.user_agent.clone())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    for (scheme, names) in [
        ("https", ["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        ("http", ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
    ] {
        let Some(proxy) = first_env_var(&names) else {
            continue;
        };
        let resolved = if scheme == "https" {
            Proxy::https(&proxy)
        } else {
            Proxy::http(&proxy)
        };
        if let Ok(resolved) = resolved {
            builder = builder.proxy(resolved);
        }
    }
    builder
}

fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url_accepts_http_and_https() {
        assert!(parse_http_url("https://example.org/").is_ok());
        assert!(parse_http_url(" http://example.org/x ").is_ok());
    }

    #[test]
    fn test_parse_http_url_rejects_other_input() {
        assert!(matches!(
            parse_http_url("not a url"),
            Err(DiscoveryError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_http_url("ftp://example.org/file"),
            Err(DiscoveryError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_client_builds_with_default_config() {
        let client = SignpostingClient::new(DiscoveryConfig::default()).unwrap();
        assert_eq!(client.config().max_linksets, 5);
    }
}
