//! User-Agent string for discovery requests.
//!
//! Signposting is read from third-party repositories, so requests identify the
//! tool and where to find it (RFC 9308).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://signposting.org/";

/// Default User-Agent for HEAD/GET discovery requests.
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("signposting/{version} (fair-signposting-client; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_has_version_and_project_url() {
        let ua = default_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("signposting/")
                .and_then(|s| s.split(' ').next())
                .unwrap(),
            "UA must contain crate version"
        );
    }

    #[test]
    fn test_user_agent_identifies_purpose() {
        assert!(default_user_agent().contains("fair-signposting-client"));
    }
}
