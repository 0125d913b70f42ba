//! Client configuration: endpoints and ambient credentials.

use std::borrow::Cow;
use std::time::Duration;

/// Main API endpoint used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.turso.tech/v1";

/// Region-discovery endpoint used when none is configured.
pub const DEFAULT_REGION_URL: &str = "https://region.turso.io";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints and context read by every operation.
///
/// Held by value inside [`crate::Client`]; changing it requires
/// `&mut Client`, so it cannot change under an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub region_url: String,
    pub api_token: Option<String>,
    pub org_name: String,
    pub group_name: String,
    /// Applied to every request that does not carry its own deadline.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            region_url: DEFAULT_REGION_URL.to_string(),
            api_token: None,
            org_name: String::new(),
            group_name: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// Reads:
    /// - `DBPU_BASE_URL` (default: [`DEFAULT_BASE_URL`])
    /// - `DBPU_REGION_URL` (default: [`DEFAULT_REGION_URL`])
    /// - `TURSO_API_TOKEN`
    /// - `TURSO_ORG`
    /// - `TURSO_GROUP`
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let mut config = Self::default();
        if let Some(url) = var("DBPU_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(url) = var("DBPU_REGION_URL") {
            config = config.with_region_url(url);
        }
        config.api_token = var("TURSO_API_TOKEN");
        config.org_name = var("TURSO_ORG").unwrap_or_default();
        config.group_name = var("TURSO_GROUP").unwrap_or_default();
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.set_base_url(url);
        self
    }

    pub fn with_region_url(mut self, url: impl Into<String>) -> Self {
        self.region_url = trim_url(url.into());
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.set_api_token(token);
        self
    }

    pub fn with_org_name(mut self, name: impl Into<String>) -> Self {
        self.set_org_name(name);
        self
    }

    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.set_group_name(name);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.base_url = trim_url(url.into());
    }

    pub fn set_api_token(&mut self, token: impl Into<String>) {
        self.api_token = Some(token.into());
    }

    pub fn set_org_name(&mut self, name: impl Into<String>) {
        self.org_name = name.into();
    }

    pub fn set_group_name(&mut self, name: impl Into<String>) {
        self.group_name = name.into();
    }

    /// `path` joined onto the main API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `path` joined onto `/organizations/{org}`.
    pub fn org_url(&self, path: &str) -> String {
        format!("{}/organizations/{}{path}", self.base_url, segment(&self.org_name))
    }

    /// `path` joined onto `/organizations/{org}/groups/{group}`.
    pub fn group_url(&self, path: &str) -> String {
        format!(
            "{}/organizations/{}/groups/{}{path}",
            self.base_url,
            segment(&self.org_name),
            segment(&self.group_name)
        )
    }
}

/// Percent-encode `value` as a single path segment, `/` included.
pub(crate) fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.turso.tech/v1");
        assert_eq!(config.region_url, "https://region.turso.io");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new().with_base_url("http://localhost:3000/v1/");
        assert_eq!(config.url("/locations"), "http://localhost:3000/v1/locations");
    }

    #[test]
    fn scoped_urls_use_org_and_group() {
        let config = ClientConfig::new()
            .with_base_url("http://localhost:3000/v1")
            .with_org_name("acme")
            .with_group_name("default");
        assert_eq!(
            config.org_url("/databases"),
            "http://localhost:3000/v1/organizations/acme/databases"
        );
        assert_eq!(
            config.group_url("/auth/rotate"),
            "http://localhost:3000/v1/organizations/acme/groups/default/auth/rotate"
        );
    }

    #[test]
    fn scoped_names_stay_in_their_segment() {
        let config = ClientConfig::new()
            .with_base_url("http://localhost:3000/v1")
            .with_org_name("acme/../other")
            .with_group_name("eu west");
        assert_eq!(
            config.group_url("/auth/rotate"),
            "http://localhost:3000/v1/organizations/acme%2F..%2Fother/groups/eu%20west/auth/rotate"
        );
        assert_eq!(segment("db-1_a.b~c"), "db-1_a.b~c");
    }

    #[test]
    fn from_env_reads_overrides() {
        temp_env::with_vars(
            [
                ("DBPU_BASE_URL", Some("http://127.0.0.1:9/v1/")),
                ("DBPU_REGION_URL", None),
                ("TURSO_API_TOKEN", Some("secret")),
                ("TURSO_ORG", Some("acme")),
                ("TURSO_GROUP", Some("")),
            ],
            || {
                let config = ClientConfig::from_env();
                assert_eq!(config.base_url, "http://127.0.0.1:9/v1");
                assert_eq!(config.region_url, DEFAULT_REGION_URL);
                assert_eq!(config.api_token.as_deref(), Some("secret"));
                assert_eq!(config.org_name, "acme");
                assert_eq!(config.group_name, "");
            },
        );
    }
}
