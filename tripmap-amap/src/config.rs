//! Connection settings for the AMap web services.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Default user agent for AMap requests.
pub const DEFAULT_USER_AGENT: &str = "tripmap-amap/0.1";

/// Default base URL of the AMap REST API.
pub const DEFAULT_REST_BASE_URL: &str = "https://restapi.amap.com";

/// Default URL of the AMap web loader resource.
pub const DEFAULT_LOADER_URL: &str = "https://webapi.amap.com/maps";

/// Loader API version requested at bootstrap.
pub const LOADER_VERSION: &str = "2.0";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while building AMap clients.
#[derive(Debug, Error)]
pub enum AmapBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// A configured URL does not parse.
    #[error("invalid {field} '{url}': {source}")]
    InvalidUrl {
        /// Which setting held the URL.
        field: &'static str,
        /// The rejected value.
        url: String,
        /// Parser diagnostic.
        #[source]
        source: url::ParseError,
    },
}

/// Configuration for the AMap provider.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tripmap_amap::AmapConfig;
/// ///
/// let config = AmapConfig::new()
///     .with_rest_base_url("http://localhost:8080")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.rest_base_url, "http://localhost:8080");
/// ```
#[derive(Debug, Clone)]
pub struct AmapConfig {
    /// Base URL of the REST direction services.
    pub rest_base_url: String,
    /// URL of the web loader resource fetched at bootstrap.
    pub loader_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AmapConfig {
    /// Configuration with the public AMap endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rest_base_url: DEFAULT_REST_BASE_URL.to_owned(),
            loader_url: DEFAULT_LOADER_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Point the direction services at another host.
    #[must_use]
    pub fn with_rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = url.into();
        self
    }

    /// Fetch the loader resource from another URL.
    #[must_use]
    pub fn with_loader_url(mut self, url: impl Into<String>) -> Self {
        self.loader_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn build_client(&self) -> Result<Client, AmapBuildError> {
        Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(self.timeout)
            .timeout(self.timeout)
            .build()
            .map_err(AmapBuildError::HttpClient)
    }

    pub(crate) fn loader(&self) -> Result<Url, AmapBuildError> {
        parse_url("loader_url", &self.loader_url)
    }

    pub(crate) fn rest_base(&self) -> Result<Url, AmapBuildError> {
        parse_url("rest_base_url", &self.rest_base_url)
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, AmapBuildError> {
    Url::parse(raw).map_err(|source| AmapBuildError::InvalidUrl {
        field,
        url: raw.to_owned(),
        source,
    })
}
