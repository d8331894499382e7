//! HTTP client configuration.

use crate::request::RequestBuilder;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Maximum connections per host.
    pub pool_max_idle_per_host: usize,
    /// Enable gzip decompression.
    pub gzip: bool,
    /// Keep session cookies between requests.
    pub cookie_store: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("teller/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 10,
            gzip: true,
            cookie_store: true,
        }
    }
}

/// Build a configured HTTP client.
pub fn build_client(config: &HttpConfig, request: &RequestBuilder) -> Result<Client, HttpError> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .default_headers(request.headers().clone())
        .cookie_store(config.cookie_store);

    if config.gzip {
        builder = builder.gzip(true);
    }

    builder.build().map_err(HttpError::ClientBuild)
}

/// HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("server error: {status}")]
    ServerError { status: u16, body: String },

    #[error("client error: {status}")]
    ClientError { status: u16, body: String },
}

impl HttpError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } | Self::ClientError { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            _ => None,
        }
    }

    /// True for a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Response body of a rejected request.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::ServerError { body, .. } | Self::ClientError { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Request(e)
        }
    }
}

/// Shared HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    request: RequestBuilder,
}

impl HttpClient {
    /// Create a client for `base_url` with default config.
    pub fn new(base_url: impl Into<String>) -> Result<Self, HttpError> {
        Self::with_config(RequestBuilder::new().base_url(base_url), HttpConfig::default())
    }

    /// Create a client with custom request defaults and config.
    pub fn with_config(request: RequestBuilder, config: HttpConfig) -> Result<Self, HttpError> {
        let inner = build_client(&config, &request)?;
        Ok(Self { inner, request })
    }

    /// Resolve a path against the base URL.
    pub fn url(&self, path: &str) -> String {
        self.request.url(path)
    }

    /// Make a GET request.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, HttpError> {
        let url = self.url(path);
        tracing::debug!("Making GET request to: {}", url);
        let response = self.inner.get(&url).send().await.map_err(HttpError::from)?;
        tracing::debug!("GET response: {} {}", response.status(), url);
        Ok(response)
    }

    /// Make a POST request with JSON body.
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, HttpError> {
        let url = self.url(path);
        tracing::debug!("Making POST request to: {}", url);
        let response = self
            .inner
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(HttpError::from)?;
        tracing::debug!("POST response: {} {}", response.status(), url);
        Ok(response)
    }

    /// Make a POST request without a body.
    pub async fn post(&self, path: &str) -> Result<reqwest::Response, HttpError> {
        let url = self.url(path);
        tracing::debug!("Making POST request to: {}", url);
        let response = self.inner.post(&url).send().await.map_err(HttpError::from)?;
        tracing::debug!("POST response: {} {}", response.status(), url);
        Ok(response)
    }

    /// Check response status and convert errors.
    pub async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, HttpError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);

            return Err(HttpError::RateLimited { retry_after });
        }

        let body = response.text().await.unwrap_or_default();

        if status.is_server_error() {
            Err(HttpError::ServerError {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(HttpError::ClientError {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("teller/"));
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert!(config.gzip);
        assert!(config.cookie_store);
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("http://localhost:8000/api");
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_url_joins_base() {
        let client = HttpClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.url("/functions"), "http://localhost:8000/api/functions");
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = HttpConfig {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            user_agent: "test-agent".to_string(),
            pool_max_idle_per_host: 5,
            gzip: false,
            cookie_store: false,
        };

        let client = HttpClient::with_config(RequestBuilder::new(), config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_error_status_helpers() {
        let unauthorized = HttpError::ClientError {
            status: 401,
            body: String::new(),
        };
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.status(), Some(401));

        let server = HttpError::ServerError {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(!server.is_unauthorized());
        assert_eq!(server.body(), Some("bad gateway"));

        assert_eq!(HttpError::Timeout.status(), None);
        assert_eq!(
            HttpError::RateLimited { retry_after: None }.status(),
            Some(429)
        );
    }
}
