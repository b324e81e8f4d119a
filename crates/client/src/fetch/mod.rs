//! Document fetching with browser identity, timeouts and interstitial detection.
//!
//! ### Identity
//! - Desktop browser User-Agent plus `accept`, `accept-language`, and
//!   no-cache headers. Many recipe sites serve thin markup otherwise.
//!
//! ### Safety Gates
//! - Canonicalize the URL, refuse non-http(s) schemes.
//! - Resolve DNS and refuse private/reserved answers unless allowed.
//! - Redirects are limited and may not hop onto private IP literals.
//! - Bodies above `max_bytes` are rejected while streaming.
//!
//! ### Failure Kinds
//! - The whole request runs under one timeout and fails with `FETCH_TIMEOUT`.
//! - Non-2xx is `FETCH_FAILED` with a body snippet.
//! - A 2xx body carrying a challenge/consent marker is `BLOCKED`.
//!
//! Nothing is cached: every call is a fresh request.

pub mod interstitial;
pub mod ssrf;
pub mod static_pages;
pub mod url;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

pub use interstitial::detect_interstitial;
pub use ssrf::{SsrfError, ensure_public, is_private_or_reserved};
pub use static_pages::{StaticFetcher, StaticPage};
pub use self::url::{UrlError, canonicalize};

use ladle_core::{AppConfig, Error};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Retrieves page HTML for the resolver and the extraction pipeline.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body as text.
    async fn fetch_html(&self, url: &str) -> Result<String, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: desktop Chrome)
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 8 MiB)
    pub max_bytes: usize,

    /// Budget for the whole request, body included (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,

    /// Skip the private network guard (default: false)
    pub allow_private_networks: bool,

    /// Case-insensitive challenge/consent markers
    pub interstitial_markers: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            allow_private_networks: config.allow_private_networks,
            interstitial_markers: config.interstitial_markers.clone(),
        }
    }
}

/// Body of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub final_url: Url,
    /// Response body bytes
    pub bytes: Bytes,
}

impl FetchResponse {
    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// HTTP fetch client with safety checks.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

        let max_redirects = config.max_redirects;
        let guard_redirects = !config.allow_private_networks;
        let redirect = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= max_redirects {
                attempt.error(format!("more than {max_redirects} redirects"))
            } else if guard_redirects && ssrf::is_private_literal(attempt.url()) {
                let msg = format!("redirect to private address {}", attempt.url());
                attempt.error(msg)
            } else {
                attempt.follow()
            }
        });

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .redirect(redirect)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Non-2xx responses are errors. Interstitial detection is left to
    /// [`FetchClient::fetch_html`].
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let url = canonicalize(url_str)?;
        let timeout = self.config.timeout;

        match tokio::time::timeout(timeout, self.fetch_unbounded(url.clone())).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(url = %url, timeout_ms = timeout.as_millis() as u64, "fetch timed out");
                Err(Error::FetchTimeout { url: url.to_string(), timeout_ms: timeout.as_millis() as u64 })
            }
        }
    }

    async fn fetch_unbounded(&self, url: Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        if !self.config.allow_private_networks {
            ensure_public(&url).await?;
        }

        let mut response = self.http.get(url.as_str()).send().await.map_err(|e| {
            if e.is_redirect() {
                Error::HttpError(format!("redirect rejected for {url}: {e}"))
            } else {
                Error::HttpError(format!("network error for {url}: {e}"))
            }
        })?;

        let status = response.status();
        let final_url = response.url().clone();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{url}: {len} bytes exceeds {}", self.config.max_bytes)));
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response from {url}: {e}")))?
        {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(Error::FetchTooLarge(format!("{url}: body exceeds {} bytes", self.config.max_bytes)));
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        if !status.is_success() {
            tracing::debug!(url = %final_url, status = status.as_u16(), "fetch returned non-success status");
            return Err(Error::fetch_failed(status.as_u16(), final_url.as_str(), &String::from_utf8_lossy(&bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(url = %url, final_url = %final_url, elapsed_ms = fetch_ms, bytes = bytes.len(), "fetched");

        Ok(FetchResponse { final_url, bytes })
    }

    /// Fetch a page and return its HTML, failing on challenge/consent pages.
    pub async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        let response = self.fetch(url).await?;
        let html = response.text();

        if let Some(marker) = detect_interstitial(&html, &self.config.interstitial_markers) {
            tracing::warn!(url = %response.final_url, marker, "interstitial detected");
            return Err(Error::blocked(response.final_url.as_str(), marker, &html));
        }

        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for FetchClient {
    async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        FetchClient::fetch_html(self, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> FetchConfig {
        FetchConfig { allow_private_networks: true, ..FetchConfig::default() }
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { timeout_ms: 1500, max_redirects: 3, ..AppConfig::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.max_redirects, 3);
        assert!(!config.allow_private_networks);
        assert!(config.user_agent.contains("Chrome"));
        assert!(!config.interstitial_markers.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_html_sends_browser_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kimchi"))
            .and(header_exists("accept-language"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Kimchi</body></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = FetchClient::new(test_config()).unwrap();
        let html = client.fetch_html(&format!("{}/kimchi", server.uri())).await.unwrap();
        assert!(html.contains("Kimchi"));

        // the header matcher splits on commas, so compare the raw value here
        let requests = server.received_requests().await.unwrap();
        let language = requests[0].headers.get("accept-language").and_then(|v| v.to_str().ok());
        assert_eq!(language, Some(ACCEPT_LANGUAGE));
        let agent = requests[0].headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap_or_default();
        assert!(agent.contains("Chrome"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such recipe"))
            .mount(&server)
            .await;

        let client = FetchClient::new(test_config()).unwrap();
        let err = client.fetch_html(&format!("{}/missing", server.uri())).await.unwrap_err();
        match err {
            Error::FetchFailed { status, snippet, .. } => {
                assert_eq!(status, 404);
                assert_eq!(snippet, "no such recipe");
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_interstitial_on_200_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<p>Our systems have detected unusual traffic from your computer network.</p>"),
            )
            .mount(&server)
            .await;

        let client = FetchClient::new(test_config()).unwrap();
        let err = client.fetch_html(&server.uri()).await.unwrap_err();
        assert!(matches!(err, Error::Blocked { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_distinct() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let config = FetchConfig { timeout: Duration::from_millis(150), ..test_config() };
        let client = FetchClient::new(config).unwrap();
        let err = client.fetch_html(&server.uri()).await.unwrap_err();
        assert!(matches!(err, Error::FetchTimeout { timeout_ms: 150, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect_to_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
            .mount(&server)
            .await;

        let client = FetchClient::new(test_config()).unwrap();
        let response = client.fetch(&format!("{}/old", server.uri())).await.unwrap();
        assert_eq!(response.final_url.path(), "/new");
        assert_eq!(response.text(), "moved here");
    }

    #[tokio::test]
    async fn test_fetch_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
            .mount(&server)
            .await;

        let config = FetchConfig { max_bytes: 1024, ..test_config() };
        let client = FetchClient::new(config).unwrap();
        let err = client.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, Error::FetchTooLarge(_)));
    }

    #[tokio::test]
    async fn test_fetch_private_address_refused_by_default() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let err = client.fetch("http://127.0.0.1:9/recipe").await.unwrap_err();
        assert!(matches!(err, Error::PrivateAddress(_)));
    }

    #[tokio::test]
    async fn test_fetch_invalid_input_before_network() {
        let client = FetchClient::new(test_config()).unwrap();
        assert!(matches!(client.fetch("   ").await, Err(Error::InvalidInput(_))));
        assert!(matches!(client.fetch("ftp://example.com/").await, Err(Error::InvalidInput(_))));
    }
}
