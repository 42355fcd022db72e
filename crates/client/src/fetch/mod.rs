//! HTTP transport for the platform's pages and form endpoints.
//!
//! ### Transport seam
//! - Pipelines talk to the [`Transport`] trait: GET and form POST with custom
//!   headers, returning the body as text.
//! - Connection failures map to `Error::Transport`, non-2xx responses to
//!   `Error::HttpError`.
//!
//! ### Safety gates
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//! - No retries; callers re-run the pipeline.

pub mod cookies;
pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, RequestBuilder, Url};
use std::time::{Duration, Instant};

pub use cookies::{login_cookie, login_headers, novel_headers, npd_cookie};
pub use url::{Endpoints, UrlError, canonicalize};

use pianote_core::{AppConfig, Error};

/// Form body as ordered pairs; keys may repeat.
pub type Form = [(String, String)];

/// Minimal HTTP surface the pipelines need.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`, returning the response body.
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<String, Error>;

    /// POST `form` as `application/x-www-form-urlencoded`, returning the response body.
    async fn post_form(&self, url: &Url, form: &Form, headers: &HeaderMap) -> Result<String, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: desktop Chrome)
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
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
            max_redirects: 5,
        }
    }
}

/// reqwest-backed [`Transport`].
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Send a prepared request and read the body within the byte limit.
    async fn read(&self, request: RequestBuilder, url: &Url) -> Result<String, Error> {
        let start = Instant::now();

        let response = request.send().await.map_err(|e| Error::Transport(format!("{}: {}", url, e)))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("{} returned status {}", url, status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), bytes.len());

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl Transport for FetchClient {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<String, Error> {
        let request = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .headers(headers.clone());
        self.read(request, url).await
    }

    async fn post_form(&self, url: &Url, form: &Form, headers: &HeaderMap) -> Result<String, Error> {
        let request = self.http.post(url.clone()).form(form).headers(headers.clone());
        self.read(request, url).await
    }
}
