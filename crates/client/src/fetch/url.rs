//! URL canonicalization and the platform's endpoint layout.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for pianote_core::Error {
    fn from(err: UrlError) -> Self {
        pianote_core::Error::InvalidUrl(err.to_string())
    }
}

/// Canonicalize a URL string.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Endpoint URLs on one platform host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    host: url::Url,
}

impl Endpoints {
    /// Build endpoints for `host`, e.g. `https://novelpia.com`.
    pub fn new(host: &str) -> Result<Self, UrlError> {
        let mut host = canonicalize(host)?;
        host.set_path("/");
        host.set_query(None);
        Ok(Self { host })
    }

    /// The host origin, used to validate URLs found on pages.
    pub fn host(&self) -> &url::Url {
        &self.host
    }

    fn join(&self, path: &str) -> Result<url::Url, UrlError> {
        self.host.join(path).map_err(|e| UrlError::InvalidUrl(e.to_string()))
    }

    /// Novel main page, `GET /novel/{code}`.
    pub fn novel(&self, code: &str) -> Result<url::Url, UrlError> {
        self.join(&format!("/novel/{code}"))
    }

    /// Episode viewer, `/viewer/{code}`.
    pub fn viewer(&self, code: &str) -> Result<url::Url, UrlError> {
        self.join(&format!("/viewer/{code}"))
    }

    /// Episode list fragment, `POST /proc/episode_list`.
    pub fn episode_list(&self) -> Result<url::Url, UrlError> {
        self.join("/proc/episode_list")
    }

    /// Novel command endpoint, `POST /proc/novel`; serves view counts.
    pub fn novel_proc(&self) -> Result<url::Url, UrlError> {
        self.join("/proc/novel")
    }

    /// Episode body, `POST /proc/viewer_data/{code}`.
    pub fn viewer_data(&self, code: &str) -> Result<url::Url, UrlError> {
        self.join(&format!("/proc/viewer_data/{code}"))
    }

    /// The logged-in reader's library, `GET /mybook/`.
    pub fn library(&self) -> Result<url::Url, UrlError> {
        self.join("/mybook/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("novelpia.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("novelpia.com"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://NOVELPIA.com/novel/1").unwrap();
        assert_eq!(url.host_str(), Some("novelpia.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://novelpia.com/novel/1#comments").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/novel/1");
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  https://novelpia.com  ").unwrap();
        assert_eq!(url.as_str(), "https://novelpia.com/");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_endpoints() {
        let endpoints = Endpoints::new("https://novelpia.com/some/path?x=1").unwrap();
        assert_eq!(endpoints.host().as_str(), "https://novelpia.com/");
        assert_eq!(endpoints.novel("15597").unwrap().as_str(), "https://novelpia.com/novel/15597");
        assert_eq!(endpoints.viewer("3790123").unwrap().as_str(), "https://novelpia.com/viewer/3790123");
        assert_eq!(endpoints.episode_list().unwrap().as_str(), "https://novelpia.com/proc/episode_list");
        assert_eq!(endpoints.novel_proc().unwrap().as_str(), "https://novelpia.com/proc/novel");
        assert_eq!(endpoints.library().unwrap().as_str(), "https://novelpia.com/mybook/");
        assert_eq!(
            endpoints.viewer_data("3790123").unwrap().as_str(),
            "https://novelpia.com/proc/viewer_data/3790123"
        );
    }

    #[test]
    fn test_url_error_converts_to_core_error() {
        let err: pianote_core::Error = UrlError::Empty.into();
        assert!(matches!(err, pianote_core::Error::InvalidUrl(_)));
    }
}
