//! Unified error types for pianote.
//!
//! Every variant renders with a stable code prefix so diagnostics name the
//! stage that failed.

/// Unified error types for the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., ordinal 0 for a novel without a prologue).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Connection refused, timed out, or the body could not be read.
    #[error("TRANSPORT_FAILED: {0}")]
    Transport(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Response body exceeded the configured limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// A selector in a field schema failed to parse.
    #[error("INVALID_SELECTOR: {0}")]
    InvalidSelector(String),

    /// A required field's element was not found on the page.
    #[error("FIELD_MISSING: {0}")]
    MissingField(String),

    /// A field's element was found but its value could not be transformed.
    #[error("FIELD_PARSE: {field}: {value:?}")]
    FieldParse { field: String, value: String },

    /// Date/time text matched none of the known shapes, or an ISO timestamp was malformed.
    #[error("MALFORMED_TIMESTAMP: {0}")]
    MalformedTimestamp(String),

    /// The platform returned an alert message outside the known set.
    #[error("UNCLASSIFIED_ALERT: {0}")]
    UnclassifiedAlert(String),

    /// The batched view-count request produced nothing usable.
    #[error("VIEW_COUNTS_UNRESOLVED: {0}")]
    ViewCountsUnresolved(String),

    /// The requested episode row does not exist on its list page.
    #[error("EPISODE_NOT_FOUND: {0}")]
    EpisodeNotFound(String),

    /// The viewer returned no readable body for an episode.
    #[error("BODY_UNAVAILABLE: {0}")]
    BodyUnavailable(String),
}

impl Error {
    /// Whether the failure happened before any page content was available.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::HttpError(_) | Error::FetchTooLarge(_))
    }
}
