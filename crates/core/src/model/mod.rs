//! Domain model for novels and episodes.
//!
//! `Novel` and `Episode` embed a shared [`Page`] and guard every field behind a
//! setter that returns [`Rejection`] for out-of-domain values. A rejected
//! value leaves the field as it was; callers log the rejection and continue.

mod episode;
mod novel;
mod page;

pub use episode::{Episode, EpisodeType, Ordinal};
pub use novel::{Novel, NovelStatus, NovelType, Rank};
pub use page::Page;

/// Why a setter refused a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("{field} must be non-empty and printable: {value:?}")]
    NotPrintable { field: &'static str, value: String },

    #[error("code must be a positive integer: {0:?}")]
    Code(String),

    #[error("url {url} is not on {expected}")]
    ForeignUrl { url: String, expected: String },

    #[error("{field} must be -1 or greater: {value}")]
    Count { field: &'static str, value: i64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("unrecognized episode ordinal: {0:?}")]
    Ordinal(String),
}

/// Non-empty with no control characters.
pub(crate) fn is_printable(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_control)
}

/// Counts use -1 for "not resolved".
pub(crate) fn check_count(field: &'static str, value: i64) -> Result<i64, Rejection> {
    if value < -1 { Err(Rejection::Count { field, value }) } else { Ok(value) }
}
