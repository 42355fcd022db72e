//! Core types and shared functionality for pianote.
//!
//! This crate provides:
//! - Unified error types
//! - Configuration structures
//! - The `Novel`/`Episode` domain model
//! - Date cue normalization, status resolution and episode addressing
//! - Markdown rendering

pub mod config;
pub mod error;
pub mod locate;
pub mod markdown;
pub mod model;
pub mod particle;
pub mod status;
pub mod timestamp;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use locate::{EpisodeAddress, PAGE_SIZE, locate};
pub use markdown::{episode_body_to_markdown, episode_to_markdown, novel_to_markdown};
pub use model::{Episode, EpisodeType, Novel, NovelStatus, NovelType, Ordinal, Page, Rank, Rejection};
pub use status::{PageState, Resolution};
pub use timestamp::{Timestamp, normalize};
