//! Client code for pianote.
//!
//! This crate provides the HTTP transport, schema-driven page extraction, the
//! view-count batch resolver, the episode body reader and the pipelines that
//! tie them together for the CLI.

pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod viewer;
pub mod views;

pub use extract::library::LibraryEntry;
pub use extract::{EpisodeList, FieldSpec, NovelReport, extract_episode_list, extract_library, extract_novel};

pub use fetch::{Endpoints, FetchClient, FetchConfig, Transport};
pub use pipeline::{Pipeline, Sort};
pub use viewer::{EpisodeBody, fetch_body};
pub use views::resolve_view_counts;
