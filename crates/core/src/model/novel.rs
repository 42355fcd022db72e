use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;

use super::{Page, Rejection, check_count, is_printable};

/// Publication state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NovelStatus {
    #[default]
    Ongoing,
    Completed,
    Hiatus,
    Discontinued,
    Deleted,
    /// Practice submission, visible only to its author.
    Draft,
}

impl NovelStatus {
    /// Label used on the platform and as the frontmatter flag key.
    pub fn label(&self) -> &'static str {
        match self {
            NovelStatus::Ongoing => "연재 중",
            NovelStatus::Completed => "완결",
            NovelStatus::Hiatus => "연재지연",
            NovelStatus::Discontinued => "연재중단",
            NovelStatus::Deleted => "삭제",
            NovelStatus::Draft => "연습작품",
        }
    }
}

impl fmt::Display for NovelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialization and access flags. Ordered as they are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NovelType {
    Adult,
    Free,
    Plus,
    Exclusive,
    Contest,
}

impl NovelType {
    pub fn label(&self) -> &'static str {
        match self {
            NovelType::Adult => "성인",
            NovelType::Free => "자유",
            NovelType::Plus => "PLUS",
            NovelType::Exclusive => "독점",
            NovelType::Contest => "챌린지",
        }
    }
}

/// Position in the reader's-pick ranking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Rank {
    /// Displayed rank text, e.g. `40위`.
    Placed(String),
    /// The platform shows `공개전` until a rank is published.
    #[default]
    Undisclosed,
}

/// Novel metadata from the novel's main page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Novel {
    pub page: Page,
    writer: String,
    status: NovelStatus,
    types: BTreeSet<NovelType>,
    tags: Vec<String>,
    synopsis: String,
    episode_count: i64,
    alarm_count: i64,
    prefer_count: i64,
    rank: Rank,
}

impl Novel {
    pub fn new(got_time: NaiveDateTime) -> Self {
        Self {
            page: Page::new(got_time),
            writer: String::new(),
            status: NovelStatus::Ongoing,
            types: BTreeSet::new(),
            tags: Vec::new(),
            synopsis: String::new(),
            episode_count: -1,
            alarm_count: -1,
            prefer_count: -1,
            rank: Rank::Undisclosed,
        }
    }

    pub fn writer(&self) -> &str {
        &self.writer
    }

    pub fn status(&self) -> NovelStatus {
        self.status
    }

    pub fn types(&self) -> &BTreeSet<NovelType> {
        &self.types
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Raw synopsis text as shown on the page.
    pub fn synopsis(&self) -> &str {
        &self.synopsis
    }

    pub fn episode_count(&self) -> i64 {
        self.episode_count
    }

    pub fn alarm_count(&self) -> i64 {
        self.alarm_count
    }

    pub fn prefer_count(&self) -> i64 {
        self.prefer_count
    }

    pub fn rank(&self) -> &Rank {
        &self.rank
    }

    /// Deleted novels have no content to render.
    pub fn is_deleted(&self) -> bool {
        self.status == NovelStatus::Deleted
    }

    pub fn set_writer(&mut self, writer: &str) -> Result<(), Rejection> {
        if !is_printable(writer) {
            return Err(Rejection::NotPrintable { field: "writer", value: writer.to_string() });
        }
        self.writer = writer.to_string();
        Ok(())
    }

    pub fn set_status(&mut self, status: NovelStatus) {
        self.status = status;
    }

    pub fn add_type(&mut self, novel_type: NovelType) {
        self.types.insert(novel_type);
    }

    /// Replace the tag list, dropping repeats and keeping first-seen order.
    pub fn set_tags<I, S>(&mut self, tags: I) -> Result<(), Rejection>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags.into_iter().map(Into::into) {
            if !tag.is_empty() && !unique.contains(&tag) {
                unique.push(tag);
            }
        }

        if unique.is_empty() {
            return Err(Rejection::Empty { field: "tags" });
        }
        self.tags = unique;
        Ok(())
    }

    pub fn set_synopsis(&mut self, synopsis: &str) {
        self.synopsis = synopsis.to_string();
    }

    pub fn set_episode_count(&mut self, value: i64) -> Result<(), Rejection> {
        self.episode_count = check_count("episode_count", value)?;
        Ok(())
    }

    pub fn set_alarm_count(&mut self, value: i64) -> Result<(), Rejection> {
        self.alarm_count = check_count("alarm_count", value)?;
        Ok(())
    }

    pub fn set_prefer_count(&mut self, value: i64) -> Result<(), Rejection> {
        self.prefer_count = check_count("prefer_count", value)?;
        Ok(())
    }

    pub fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }
}
