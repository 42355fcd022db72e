use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::{Page, Rejection, check_count};

/// Episode access flags, derived from the badge class tokens in a list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EpisodeType {
    Free,
    Plus,
    Adult,
}

impl EpisodeType {
    pub fn label(&self) -> &'static str {
        match self {
            EpisodeType::Free => "자유",
            EpisodeType::Plus => "PLUS",
            EpisodeType::Adult => "성인",
        }
    }
}

/// Display number of an episode within its novel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    /// `EP.N`; 0 is a prologue.
    Number(u32),
    /// Bonus episodes carry no number.
    Bonus,
}

impl FromStr for Ordinal {
    type Err = Rejection;

    /// Parses the list label, `EP.12` or `BONUS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label == "BONUS" {
            return Ok(Ordinal::Bonus);
        }
        label
            .strip_prefix("EP.")
            .and_then(|n| n.parse().ok())
            .map(Ordinal::Number)
            .ok_or_else(|| Rejection::Ordinal(s.to_string()))
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordinal::Number(n) => write!(f, "{n}"),
            Ordinal::Bonus => f.write_str("BONUS"),
        }
    }
}

/// Episode metadata from one row of an episode list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub page: Page,
    types: BTreeSet<EpisodeType>,
    ordinal: Option<Ordinal>,
    letter_count: i64,
    comment_count: i64,
}

impl Episode {
    pub fn new(got_time: NaiveDateTime) -> Self {
        Self { page: Page::new(got_time), types: BTreeSet::new(), ordinal: None, letter_count: -1, comment_count: -1 }
    }

    pub fn types(&self) -> &BTreeSet<EpisodeType> {
        &self.types
    }

    pub fn ordinal(&self) -> Option<Ordinal> {
        self.ordinal
    }

    pub fn letter_count(&self) -> i64 {
        self.letter_count
    }

    pub fn comment_count(&self) -> i64 {
        self.comment_count
    }

    /// Reserved rows expose only a code; nothing else can be rendered.
    pub fn is_content_less(&self) -> bool {
        self.page.title().is_empty()
    }

    pub fn add_type(&mut self, episode_type: EpisodeType) {
        self.types.insert(episode_type);
    }

    pub fn set_ordinal(&mut self, ordinal: Ordinal) {
        self.ordinal = Some(ordinal);
    }

    pub fn set_letter_count(&mut self, value: i64) -> Result<(), Rejection> {
        self.letter_count = check_count("letter_count", value)?;
        Ok(())
    }

    pub fn set_comment_count(&mut self, value: i64) -> Result<(), Rejection> {
        self.comment_count = check_count("comment_count", value)?;
        Ok(())
    }
}
