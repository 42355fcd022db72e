//! Publication state resolution.
//!
//! A healthy novel page carries a badge strip whose labels either add a type
//! flag or override the status. A page without a title block is abnormal and
//! shows an alert modal instead; the alert text decides the terminal state.

use crate::Error;
use crate::model::{Novel, NovelStatus, NovelType};
use crate::particle::particle_for;

/// Alert for a code that never existed.
pub const ALERT_INVALID_CODE: &str = "잘못된 소설 번호 입니다.";
/// Alert for a novel removed by its author or the platform.
pub const ALERT_DELETED: &str = "삭제된 소설 입니다.";
/// Alert for a practice submission opened by someone other than its author.
pub const ALERT_DRAFT: &str = "잘못된 접근입니다.";

/// State of a novel page after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Ongoing,
    Completed,
    Hiatus,
    Discontinued,
    Deleted,
    Draft,
    InvalidCode,
}

impl PageState {
    /// Terminal states stop extraction after the title.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PageState::Deleted | PageState::Draft | PageState::InvalidCode)
    }
}

impl From<NovelStatus> for PageState {
    fn from(status: NovelStatus) -> Self {
        match status {
            NovelStatus::Ongoing => PageState::Ongoing,
            NovelStatus::Completed => PageState::Completed,
            NovelStatus::Hiatus => PageState::Hiatus,
            NovelStatus::Discontinued => PageState::Discontinued,
            NovelStatus::Deleted => PageState::Deleted,
            NovelStatus::Draft => PageState::Draft,
        }
    }
}

/// What a badge label means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Type(NovelType),
    Status(NovelStatus),
}

/// Map a badge label to its meaning. Labels outside the known set yield `None`.
pub fn classify_badge(label: &str) -> Option<Badge> {
    let badge = match label.trim() {
        "19" | "성인" => Badge::Type(NovelType::Adult),
        "자유" => Badge::Type(NovelType::Free),
        "PLUS" => Badge::Type(NovelType::Plus),
        "독점" => Badge::Type(NovelType::Exclusive),
        "챌린지" => Badge::Type(NovelType::Contest),
        "완결" => Badge::Status(NovelStatus::Completed),
        "연재지연" => Badge::Status(NovelStatus::Hiatus),
        "연재중단" => Badge::Status(NovelStatus::Discontinued),
        _ => return None,
    };
    Some(badge)
}

/// Apply a healthy page's badge labels to `novel`, starting from `Ongoing`.
pub fn apply_badges<'a, I>(novel: &mut Novel, labels: I) -> PageState
where
    I: IntoIterator<Item = &'a str>,
{
    novel.set_status(NovelStatus::Ongoing);

    for label in labels {
        match classify_badge(label) {
            Some(Badge::Type(novel_type)) => novel.add_type(novel_type),
            Some(Badge::Status(status)) => {
                if novel.status() != NovelStatus::Ongoing {
                    tracing::warn!(previous = %novel.status(), next = %status, "more than one status badge");
                }
                novel.set_status(status);
            }
            None => tracing::debug!(badge = label, "ignoring unknown badge"),
        }
    }

    novel.status().into()
}

/// Outcome of classifying an abnormal page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: PageState,
    /// Short user-facing notice.
    pub notice: String,
}

/// Classify an abnormal page from its alert message.
///
/// `novel` must already carry the page's outer title. Matching is by exact
/// equality with the known messages.
///
/// # Errors
///
/// Returns `Error::UnclassifiedAlert` with the raw text when the alert is
/// missing or not one of the known messages.
pub fn resolve_alert(novel: &mut Novel, alert: Option<&str>) -> Result<Resolution, Error> {
    let Some(raw) = alert else {
        return Err(Error::UnclassifiedAlert("no alert message on a page without a title".into()));
    };
    let message = raw.trim();
    let title = novel.page.title().to_string();

    let resolution = match message {
        ALERT_INVALID_CODE => Resolution { state: PageState::InvalidCode, notice: message.to_string() },
        ALERT_DELETED => {
            novel.set_status(NovelStatus::Deleted);
            let particle = particle_for(&title, "은");
            Resolution { state: PageState::Deleted, notice: format!("<{title}>{particle} {message}") }
        }
        ALERT_DRAFT => {
            novel.add_type(NovelType::Free);
            novel.set_status(NovelStatus::Draft);
            Resolution { state: PageState::Draft, notice: format!("<{title}>에 대한 {message}") }
        }
        _ => return Err(Error::UnclassifiedAlert(raw.to_string())),
    };

    tracing::info!(state = ?resolution.state, "{}", resolution.notice);
    Ok(resolution)
}
