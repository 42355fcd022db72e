//! Episode list extraction.
//!
//! One list page holds up to twenty `tr.ep_style5` rows. Published rows carry
//! type badges, stats and a view-count placeholder whose class names the
//! episode code; reserved rows carry only a viewer link and their scheduled date.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html};

use super::{
    Accessor, FieldSpec, Transform, Value, extract_all, extract_field, optional_integer, select_scopes, warn_rejected,
};
use crate::fetch::Endpoints;
use pianote_core::{Episode, EpisodeType, Error, Ordinal, normalize};

/// Episode rows within a list page.
pub const ROW_SELECTOR: &str = "tr.ep_style5";

/// Label of the prologue row.
pub const PROLOGUE_LABEL: &str = "EP.0";

/// Field table for one episode row.
#[derive(Debug, Clone, Copy)]
pub struct RowSchema {
    pub title: FieldSpec,
    pub types: FieldSpec,
    pub ordinal: FieldSpec,
    pub code: FieldSpec,
    pub reserved_code: FieldSpec,
    pub letter_count: FieldSpec,
    pub comment_count: FieldSpec,
    pub count_good: FieldSpec,
    pub date: FieldSpec,
}

pub const ROW: RowSchema = RowSchema {
    title: FieldSpec::text("title", "b i").read(Accessor::NextText),
    types: FieldSpec::text("types", "b span.s_inv").read(Accessor::ClassToken("b_")).optional(),
    ordinal: FieldSpec::text("ordinal", "div.ep_style2 font span"),
    code: FieldSpec::text("code", ".episode_count_view")
        .read(Accessor::ClassToken("novel_count_view_"))
        .then(Transform::StripPrefix("novel_count_view_")),
    reserved_code: FieldSpec::text("code", "td.font12")
        .read(Accessor::Attr("onclick"))
        .then(Transform::Between("/viewer/", "'")),
    letter_count: FieldSpec::text("letter_count", "i.ion-document-text")
        .read(Accessor::NextText)
        .then(Transform::Integer(None))
        .optional(),
    comment_count: FieldSpec::text("comment_count", "i.ion-chatbox-working")
        .read(Accessor::NextText)
        .then(Transform::Integer(None))
        .optional(),
    count_good: FieldSpec::text("count_good", "i.ion-thumbsup")
        .read(Accessor::NextText)
        .then(Transform::Integer(None))
        .optional(),
    date: FieldSpec::text("date", "b").nth(2),
};

/// Badge class token to episode type. Tokens outside this set carry no type.
pub fn badge_type(token: &str) -> Option<EpisodeType> {
    match token {
        "b_free" => Some(EpisodeType::Free),
        "b_plus" => Some(EpisodeType::Plus),
        "b_19" => Some(EpisodeType::Adult),
        _ => None,
    }
}

/// Rows of one list page, in page order.
#[derive(Debug, Clone, Default)]
pub struct EpisodeList {
    /// Ordinal label of the first row, as shown (`EP.0`, `EP.12`, `BONUS`).
    pub first_label: Option<String>,
    pub episodes: Vec<Episode>,
}

impl EpisodeList {
    /// Whether the list starts with a prologue. Meaningful for page 1 sorted oldest first.
    pub fn starts_with_prologue(&self) -> bool {
        self.first_label.as_deref() == Some(PROLOGUE_LABEL)
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Episode at a 1-based index within the page.
    pub fn get(&self, index: u32) -> Option<&Episode> {
        let index = usize::try_from(index).ok()?.checked_sub(1)?;
        self.episodes.get(index)
    }
}

/// Extract every row of an episode list page.
///
/// Relative dates are resolved against `reference`. A row missing a required
/// field is logged and kept as a content-less episode so row positions hold.
///
/// # Errors
///
/// - `Error::MalformedTimestamp` when a row's date matches no known shape
/// - `Error::InvalidSelector` if a schema selector does not parse
pub fn extract_episode_list(
    html: &str, endpoints: &Endpoints, got_time: NaiveDateTime, reference: NaiveDateTime,
) -> Result<EpisodeList, Error> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let rows = select_scopes(root, ROW_SELECTOR)?;

    let first_label = match rows.first() {
        Some(row) => extract_field(*row, &ROW.ordinal.optional())?.map(Value::into_text),
        None => None,
    };

    let mut episodes = Vec::with_capacity(rows.len());
    for (position, row) in rows.into_iter().enumerate() {
        match extract_row(row, endpoints, got_time, reference) {
            Ok(episode) => episodes.push(episode),
            Err(err @ (Error::MissingField(_) | Error::FieldParse { .. })) => {
                tracing::warn!(row = position + 1, "skipping episode row: {}", err);
                episodes.push(Episode::new(got_time));
            }
            Err(err) => return Err(err),
        }
    }

    if episodes.is_empty() {
        tracing::debug!("episode list is empty");
    }

    Ok(EpisodeList { first_label, episodes })
}

fn extract_row(
    row: ElementRef<'_>, endpoints: &Endpoints, got_time: NaiveDateTime, reference: NaiveDateTime,
) -> Result<Episode, Error> {
    let mut episode = Episode::new(got_time);

    let badges: BTreeSet<String> = extract_all(row, &ROW.types)?.into_iter().map(Value::into_text).collect();

    if badges.is_empty() {
        let code = require_text(row, &ROW.reserved_code)?;
        set_code(&mut episode, &code, endpoints)?;
        if let Some(date) = extract_field(row, &ROW.date.optional())? {
            episode.page.set_ctime(normalize(&date.into_text(), reference)?);
        }
        tracing::debug!(code = %code, "reserved episode");
        return Ok(episode);
    }

    let title = extract_field(row, &ROW.title)?.map(Value::into_text).unwrap_or_default();
    warn_rejected(episode.page.set_title(title.trim()));

    for episode_type in badges.iter().map(String::as_str).filter_map(badge_type) {
        episode.add_type(episode_type);
    }

    let label = require_text(row, &ROW.ordinal)?;
    match label.parse::<Ordinal>() {
        Ok(ordinal) => episode.set_ordinal(ordinal),
        Err(rejection) => tracing::warn!("{}", rejection),
    }

    let code = require_text(row, &ROW.code)?;
    set_code(&mut episode, &code, endpoints)?;

    if let Some(letters) = optional_integer(row, &ROW.letter_count) {
        warn_rejected(episode.set_letter_count(letters));
    }
    if let Some(comments) = optional_integer(row, &ROW.comment_count) {
        warn_rejected(episode.set_comment_count(comments));
    }
    if let Some(good) = optional_integer(row, &ROW.count_good) {
        warn_rejected(episode.page.set_count_good(good));
    }

    let date = require_text(row, &ROW.date)?;
    episode.page.set_ctime(normalize(&date, reference)?);

    Ok(episode)
}

fn require_text(row: ElementRef<'_>, spec: &FieldSpec) -> Result<String, Error> {
    extract_field(row, spec)?.map(Value::into_text).ok_or_else(|| Error::MissingField(spec.name.to_string()))
}

fn set_code(episode: &mut Episode, code: &str, endpoints: &Endpoints) -> Result<(), Error> {
    warn_rejected(episode.page.set_code(code));
    let url = endpoints.viewer(code)?;
    warn_rejected(episode.page.set_url(url.as_str(), endpoints.host()));
    Ok(())
}
