//! Timestamps with display precision, and the normalizer that turns the
//! platform's relative date cues into them.
//!
//! Episode lists print one of three shapes in the date column:
//!
//! - past-relative (`19시간전`, `3분전`) for episodes published within a day
//! - future-relative (`23시간후`, `1일후`) for reserved episodes, visible from
//!   24 hours before release
//! - short absolute (`21.01.18`) for everything older

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use regex::Regex;

use crate::Error;

/// Rendering of [`Timestamp::Unknown`].
pub const DEFAULT_TIME: &str = "0000-00-00";

static PAST_RELATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)(분|시간)전$").unwrap());
static FUTURE_RELATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2})(분|시간|일)후$").unwrap());
static SHORT_ABSOLUTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{2})\.(\d{2})\.(\d{2})$").unwrap());

/// An absolute point in time, kept at the precision it was observed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Timestamp {
    /// Not resolved yet; renders as `0000-00-00`.
    #[default]
    Unknown,
    /// `YYYY-MM-DD`
    Date(NaiveDate),
    /// `YYYY-MM-DDTHH`, minutes truncated.
    Hour(NaiveDateTime),
    /// `YYYY-MM-DDTHH:MM`, seconds truncated.
    Minute(NaiveDateTime),
}

impl Timestamp {
    /// Minute-precision timestamp, truncating seconds.
    pub fn minute(at: NaiveDateTime) -> Self {
        Timestamp::Minute(at.date().and_hms_opt(at.hour(), at.minute(), 0).unwrap_or(at))
    }

    /// Hour-precision timestamp, truncating minutes.
    pub fn hour(at: NaiveDateTime) -> Self {
        Timestamp::Hour(at.date().and_hms_opt(at.hour(), 0, 0).unwrap_or(at))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Timestamp::Unknown)
    }

    /// Parse an ISO-8601 date or date-time.
    ///
    /// Accepts `0000-00-00`, `YYYY-MM-DD`, `YYYY-MM-DDTHH`, `YYYY-MM-DDTHH:MM`
    /// and `YYYY-MM-DDTHH:MM:SS` (kept at minute precision).
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedTimestamp` for anything else, including
    /// out-of-range calendar dates.
    pub fn parse_iso(s: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedTimestamp(s.to_string());

        if s == DEFAULT_TIME {
            return Ok(Timestamp::Unknown);
        }

        let Some((date, time)) = s.split_once('T') else {
            return NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Timestamp::Date).map_err(|_| malformed());
        };

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| malformed())?;

        if time.len() == 2 {
            let hour: u32 = time.parse().map_err(|_| malformed())?;
            let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(malformed)?;
            return Ok(Timestamp::Hour(date.and_time(time)));
        }

        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| malformed())?;

        Ok(Timestamp::minute(date.and_time(time)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Unknown => f.write_str(DEFAULT_TIME),
            Timestamp::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Timestamp::Hour(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H")),
            Timestamp::Minute(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M")),
        }
    }
}

fn shift(at: NaiveDateTime, delta: Option<TimeDelta>) -> Option<NaiveDateTime> {
    at.checked_add_signed(delta?)
}

/// Convert a date cue from an episode list into an absolute timestamp.
///
/// Whitespace inside the cue is ignored, so `"3 분 전"` and `"3분전"` are the
/// same input.
///
/// # Errors
///
/// Returns `Error::MalformedTimestamp` if the cue matches none of the known
/// shapes or names an impossible calendar date.
pub fn normalize(raw: &str, reference: NaiveDateTime) -> Result<Timestamp, Error> {
    let cue: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let malformed = || Error::MalformedTimestamp(raw.to_string());

    if let Some(caps) = PAST_RELATIVE.captures(&cue) {
        let n: i64 = caps[1].parse().map_err(|_| malformed())?;
        return match &caps[2] {
            "분" => Ok(Timestamp::minute(shift(reference, TimeDelta::try_minutes(-n)).ok_or_else(malformed)?)),
            _ => Ok(Timestamp::hour(shift(reference, TimeDelta::try_hours(-n)).ok_or_else(malformed)?)),
        };
    }

    if let Some(caps) = FUTURE_RELATIVE.captures(&cue) {
        let n: i64 = caps[1].parse().map_err(|_| malformed())?;
        return match &caps[2] {
            "분" => Ok(Timestamp::minute(reference + TimeDelta::minutes(n))),
            "시간" if n == 24 => Ok(Timestamp::Date((reference + TimeDelta::days(1)).date())),
            "시간" => Ok(Timestamp::hour(reference + TimeDelta::hours(n))),
            _ => Ok(Timestamp::Date((reference + TimeDelta::days(n)).date())),
        };
    }

    if let Some(caps) = SHORT_ABSOLUTE.captures(&cue) {
        let year: i32 = caps[1].parse().map_err(|_| malformed())?;
        let month: u32 = caps[2].parse().map_err(|_| malformed())?;
        let day: u32 = caps[3].parse().map_err(|_| malformed())?;
        return NaiveDate::from_ymd_opt(2000 + year, month, day).map(Timestamp::Date).ok_or_else(malformed);
    }

    tracing::debug!(cue = raw, "date cue matched no known shape");
    Err(malformed())
}
