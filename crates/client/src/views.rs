//! Batched episode view counts.
//!
//! The list page only renders a placeholder for each episode's view count. One
//! form POST to the novel command endpoint returns the counts for a set of
//! episodes, which are matched back to the request order by `episode_no`.

use std::collections::HashMap;

use reqwest::header::HeaderMap;
use serde::Deserialize;

use crate::fetch::{Endpoints, Transport};
use pianote_core::Error;

/// Command name for the view-count request.
pub const VIEW_COUNT_CMD: &str = "get_episode_count_view";

#[derive(Debug, Deserialize)]
struct ViewCountResponse {
    #[serde(default)]
    list: Vec<ViewCountEntry>,
}

#[derive(Debug, Deserialize)]
struct ViewCountEntry {
    episode_no: NumOrText,
    count_view: NumOrText,
}

/// The endpoint sends numbers either bare or as comma-grouped strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(i64),
    Text(String),
}

impl NumOrText {
    fn as_code(&self) -> String {
        match self {
            NumOrText::Num(n) => n.to_string(),
            NumOrText::Text(s) => s.trim().to_string(),
        }
    }

    fn as_count(&self) -> Option<i64> {
        match self {
            NumOrText::Num(n) => Some(*n),
            NumOrText::Text(s) => s.trim().replace(',', "").parse().ok(),
        }
    }
}

/// Form body for one batch: the command, one `episode_arr[]` entry per code, then the novel code.
pub fn view_count_form<S: AsRef<str>>(novel_code: &str, episode_codes: &[S]) -> Vec<(String, String)> {
    let mut form = Vec::with_capacity(episode_codes.len() + 2);
    form.push(("cmd".to_string(), VIEW_COUNT_CMD.to_string()));
    for code in episode_codes {
        form.push(("episode_arr[]".to_string(), format!("episode_count_view novel_count_view_{}", code.as_ref())));
    }
    form.push(("novel_no".to_string(), novel_code.to_string()));
    form
}

/// Align a response body with the requested codes. Codes absent from the
/// response keep `-1`.
///
/// # Errors
///
/// `Error::ViewCountsUnresolved` when no codes were requested, the body is not
/// the expected JSON, or no requested code received a count.
pub fn align_view_counts<S: AsRef<str>>(body: &str, episode_codes: &[S]) -> Result<Vec<i64>, Error> {
    if episode_codes.is_empty() {
        return Err(Error::ViewCountsUnresolved("no episode codes requested".into()));
    }

    let response: ViewCountResponse = serde_json::from_str(body)
        .map_err(|e| Error::ViewCountsUnresolved(format!("unreadable response: {}", e)))?;

    let by_code: HashMap<String, i64> = response
        .list
        .iter()
        .filter_map(|entry| entry.count_view.as_count().map(|count| (entry.episode_no.as_code(), count)))
        .collect();

    let counts: Vec<i64> =
        episode_codes.iter().map(|code| by_code.get(code.as_ref()).copied().unwrap_or(-1)).collect();

    if counts.iter().all(|&count| count == -1) {
        return Err(Error::ViewCountsUnresolved(format!("no counts for {} episodes", counts.len())));
    }

    Ok(counts)
}

/// Request view counts for `episode_codes` of novel `novel_code` in one round trip.
///
/// The result has one entry per requested code, in request order.
pub async fn resolve_view_counts<T: Transport + ?Sized, S: AsRef<str>>(
    transport: &T, endpoints: &Endpoints, headers: &HeaderMap, novel_code: &str, episode_codes: &[S],
) -> Result<Vec<i64>, Error> {
    if episode_codes.is_empty() {
        return Err(Error::ViewCountsUnresolved("no episode codes requested".into()));
    }

    let url = endpoints.novel_proc()?;
    let form = view_count_form(novel_code, episode_codes);
    let body = transport.post_form(&url, &form, headers).await?;

    let counts = align_view_counts(&body, episode_codes)?;
    tracing::debug!(novel_code, "resolved view counts for {} episodes", counts.len());
    Ok(counts)
}
