//! Episode bodies.
//!
//! The viewer endpoint answers with JSON holding one record per body line. When
//! the key cannot read the episode it serves an HTML page with an alert instead.

use reqwest::header::HeaderMap;
use scraper::Html;
use serde::Deserialize;

use crate::extract::novel::NOVEL;
use crate::extract::optional_text;
use crate::fetch::{Endpoints, Transport};
use pianote_core::{Episode, Error};

/// Body line the viewer uses for an empty paragraph.
pub const BLANK_LINE: &str = "&nbsp;";

/// Font size the viewer is asked to lay out for; the text does not depend on it.
const FONT_SIZE: &str = "14";

#[derive(Debug, Deserialize)]
struct ViewerData {
    #[serde(rename = "s")]
    lines: Vec<ViewerLine>,
}

#[derive(Debug, Deserialize)]
struct ViewerLine {
    text: String,
}

/// An episode with its body lines.
#[derive(Debug, Clone)]
pub struct EpisodeBody {
    pub episode: Episode,
    pub lines: Vec<String>,
}

pub fn viewer_form() -> Vec<(String, String)> {
    vec![("size".to_string(), FONT_SIZE.to_string())]
}

fn body_line(text: &str) -> String {
    if text.trim_matches(|c| c == '\n' || c == ' ') == BLANK_LINE {
        String::new()
    } else {
        text.trim_end_matches('\n').to_string()
    }
}

/// Body lines of a viewer response, with `&nbsp;` paragraphs as empty lines.
///
/// # Errors
///
/// `Error::BodyUnavailable` with the page's alert when the response is not the
/// expected JSON.
pub fn parse_body(body: &str) -> Result<Vec<String>, Error> {
    match serde_json::from_str::<ViewerData>(body) {
        Ok(data) => Ok(data.lines.iter().map(|line| body_line(&line.text)).collect()),
        Err(err) => {
            let document = Html::parse_document(body);
            let reason = optional_text(document.root_element(), &NOVEL.alert)
                .unwrap_or_else(|| format!("unreadable response: {}", err));
            Err(Error::BodyUnavailable(reason))
        }
    }
}

/// Request the body of episode `episode_code`.
pub async fn fetch_body<T: Transport + ?Sized>(
    transport: &T, endpoints: &Endpoints, headers: &HeaderMap, episode_code: &str,
) -> Result<Vec<String>, Error> {
    let url = endpoints.viewer_data(episode_code)?;
    let body = transport.post_form(&url, &viewer_form(), headers).await?;
    let lines = parse_body(&body)?;
    tracing::debug!(episode_code, "episode body has {} lines", lines.len());
    Ok(lines)
}
