//! Request cookies.
//!
//! The novel page is served in full only with the daily `NPD` cookie; list
//! and view-count requests carry the reader's `LOGINKEY` when one is set.

use chrono::NaiveDate;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};

use pianote_core::Error;

/// Daily cookie, `NPD{day}{month}1=meta;`. 15 August gives `NPD15081=meta;`.
pub fn npd_cookie(today: NaiveDate) -> String {
    format!("NPD{}1=meta;", today.format("%d%m"))
}

pub fn login_cookie(login_key: &str) -> String {
    format!("LOGINKEY={login_key}")
}

fn cookie_headers(cookie: &str) -> Result<HeaderMap, Error> {
    let value = HeaderValue::from_str(cookie).map_err(|e| Error::InvalidInput(format!("cookie value: {}", e)))?;
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, value);
    Ok(headers)
}

/// Headers for the novel main page.
pub fn novel_headers(today: NaiveDate) -> Result<HeaderMap, Error> {
    cookie_headers(&npd_cookie(today))
}

/// Headers carrying the login cookie, or none when no key is configured.
pub fn login_headers(login_key: Option<&str>) -> Result<HeaderMap, Error> {
    match login_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => cookie_headers(&login_cookie(key)),
        None => {
            tracing::debug!("no login key; requesting anonymously");
            Ok(HeaderMap::new())
        }
    }
}
