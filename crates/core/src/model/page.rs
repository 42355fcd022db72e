use chrono::NaiveDateTime;
use url::Url;

use super::{Rejection, check_count, is_printable};
use crate::timestamp::Timestamp;

/// Fields shared by every record scraped from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: String,
    code: String,
    url: String,
    ctime: Timestamp,
    mtime: Timestamp,
    got_time: Timestamp,
    count_good: i64,
    count_view: i64,
}

impl Page {
    /// Empty page extracted at `got_time`, kept at minute precision.
    pub fn new(got_time: NaiveDateTime) -> Self {
        Self {
            title: String::new(),
            code: String::new(),
            url: String::new(),
            ctime: Timestamp::Unknown,
            mtime: Timestamp::Unknown,
            got_time: Timestamp::minute(got_time),
            count_good: -1,
            count_view: -1,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ctime(&self) -> Timestamp {
        self.ctime
    }

    pub fn mtime(&self) -> Timestamp {
        self.mtime
    }

    pub fn got_time(&self) -> Timestamp {
        self.got_time
    }

    pub fn count_good(&self) -> i64 {
        self.count_good
    }

    pub fn count_view(&self) -> i64 {
        self.count_view
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), Rejection> {
        if !is_printable(title) {
            return Err(Rejection::NotPrintable { field: "title", value: title.to_string() });
        }
        self.title = title.to_string();
        Ok(())
    }

    /// Accepts only positive integer strings such as `"15597"`.
    pub fn set_code(&mut self, code: &str) -> Result<(), Rejection> {
        let digits = !code.is_empty() && code.chars().all(|c| c.is_ascii_digit());
        if !digits || code.trim_start_matches('0').is_empty() {
            return Err(Rejection::Code(code.to_string()));
        }
        self.code = code.to_string();
        Ok(())
    }

    /// Accepts `url` only when its scheme and host match `source`.
    pub fn set_url(&mut self, url: &str, source: &Url) -> Result<(), Rejection> {
        let foreign = || Rejection::ForeignUrl { url: url.to_string(), expected: source.origin().ascii_serialization() };
        let parsed = Url::parse(url).map_err(|_| foreign())?;

        if parsed.origin() != source.origin() {
            return Err(foreign());
        }
        self.url = parsed.to_string();
        Ok(())
    }

    pub fn set_ctime(&mut self, ctime: Timestamp) {
        self.ctime = ctime;
    }

    pub fn set_mtime(&mut self, mtime: Timestamp) {
        self.mtime = mtime;
    }

    pub fn set_count_good(&mut self, value: i64) -> Result<(), Rejection> {
        self.count_good = check_count("count_good", value)?;
        Ok(())
    }

    pub fn set_count_view(&mut self, value: i64) -> Result<(), Rejection> {
        self.count_view = check_count("count_view", value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn page() -> Page {
        Page::new(NaiveDate::from_ymd_opt(2024, 8, 23).unwrap().and_hms_opt(21, 36, 12).unwrap())
    }

    fn host() -> Url {
        Url::parse("https://novelpia.com").unwrap()
    }

    #[test]
    fn test_new_page_defaults() {
        let page = page();
        assert_eq!(page.title(), "");
        assert_eq!(page.ctime().to_string(), "0000-00-00");
        assert_eq!(page.mtime().to_string(), "0000-00-00");
        assert_eq!(page.got_time().to_string(), "2024-08-23T21:36");
        assert_eq!(page.count_good(), -1);
        assert_eq!(page.count_view(), -1);
    }

    #[test]
    fn test_set_code_rejects_and_keeps_prior() {
        let mut page = page();
        page.set_code("15597").unwrap();

        for bad in ["", "0", "000", "-3", "12a", "１２"] {
            assert_eq!(page.set_code(bad), Err(Rejection::Code(bad.to_string())));
        }
        assert_eq!(page.code(), "15597");
    }

    #[test]
    fn test_set_title_rejects_control_chars() {
        let mut page = page();
        page.set_title("계월향의 꿈").unwrap();
        assert!(page.set_title("bad\u{0007}title").is_err());
        assert!(page.set_title("").is_err());
        assert_eq!(page.title(), "계월향의 꿈");
    }

    #[test]
    fn test_set_url_checks_host() {
        let mut page = page();
        page.set_url("https://novelpia.com/novel/15597", &host()).unwrap();
        assert_eq!(page.url(), "https://novelpia.com/novel/15597");

        assert!(matches!(
            page.set_url("https://example.com/novel/1", &host()),
            Err(Rejection::ForeignUrl { .. })
        ));
        assert!(page.set_url("http://novelpia.com/novel/1", &host()).is_err());
        assert!(page.set_url("not a url", &host()).is_err());
        assert_eq!(page.url(), "https://novelpia.com/novel/15597");
    }

    #[test]
    fn test_counts_accept_sentinel_and_reject_below() {
        let mut page = page();
        page.set_count_view(1057).unwrap();
        page.set_count_good(-1).unwrap();
        assert!(page.set_count_view(-5).is_err());
        assert_eq!(page.count_view(), 1057);
        assert_eq!(page.count_good(), -1);
    }
}
