//! Extraction pipelines: fetch, extract, then fill fields that need more requests.
//!
//! A [`Pipeline`] owns its transport, the endpoint layout and a per-run memo of
//! which novels open with a prologue. Each operation is one sequential chain of
//! requests; nothing is retried.

use std::collections::HashMap;
use std::fmt;

use chrono::{Local, NaiveDateTime};
use reqwest::header::HeaderMap;

use crate::extract::library::LibraryEntry;
use crate::extract::{EpisodeList, NovelReport, extract_episode_list, extract_library, extract_novel};
use crate::fetch::{Endpoints, Transport, login_headers, novel_headers};
use crate::viewer::{EpisodeBody, fetch_body};
use crate::views::resolve_view_counts;
use pianote_core::{AppConfig, Episode, Error, Timestamp, locate};

/// Episode list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// Oldest first.
    Down,
    /// Newest first.
    Up,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Down => "DOWN",
            Sort::Up => "UP",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject codes that are not positive integers before any request is made.
pub fn check_code(code: &str) -> Result<(), Error> {
    let valid = !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) && code.bytes().any(|b| b != b'0');
    if valid { Ok(()) } else { Err(Error::InvalidInput(format!("code must be a positive integer: {code:?}"))) }
}

pub struct Pipeline<T: Transport> {
    transport: T,
    endpoints: Endpoints,
    config: AppConfig,
    prologue: HashMap<String, bool>,
    clock: Option<NaiveDateTime>,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(transport: T, config: &AppConfig) -> Result<Self, Error> {
        let endpoints = Endpoints::new(&config.host)?;
        Ok(Self { transport, endpoints, config: config.clone(), prologue: HashMap::new(), clock: None })
    }

    /// Fix the extraction time instead of reading the local clock.
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(|| Local::now().naive_local())
    }

    fn login_headers(&self) -> Result<HeaderMap, Error> {
        login_headers(self.config.login_key.as_deref())
    }

    /// Fetch one page (1-based) of a novel's episode list.
    pub async fn fetch_episode_list(&self, novel_code: &str, sort: Sort, page: u32) -> Result<EpisodeList, Error> {
        check_code(novel_code)?;
        if page == 0 {
            return Err(Error::InvalidInput("episode list pages start at 1".into()));
        }

        let url = self.endpoints.episode_list()?;
        let form = [
            ("novel_no".to_string(), novel_code.to_string()),
            ("sort".to_string(), sort.to_string()),
            ("page".to_string(), (page - 1).to_string()),
        ];
        let body = self.transport.post_form(&url, &form, &self.login_headers()?).await?;

        let now = self.now();
        let list = extract_episode_list(&body, &self.endpoints, now, now)?;
        tracing::debug!(novel_code, %sort, page, "episode list has {} rows", list.episodes.len());
        Ok(list)
    }

    /// Whether the novel's first episode is a prologue (`EP.0`). Memoized per code.
    pub async fn has_prologue(&mut self, novel_code: &str) -> Result<bool, Error> {
        Ok(self.first_list_page(novel_code).await?.0)
    }

    /// The prologue flag, plus page 1 sorted oldest first when it had to be fetched.
    async fn first_list_page(&mut self, novel_code: &str) -> Result<(bool, Option<EpisodeList>), Error> {
        if let Some(&known) = self.prologue.get(novel_code) {
            return Ok((known, None));
        }
        let oldest = self.fetch_episode_list(novel_code, Sort::Down, 1).await?;
        let has_prologue = oldest.starts_with_prologue();
        self.prologue.insert(novel_code.to_string(), has_prologue);
        Ok((has_prologue, Some(oldest)))
    }

    /// Publication date of the first row in `sort` order, if the list has one.
    pub async fn first_row_date(&self, novel_code: &str, sort: Sort) -> Result<Option<Timestamp>, Error> {
        let list = self.fetch_episode_list(novel_code, sort, 1).await?;
        Ok(first_date(&list))
    }

    /// Extract a novel from its main page, then fill in the prologue
    /// adjustment and the first and latest publication dates.
    pub async fn novel(&mut self, code: &str) -> Result<NovelReport, Error> {
        check_code(code)?;
        let now = self.now();

        let url = self.endpoints.novel(code)?;
        let html = self.transport.get(&url, &novel_headers(now.date())?).await?;
        let mut report = extract_novel(&html, &self.endpoints, now)?;

        if report.state.is_terminal() {
            return Ok(report);
        }

        let (has_prologue, oldest) = self.first_list_page(code).await?;

        let novel = &mut report.novel;
        if has_prologue && novel.episode_count() >= 0 {
            let count = novel.episode_count() + 1;
            if let Err(rejection) = novel.set_episode_count(count) {
                tracing::warn!("{}", rejection);
            }
        }

        if novel.episode_count() != 0 {
            let first = match &oldest {
                Some(list) => first_date(list),
                None => self.first_row_date(code, Sort::Down).await?,
            };
            let latest = self.first_row_date(code, Sort::Up).await?;

            let novel = &mut report.novel;
            novel.page.set_ctime(first.unwrap_or_default());
            novel.page.set_mtime(latest.unwrap_or_default());
        }

        Ok(report)
    }

    /// Extract one episode by its global ordinal, with its view count.
    pub async fn episode(&mut self, novel_code: &str, ordinal: u32) -> Result<Episode, Error> {
        check_code(novel_code)?;
        let (has_prologue, oldest) = self.first_list_page(novel_code).await?;
        let address = locate(ordinal, has_prologue)?;

        let list = match oldest {
            Some(list) if address.page == 1 => list,
            _ => self.fetch_episode_list(novel_code, Sort::Down, address.page).await?,
        };
        let mut episode = list.get(address.index).cloned().ok_or_else(|| {
            Error::EpisodeNotFound(format!(
                "novel {novel_code} ordinal {ordinal} (page {}, index {})",
                address.page, address.index
            ))
        })?;

        if !episode.is_content_less() {
            let codes = [episode.page.code().to_string()];
            if let Some(count) = self.view_counts(novel_code, &codes).await?.and_then(|c| c.first().copied()) {
                set_view_count(&mut episode, count);
            }
        }

        Ok(episode)
    }

    /// Extract one episode by its global ordinal together with its body.
    ///
    /// The body is requested with the subscribed account's key when one is
    /// configured, else with the reader's.
    pub async fn episode_body(&mut self, novel_code: &str, ordinal: u32) -> Result<EpisodeBody, Error> {
        let episode = self.episode(novel_code, ordinal).await?;
        if episode.is_content_less() {
            return Err(Error::BodyUnavailable(format!("novel {novel_code} ordinal {ordinal} is not published yet")));
        }

        let headers = login_headers(self.config.viewer_login_key())?;
        let lines = fetch_body(&self.transport, &self.endpoints, &headers, episode.page.code()).await?;
        Ok(EpisodeBody { episode, lines })
    }

    /// Extract every episode on one list page (sorted oldest first), with view
    /// counts resolved in one batch.
    pub async fn episode_page(&self, novel_code: &str, page: u32) -> Result<Vec<Episode>, Error> {
        let mut episodes = self.fetch_episode_list(novel_code, Sort::Down, page).await?.episodes;

        let published: Vec<usize> = (0..episodes.len()).filter(|&i| !episodes[i].is_content_less()).collect();
        let codes: Vec<String> = published.iter().map(|&i| episodes[i].page.code().to_string()).collect();

        if !codes.is_empty()
            && let Some(counts) = self.view_counts(novel_code, &codes).await?
        {
            for (&i, count) in published.iter().zip(counts) {
                set_view_count(&mut episodes[i], count);
            }
        }

        Ok(episodes)
    }

    /// Novels in the logged-in reader's library.
    pub async fn library(&self) -> Result<Vec<LibraryEntry>, Error> {
        let login_key = self.config.require_login_key().map_err(|e| Error::InvalidInput(e.to_string()))?;

        let url = self.endpoints.library()?;
        let html = self.transport.get(&url, &login_headers(Some(login_key))?).await?;
        extract_library(&html, &self.endpoints)
    }

    /// View counts for `codes`, or `None` when the batch resolved nothing.
    /// Transport failures still propagate.
    async fn view_counts(&self, novel_code: &str, codes: &[String]) -> Result<Option<Vec<i64>>, Error> {
        let headers = self.login_headers()?;
        match resolve_view_counts(&self.transport, &self.endpoints, &headers, novel_code, codes).await {
            Ok(counts) => Ok(Some(counts)),
            Err(err) if err.is_transport() => Err(err),
            Err(err) => {
                tracing::warn!(novel_code, "view counts unavailable: {}", err);
                Ok(None)
            }
        }
    }
}

fn first_date(list: &EpisodeList) -> Option<Timestamp> {
    list.episodes.first().map(|episode| episode.page.ctime()).filter(|ctime| !ctime.is_unknown())
}

fn set_view_count(episode: &mut Episode, count: i64) {
    if let Err(rejection) = episode.page.set_count_view(count) {
        tracing::warn!("{}", rejection);
    }
}
