//! Novel main page extraction.

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html};

use super::{
    Accessor, FieldSpec, Transform, Value, extract_all, extract_field, optional_integer, optional_text, warn_rejected,
};
use crate::fetch::Endpoints;
use pianote_core::status::{apply_badges, resolve_alert};
use pianote_core::{Error, Novel, PageState, Rank};

/// Prefix the platform puts in front of every page title.
pub const TITLE_PREFIX: &str = "노벨피아 - 웹소설로 꿈꾸는 세상! - ";

/// Rank text shown before the ranking is published.
pub const RANK_UNDISCLOSED: &str = "공개전";

/// Field table for the novel main page.
#[derive(Debug, Clone, Copy)]
pub struct NovelSchema {
    pub page_title: FieldSpec,
    pub url: FieldSpec,
    pub title: FieldSpec,
    pub alert: FieldSpec,
    pub badges: FieldSpec,
    pub writer: FieldSpec,
    pub tags: FieldSpec,
    pub count_view: FieldSpec,
    pub count_good: FieldSpec,
    pub rank: FieldSpec,
    pub prefer_count: FieldSpec,
    pub alarm_count: FieldSpec,
    pub episode_count: FieldSpec,
    pub synopsis: FieldSpec,
}

pub const NOVEL: NovelSchema = NovelSchema {
    page_title: FieldSpec::text("page_title", "title").optional(),
    url: FieldSpec::text("url", "meta[property='og:url']").read(Accessor::Attr("content")).optional(),
    title: FieldSpec::text("title", "div.epnew-novel-title"),
    alert: FieldSpec::text("alert", "#alert_modal .mg-b-5").optional(),
    badges: FieldSpec::text("badges", ".in-badge span").optional(),
    writer: FieldSpec::text("writer", "a.writer-name"),
    tags: FieldSpec::text("tags", "div.epnew-novel-info p.writer-tag span.tag").then(Transform::HashTag).optional(),
    count_view: FieldSpec::text("count_view", ".counter-line-a span").nth(2).then(Transform::Integer(None)).optional(),
    count_good: FieldSpec::text("count_good", ".counter-line-a span").nth(4).then(Transform::Integer(None)).optional(),
    rank: FieldSpec::text("rank", ".counter-line-b span").nth(2).optional(),
    prefer_count: FieldSpec::text("prefer_count", "span.writer-name").then(Transform::Integer(None)).optional(),
    alarm_count: FieldSpec::text("alarm_count", "span.writer-name").nth(2).then(Transform::Integer(None)).optional(),
    episode_count: FieldSpec::text("episode_count", "span.writer-name")
        .nth(3)
        .then(Transform::Integer(Some("회차")))
        .optional(),
    synopsis: FieldSpec::text("synopsis", ".synopsis").optional(),
};

/// A novel page after extraction.
#[derive(Debug, Clone)]
pub struct NovelReport {
    pub novel: Novel,
    pub state: PageState,
    /// Notice for terminal states.
    pub notice: Option<String>,
}

/// Extract a [`Novel`] from its main page.
///
/// Prologue detection and first/last publication dates need the episode list
/// and are filled in by the pipeline.
///
/// # Errors
///
/// - `Error::UnclassifiedAlert` when the title block is missing and the alert is unknown
/// - `Error::MissingField` when a healthy page lacks its writer
/// - `Error::FieldParse` when a required field cannot be read
pub fn extract_novel(html: &str, endpoints: &Endpoints, got_time: NaiveDateTime) -> Result<NovelReport, Error> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut novel = Novel::new(got_time);

    let page_title = optional_text(root, &NOVEL.page_title)
        .map(|t| t.strip_prefix(TITLE_PREFIX).map(str::to_string).unwrap_or(t))
        .filter(|t| !t.is_empty());
    if let Some(title) = &page_title {
        warn_rejected(novel.page.set_title(title));
    }

    if let Some(url) = optional_text(root, &NOVEL.url) {
        warn_rejected(novel.page.set_url(&url, endpoints.host()));
        if let Some(code) = url.trim_end_matches('/').rsplit('/').next() {
            warn_rejected(novel.page.set_code(code));
        }
    }

    let title = match extract_field(root, &NOVEL.title) {
        Ok(Some(value)) => value.into_text(),
        Ok(None) | Err(Error::MissingField(_)) => return resolve_abnormal(root, novel, got_time),
        Err(err) => return Err(err),
    };

    if let Some(outer) = &page_title
        && *outer != title
    {
        tracing::warn!(page_title = %outer, title = %title, "page title differs from the novel title");
    }
    warn_rejected(novel.page.set_title(&title));

    let writer = extract_field(root, &NOVEL.writer)?.map(Value::into_text).unwrap_or_default();
    warn_rejected(novel.set_writer(&writer));

    let badges: Vec<String> = extract_all(root, &NOVEL.badges)?.into_iter().map(Value::into_text).collect();
    let state = apply_badges(&mut novel, badges.iter().map(String::as_str));

    fill_stats(root, &mut novel)?;

    tracing::debug!(code = novel.page.code(), title = novel.page.title(), state = ?state, "extracted novel");
    Ok(NovelReport { novel, state, notice: None })
}

fn resolve_abnormal(root: ElementRef<'_>, mut novel: Novel, got_time: NaiveDateTime) -> Result<NovelReport, Error> {
    let alert = optional_text(root, &NOVEL.alert);
    let resolution = resolve_alert(&mut novel, alert.as_deref())?;

    if resolution.state == PageState::InvalidCode {
        let mut fresh = Novel::new(got_time);
        if !novel.page.title().is_empty() {
            warn_rejected(fresh.page.set_title(novel.page.title()));
        }
        novel = fresh;
    }

    Ok(NovelReport { novel, state: resolution.state, notice: Some(resolution.notice) })
}

/// Tags, counters, rank and synopsis of a healthy page.
fn fill_stats(root: ElementRef<'_>, novel: &mut Novel) -> Result<(), Error> {
    // PC and mobile layouts each render the tag list.
    let tags = extract_all(root, &NOVEL.tags)?;
    let half = tags.len() / 2;
    if half > 0 {
        warn_rejected(novel.set_tags(tags.into_iter().take(half).map(Value::into_text)));
    }

    if let Some(view) = optional_integer(root, &NOVEL.count_view) {
        warn_rejected(novel.page.set_count_view(view));
    }
    if let Some(good) = optional_integer(root, &NOVEL.count_good) {
        warn_rejected(novel.page.set_count_good(good));
    }
    if let Some(prefer) = optional_integer(root, &NOVEL.prefer_count) {
        warn_rejected(novel.set_prefer_count(prefer));
    }
    if let Some(alarm) = optional_integer(root, &NOVEL.alarm_count) {
        warn_rejected(novel.set_alarm_count(alarm));
    }
    if let Some(episodes) = optional_integer(root, &NOVEL.episode_count) {
        warn_rejected(novel.set_episode_count(episodes));
    }

    if let Some(rank) = optional_text(root, &NOVEL.rank) {
        novel.set_rank(parse_rank(&rank));
    }

    if let Some(synopsis) = optional_text(root, &NOVEL.synopsis) {
        novel.set_synopsis(&synopsis);
    }

    Ok(())
}

fn parse_rank(text: &str) -> Rank {
    match text.trim() {
        placed if placed.ends_with('위') => Rank::Placed(placed.to_string()),
        RANK_UNDISCLOSED => Rank::Undisclosed,
        other => {
            tracing::debug!(rank = other, "unrecognized rank text");
            Rank::Undisclosed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pianote_core::{NovelStatus, NovelType};

    fn got_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 23).unwrap().and_hms_opt(21, 36, 12).unwrap()
    }

    fn endpoints() -> Endpoints {
        Endpoints::new("https://novelpia.com").unwrap()
    }

    const HEALTHY: &str = r#"<html><head>
        <title>노벨피아 - 웹소설로 꿈꾸는 세상! - 괴담 동아리</title>
        <meta property="og:url" content="https://novelpia.com/novel/15597">
        </head><body>
        <div class="epnew-novel-info">
            <div class="epnew-novel-title">괴담 동아리</div>
            <p class="in-badge"><span>완결</span><span>독점</span><span>19</span><span>신작</span></p>
            <a class="writer-name"> 제울 </a>
            <p class="writer-tag"><span class="tag">#판타지</span><span class="tag">#현대</span><span class="tag">#판타지</span>
            <span class="tag">#판타지</span><span class="tag">#현대</span><span class="tag">#판타지</span></p>
            <span class="writer-name">7,694</span><span class="writer-name">879</span><span class="writer-name">239회차</span>
        </div>
        <div class="counter-line-a"><span>조회</span><span>83,050,765</span><span>추천</span><span>4,540,540</span></div>
        <div class="counter-line-b"><span>인생픽</span><span>40위</span></div>
        <div class="synopsis">괴담, 저주, 여학생 등….
집착해선 안 될 것들이 내게 집착한다</div>
        </body></html>"#;

    fn abnormal(alert: &str) -> String {
        format!(
            r#"<html><head><title>노벨피아 - 웹소설로 꿈꾸는 세상! - 계월향의 꿈</title>
            <meta property="og:url" content="https://novelpia.com/novel/42"></head>
            <body><div id="alert_modal"><div class="mg-b-5">{alert}</div></div></body></html>"#
        )
    }

    #[test]
    fn test_healthy_page() {
        let report = extract_novel(HEALTHY, &endpoints(), got_time()).unwrap();
        let novel = &report.novel;

        assert_eq!(report.state, PageState::Completed);
        assert_eq!(report.notice, None);
        assert_eq!(novel.page.title(), "괴담 동아리");
        assert_eq!(novel.page.code(), "15597");
        assert_eq!(novel.page.url(), "https://novelpia.com/novel/15597");
        assert_eq!(novel.writer(), "제울");
        assert_eq!(novel.status(), NovelStatus::Completed);
        assert_eq!(novel.types().iter().copied().collect::<Vec<_>>(), [NovelType::Adult, NovelType::Exclusive]);
        assert_eq!(novel.tags(), ["판타지", "현대"]);
        assert_eq!(novel.page.count_view(), 83050765);
        assert_eq!(novel.page.count_good(), 4540540);
        assert_eq!(novel.prefer_count(), 7694);
        assert_eq!(novel.alarm_count(), 879);
        assert_eq!(novel.episode_count(), 239);
        assert_eq!(novel.rank(), &Rank::Placed("40위".into()));
        assert!(novel.synopsis().starts_with("괴담, 저주"));
    }

    #[test]
    fn test_tags_keep_first_half_only() {
        let pc = r#"<span class="tag">#판타지</span><span class="tag">#현대</span>"#;
        let mobile = r#"<span class="tag">#로맨스</span><span class="tag">#일상</span><span class="tag">#학원</span>"#;
        let html = format!(
            r#"<html><body><div class="epnew-novel-info"><div class="epnew-novel-title">괴담 동아리</div>
            <a class="writer-name">제울</a><p class="writer-tag">{pc}{mobile}</p></div></body></html>"#
        );
        let report = extract_novel(&html, &endpoints(), got_time()).unwrap();

        assert_eq!(report.novel.tags(), ["판타지", "현대"]);
    }

    #[test]
    fn test_undisclosed_rank_and_missing_stats() {
        let html = r#"<html><head><title>노벨피아 - 웹소설로 꿈꾸는 세상! - 단편</title></head><body>
            <div class="epnew-novel-title">단편</div><a class="writer-name">작가</a>
            <div class="counter-line-b"><span>인생픽</span><span>공개전</span></div></body></html>"#;
        let report = extract_novel(html, &endpoints(), got_time()).unwrap();

        assert_eq!(report.state, PageState::Ongoing);
        assert_eq!(report.novel.rank(), &Rank::Undisclosed);
        assert_eq!(report.novel.page.count_view(), -1);
        assert_eq!(report.novel.episode_count(), -1);
        assert!(report.novel.tags().is_empty());
    }

    #[test]
    fn test_title_mismatch_keeps_novel_title() {
        let html = HEALTHY.replace("- 괴담 동아리</title>", "- 괴담 동아리 (개정판)</title>");
        let report = extract_novel(&html, &endpoints(), got_time()).unwrap();
        assert_eq!(report.novel.page.title(), "괴담 동아리");
    }

    #[test]
    fn test_invalid_code_keeps_only_title() {
        let report = extract_novel(&abnormal("잘못된 소설 번호 입니다."), &endpoints(), got_time()).unwrap();

        assert_eq!(report.state, PageState::InvalidCode);
        assert_eq!(report.notice.as_deref(), Some("잘못된 소설 번호 입니다."));
        assert_eq!(report.novel.page.title(), "계월향의 꿈");
        assert_eq!(report.novel.page.code(), "");
        assert_eq!(report.novel.page.url(), "");
    }

    #[test]
    fn test_deleted_page() {
        let report = extract_novel(&abnormal("삭제된 소설 입니다."), &endpoints(), got_time()).unwrap();

        assert_eq!(report.state, PageState::Deleted);
        assert_eq!(report.notice.as_deref(), Some("<계월향의 꿈>은 삭제된 소설 입니다."));
        assert!(report.novel.is_deleted());
        assert_eq!(report.novel.page.code(), "42");
    }

    #[test]
    fn test_draft_page() {
        let report = extract_novel(&abnormal("잘못된 접근입니다."), &endpoints(), got_time()).unwrap();

        assert_eq!(report.state, PageState::Draft);
        assert_eq!(report.notice.as_deref(), Some("<계월향의 꿈>에 대한 잘못된 접근입니다."));
        assert!(report.novel.types().contains(&NovelType::Free));
    }

    #[test]
    fn test_unknown_alert_is_reported_raw() {
        let result = extract_novel(&abnormal("점검 중입니다."), &endpoints(), got_time());
        assert_eq!(result.unwrap_err(), Error::UnclassifiedAlert("점검 중입니다.".into()));
    }

    #[test]
    fn test_healthy_page_without_writer() {
        let html = HEALTHY.replace("writer-name\"> 제울 </a>", "author\">제울</a>");
        let result = extract_novel(&html, &endpoints(), got_time());
        assert_eq!(result.unwrap_err(), Error::MissingField("writer".into()));
    }

    #[test]
    fn test_parse_rank() {
        assert_eq!(parse_rank("1위"), Rank::Placed("1위".into()));
        assert_eq!(parse_rank("공개전"), Rank::Undisclosed);
        assert_eq!(parse_rank("-"), Rank::Undisclosed);
    }
}
