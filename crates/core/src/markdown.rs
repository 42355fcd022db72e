//! Markdown rendering with YAML frontmatter.
//!
//! Notes are written for Obsidian: properties in the frontmatter, the synopsis
//! as a callout. Keys are emitted in a fixed order, flags only when set.
//!
//! ```yaml
//! ---
//! aliases:
//!   - (직접 적어 주세요)
//! 작가명: <writer>
//! 소설 링크: <url>
//! tags:
//!   - <tag>
//! <type flag>: true
//! <status flag>: true
//! 연재 시작일: <first episode date>
//! ...
//! ---
//! > [!TLDR] 시놉시스
//! > <synopsis line>
//! ```

use std::borrow::Cow;

use crate::model::{Episode, Novel, Rank};
use crate::timestamp::DEFAULT_TIME;

/// Frontmatter delimiter line.
pub const DELIMITER: &str = "---";

/// Document for records with nothing to render.
pub const STUB: &str = "---\n---\n";

/// Value for properties the reader fills in by hand.
pub const PLACEHOLDER: &str = "(직접 적어 주세요)";

const CALLOUT_HEADER: &str = "> [!TLDR] 시놉시스";

/// Builds frontmatter lines in call order.
#[derive(Debug, Default)]
struct Frontmatter {
    lines: Vec<String>,
}

impl Frontmatter {
    fn field(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        self.lines.push(format!("{}: {}", yaml_key(key), escape_yaml(&value)));
        self
    }

    fn list<S: AsRef<str>>(&mut self, key: &str, items: &[S]) -> &mut Self {
        self.lines.push(format!("{}:", yaml_key(key)));
        for item in items {
            self.lines.push(format!("  - {}", escape_yaml(item.as_ref())));
        }
        self
    }

    fn flag(&mut self, key: &str) -> &mut Self {
        self.lines.push(format!("{}: true", yaml_key(key)));
        self
    }

    fn finish(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

/// Quote keys made only of digits so YAML keeps them as strings.
fn yaml_key(key: &str) -> Cow<'_, str> {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        Cow::Owned(format!("\"{key}\""))
    } else {
        Cow::Borrowed(key)
    }
}

/// Quote values YAML would otherwise misread.
fn escape_yaml(s: &str) -> String {
    const INDICATORS: &[char] = &['[', ']', '{', '}', '>', '|', '*', '&', '!', '%', '@', '`', '\'', '"', '#'];

    const SCALARS: &[&str] = &["~", "null", "true", "false", "yes", "no", "on", "off", "y", "n"];

    let indicator = s.starts_with(INDICATORS) || s.starts_with("- ") || s.starts_with("? ");
    let scalar = SCALARS.iter().any(|word| s.eq_ignore_ascii_case(word));
    if s.is_empty() {
        "\"\"".to_string()
    } else if indicator || scalar || s.ends_with(':') || s.contains('\n') || s.contains(": ") || s.contains(" #") {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

/// Render a synopsis as an Obsidian callout, one quoted line per non-empty
/// source line. Leading `#` on a line is dropped so it does not turn into a
/// heading. Returns `None` when nothing remains.
pub fn synopsis_callout(raw: &str) -> Option<String> {
    let lines: Vec<&str> =
        raw.lines().map(|line| line.trim().trim_start_matches('#').trim()).filter(|line| !line.is_empty()).collect();

    if lines.is_empty() {
        return None;
    }

    let mut out = String::from(CALLOUT_HEADER);
    for line in lines {
        out.push_str("\n> ");
        out.push_str(line);
    }
    out.push('\n');
    Some(out)
}

/// Render a novel note. Deleted novels render as [`STUB`].
pub fn novel_to_markdown(novel: &Novel) -> String {
    if novel.is_deleted() {
        return STUB.to_string();
    }

    let page = &novel.page;
    let mut fm = Frontmatter::default();

    fm.list("aliases", &[PLACEHOLDER]).field("유입 경로", PLACEHOLDER).field("작가명", novel.writer());
    fm.field("소설 링크", page.url()).list("tags", novel.tags());

    for novel_type in novel.types() {
        fm.flag(novel_type.label());
    }
    fm.flag(novel.status().label());

    fm.field("완독일", DEFAULT_TIME)
        .field("연재 시작일", page.ctime())
        .field("최근(예정) 연재일", page.mtime())
        .field("정보 수집일", page.got_time());

    fm.field("회차 수", novel.episode_count())
        .field("알람 수", novel.alarm_count())
        .field("선호 수", novel.prefer_count())
        .field("추천 수", page.count_good())
        .field("조회 수", page.count_view());

    if let Rank::Placed(rank) = novel.rank() {
        fm.field("인생픽 순위", rank);
    }

    let mut doc = fm.finish();
    if let Some(callout) = synopsis_callout(novel.synopsis()) {
        doc.push_str(&callout);
    }
    doc
}

/// Render an episode note. Content-less episodes render as [`STUB`].
pub fn episode_to_markdown(episode: &Episode) -> String {
    if episode.is_content_less() {
        return STUB.to_string();
    }

    let page = &episode.page;
    let mut fm = Frontmatter::default();

    fm.field("제목", page.title());
    for episode_type in episode.types() {
        fm.flag(episode_type.label());
    }

    let ordinal = episode.ordinal().map_or_else(|| "-1".to_string(), |o| o.to_string());
    fm.field("공개 일자", page.ctime()).field("회차 링크", page.url()).field("화수", ordinal);

    fm.field("댓글 수", episode.comment_count())
        .field("글자 수", episode.letter_count())
        .field("조회 수", page.count_view())
        .field("추천 수", page.count_good())
        .field("정보 수집일", page.got_time());

    fm.finish()
}

/// Render an episode note followed by its body, one source line per line.
/// Content-less episodes render as [`STUB`].
pub fn episode_body_to_markdown<S: AsRef<str>>(episode: &Episode, lines: &[S]) -> String {
    let mut doc = episode_to_markdown(episode);
    if doc == STUB {
        return doc;
    }

    for line in lines {
        doc.push_str(line.as_ref());
        doc.push('\n');
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EpisodeType, NovelStatus, NovelType, Ordinal};
    use crate::timestamp::Timestamp;
    use chrono::NaiveDate;
    use url::Url;

    fn got_time() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 23).unwrap().and_hms_opt(21, 36, 0).unwrap()
    }

    fn sample_novel() -> Novel {
        let host = Url::parse("https://novelpia.com").unwrap();
        let mut novel = Novel::new(got_time());
        novel.page.set_title("계월향의 꿈").unwrap();
        novel.page.set_code("15597").unwrap();
        novel.page.set_url("https://novelpia.com/novel/15597", &host).unwrap();
        novel.page.set_ctime(Timestamp::parse_iso("2021-01-18").unwrap());
        novel.page.set_mtime(Timestamp::parse_iso("2024-08-23T19").unwrap());
        novel.page.set_count_good(1200).unwrap();
        novel.page.set_count_view(98765).unwrap();
        novel.set_writer("제울").unwrap();
        novel.set_tags(["판타지", "현대"]).unwrap();
        novel.add_type(NovelType::Free);
        novel.set_status(NovelStatus::Completed);
        novel.set_episode_count(239).unwrap();
        novel.set_alarm_count(879).unwrap();
        novel.set_prefer_count(7694).unwrap();
        novel.set_synopsis("괴담, 저주, 여학생 등….\n\n집착해선 안 될 것들이 내게 집착한다\n");
        novel
    }

    #[test]
    fn test_novel_document() {
        let doc = novel_to_markdown(&sample_novel());
        let expected = "\
---
aliases:
  - (직접 적어 주세요)
유입 경로: (직접 적어 주세요)
작가명: 제울
소설 링크: https://novelpia.com/novel/15597
tags:
  - 판타지
  - 현대
자유: true
완결: true
완독일: 0000-00-00
연재 시작일: 2021-01-18
최근(예정) 연재일: 2024-08-23T19
정보 수집일: 2024-08-23T21:36
회차 수: 239
알람 수: 879
선호 수: 7694
추천 수: 1200
조회 수: 98765
---
> [!TLDR] 시놉시스
> 괴담, 저주, 여학생 등….
> 집착해선 안 될 것들이 내게 집착한다
";
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_rank_only_when_placed() {
        let mut novel = sample_novel();
        assert!(!novel_to_markdown(&novel).contains("인생픽 순위"));

        novel.set_rank(Rank::Placed("40위".into()));
        assert!(novel_to_markdown(&novel).contains("조회 수: 98765\n인생픽 순위: 40위\n---\n"));
    }

    #[test]
    fn test_deleted_novel_is_stub() {
        let mut novel = sample_novel();
        novel.set_status(NovelStatus::Deleted);
        assert_eq!(novel_to_markdown(&novel), STUB);
    }

    #[test]
    fn test_unset_dates_fall_back_to_sentinel() {
        let mut novel = Novel::new(got_time());
        novel.page.set_title("연습용").unwrap();
        let doc = novel_to_markdown(&novel);
        assert!(doc.contains("연재 시작일: 0000-00-00\n"));
        assert!(doc.contains("최근(예정) 연재일: 0000-00-00\n"));
        assert!(doc.contains("작가명: \"\"\n"));
        assert!(doc.ends_with("---\n"));
    }

    #[test]
    fn test_single_line_synopsis_has_no_blank_quote() {
        let callout = synopsis_callout("한 줄 소개").unwrap();
        assert_eq!(callout, "> [!TLDR] 시놉시스\n> 한 줄 소개\n");
    }

    #[test]
    fn test_synopsis_strips_heading_marks() {
        let callout = synopsis_callout("## 1부\n  본문  \n").unwrap();
        assert_eq!(callout, "> [!TLDR] 시놉시스\n> 1부\n> 본문\n");
        assert_eq!(synopsis_callout("\n  \n"), None);
    }

    #[test]
    fn test_numeric_keys_quoted() {
        assert_eq!(yaml_key("19"), "\"19\"");
        assert_eq!(yaml_key("성인"), "성인");
        let mut fm = Frontmatter::default();
        fm.flag("19");
        assert_eq!(fm.finish(), "---\n\"19\": true\n---\n");
    }

    #[test]
    fn test_escape_yaml() {
        assert_eq!(escape_yaml("https://novelpia.com/novel/1"), "https://novelpia.com/novel/1");
        assert_eq!(escape_yaml("제목: 부제"), "\"제목: 부제\"");
        assert_eq!(escape_yaml("#태그"), "\"#태그\"");
        assert_eq!(escape_yaml("-1"), "-1");
        assert_eq!(escape_yaml("- 목록"), "\"- 목록\"");
        assert_eq!(escape_yaml("\"인용\""), "\"\\\"인용\\\"\"");
    }

    #[test]
    fn test_escape_yaml_scalars_and_trailing_colon() {
        assert_eq!(escape_yaml("null"), "\"null\"");
        assert_eq!(escape_yaml("True"), "\"True\"");
        assert_eq!(escape_yaml("yes"), "\"yes\"");
        assert_eq!(escape_yaml("~"), "\"~\"");
        assert_eq!(escape_yaml("다음 화:"), "\"다음 화:\"");
        assert_eq!(escape_yaml("nullable"), "nullable");
    }

    #[test]
    fn test_episode_document() {
        let host = Url::parse("https://novelpia.com").unwrap();
        let mut episode = Episode::new(got_time());
        episode.page.set_title("001. 능력 각성").unwrap();
        episode.page.set_code("3790123").unwrap();
        episode.page.set_url("https://novelpia.com/viewer/3790123", &host).unwrap();
        episode.page.set_ctime(Timestamp::parse_iso("2021-01-18").unwrap());
        episode.page.set_count_view(1057).unwrap();
        episode.page.set_count_good(31).unwrap();
        episode.add_type(EpisodeType::Free);
        episode.set_ordinal(Ordinal::Number(1));
        episode.set_letter_count(5321).unwrap();
        episode.set_comment_count(4).unwrap();

        let expected = "\
---
제목: 001. 능력 각성
자유: true
공개 일자: 2021-01-18
회차 링크: https://novelpia.com/viewer/3790123
화수: 1
댓글 수: 4
글자 수: 5321
조회 수: 1057
추천 수: 31
정보 수집일: 2024-08-23T21:36
---
";
        assert_eq!(episode_to_markdown(&episode), expected);
    }

    #[test]
    fn test_episode_titled_like_a_scalar_is_quoted() {
        let mut episode = Episode::new(got_time());
        episode.page.set_title("true").unwrap();
        episode.page.set_code("3790123").unwrap();

        assert!(episode_to_markdown(&episode).starts_with("---\n제목: \"true\"\n"));
    }

    #[test]
    fn test_episode_body_follows_frontmatter() {
        let mut episode = Episode::new(got_time());
        episode.page.set_title("프롤로그").unwrap();
        episode.page.set_code("3790100").unwrap();
        episode.set_ordinal(Ordinal::Number(0));

        let lines = ["첫 줄".to_string(), String::new(), "둘째 줄".to_string()];
        let document = episode_body_to_markdown(&episode, &lines);

        assert!(document.starts_with(&episode_to_markdown(&episode)));
        assert!(document.ends_with("---\n첫 줄\n\n둘째 줄\n"));
    }

    #[test]
    fn test_content_less_episode_body_is_stub() {
        let episode = Episode::new(got_time());
        assert_eq!(episode_body_to_markdown(&episode, &["본문".to_string()]), STUB);
    }

    #[test]
    fn test_content_less_episode_is_stub() {
        let mut episode = Episode::new(got_time());
        episode.page.set_code("3790123").unwrap();
        assert_eq!(episode_to_markdown(&episode), STUB);
    }
}
