//! Schema-driven field extraction from HTML.
//!
//! ### Field schema
//! - Each field is a [`FieldSpec`]: selector, 1-based occurrence, accessor,
//!   transform and a required flag.
//! - Page kinds declare one schema table ([`novel::NOVEL`],
//!   [`episode::ROW`], [`library::LIBRARY`]) read by [`extract_field`] and
//!   [`extract_all`].
//!
//! ### Absence
//! - A missing element for a required field is `Error::MissingField`.
//! - A missing element for an optional field is `Ok(None)`; the caller keeps
//!   the field's default.
//! - A present element whose value cannot be transformed is `Error::FieldParse`.

pub mod episode;
pub mod library;
pub mod novel;

pub use episode::{EpisodeList, extract_episode_list};
pub use library::extract_library;
pub use novel::{NovelReport, extract_novel};

use scraper::{ElementRef, Selector};

use pianote_core::{Error, Rejection};

/// How to read a raw string from a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// All descendant text.
    Text,
    /// Text nodes that are direct children only.
    OwnText,
    /// An attribute value.
    Attr(&'static str),
    /// The text node immediately after the element, as in `<i class="icon"></i>1,057`.
    NextText,
    /// The first class token starting with the given prefix.
    ClassToken(&'static str),
}

/// How to turn the raw string into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
    /// Trim, then require and remove a prefix.
    StripPrefix(&'static str),
    /// Trim, then drop leading `#`.
    HashTag,
    /// Trim, drop an optional suffix, drop `,` separators, parse as integer.
    Integer(Option<&'static str>),
    /// The text between the first `start` marker and the next `end` marker.
    Between(&'static str, &'static str),
}

/// One entry of a page schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub selector: &'static str,
    /// 1-based position among the selector's matches.
    pub occurrence: usize,
    pub accessor: Accessor,
    pub transform: Transform,
    pub required: bool,
}

impl FieldSpec {
    /// Required text field, first occurrence.
    pub const fn text(name: &'static str, selector: &'static str) -> Self {
        Self { name, selector, occurrence: 1, accessor: Accessor::Text, transform: Transform::Trim, required: true }
    }

    pub const fn nth(self, occurrence: usize) -> Self {
        Self { occurrence, ..self }
    }

    pub const fn read(self, accessor: Accessor) -> Self {
        Self { accessor, ..self }
    }

    pub const fn then(self, transform: Transform) -> Self {
        Self { transform, ..self }
    }

    pub const fn optional(self) -> Self {
        Self { required: false, ..self }
    }
}

/// A transformed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
}

impl Value {
    pub fn into_text(self) -> String {
        match self {
            Value::Text(s) => s,
            Value::Integer(n) => n.to_string(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, Error> {
    Selector::parse(selector).map_err(|e| Error::InvalidSelector(format!("{}: {:?}", selector, e)))
}

fn access(element: ElementRef<'_>, accessor: Accessor) -> Option<String> {
    match accessor {
        Accessor::Text => Some(element.text().collect()),
        Accessor::OwnText => Some(element.children().filter_map(|n| n.value().as_text()).map(|t| &**t).collect()),
        Accessor::Attr(name) => element.value().attr(name).map(str::to_string),
        Accessor::NextText => element.next_sibling().and_then(|n| n.value().as_text()).map(|t| t.to_string()),
        Accessor::ClassToken(prefix) => element.value().classes().find(|c| c.starts_with(prefix)).map(str::to_string),
    }
}

/// Apply `transform` to a raw string read for field `name`.
pub fn apply(name: &str, raw: &str, transform: Transform) -> Result<Value, Error> {
    let parse_error = || Error::FieldParse { field: name.to_string(), value: raw.to_string() };
    let trimmed = raw.trim();

    match transform {
        Transform::Trim => Ok(Value::Text(trimmed.to_string())),
        Transform::StripPrefix(prefix) => {
            trimmed.strip_prefix(prefix).map(|s| Value::Text(s.to_string())).ok_or_else(parse_error)
        }
        Transform::HashTag => Ok(Value::Text(trimmed.trim_start_matches('#').to_string())),
        Transform::Integer(suffix) => {
            let digits = suffix.and_then(|s| trimmed.strip_suffix(s)).unwrap_or(trimmed);
            digits.trim().replace(',', "").parse().map(Value::Integer).map_err(|_| parse_error())
        }
        Transform::Between(start, end) => {
            let rest = &raw[raw.find(start).ok_or_else(parse_error)? + start.len()..];
            let inner = &rest[..rest.find(end).ok_or_else(parse_error)?];
            Ok(Value::Text(inner.to_string()))
        }
    }
}

/// Sub-scopes matching `selector`, in document order. Used for repeated
/// blocks such as table rows.
pub fn select_scopes<'a>(scope: ElementRef<'a>, selector: &str) -> Result<Vec<ElementRef<'a>>, Error> {
    let parsed = parse_selector(selector)?;
    Ok(scope.select(&parsed).collect())
}

/// Extract one field from `scope`.
///
/// # Errors
///
/// - `Error::InvalidSelector` if the schema selector does not parse
/// - `Error::MissingField` if a required field's element or accessor value is absent
/// - `Error::FieldParse` if the transform rejects the value
pub fn extract_field(scope: ElementRef<'_>, spec: &FieldSpec) -> Result<Option<Value>, Error> {
    let selector = parse_selector(spec.selector)?;
    let raw = scope
        .select(&selector)
        .nth(spec.occurrence.saturating_sub(1))
        .and_then(|element| access(element, spec.accessor));

    match raw {
        Some(raw) => apply(spec.name, &raw, spec.transform).map(Some),
        None if spec.required => Err(Error::MissingField(spec.name.to_string())),
        None => {
            tracing::debug!(field = spec.name, selector = spec.selector, "optional field absent");
            Ok(None)
        }
    }
}

/// Extract every match of `spec.selector` in document order, ignoring
/// `occurrence`. Matches without an accessor value are skipped.
///
/// # Errors
///
/// - `Error::InvalidSelector` if the schema selector does not parse
/// - `Error::MissingField` if the field is required and nothing matched
/// - `Error::FieldParse` if the transform rejects any value
pub fn extract_all(scope: ElementRef<'_>, spec: &FieldSpec) -> Result<Vec<Value>, Error> {
    let selector = parse_selector(spec.selector)?;
    let values = scope
        .select(&selector)
        .filter_map(|element| access(element, spec.accessor))
        .map(|raw| apply(spec.name, &raw, spec.transform))
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() && spec.required {
        return Err(Error::MissingField(spec.name.to_string()));
    }
    Ok(values)
}

/// Extract an optional text field, logging and dropping transform failures.
pub(crate) fn optional_text(scope: ElementRef<'_>, spec: &FieldSpec) -> Option<String> {
    match extract_field(scope, spec) {
        Ok(value) => value.map(Value::into_text),
        Err(err) => {
            tracing::warn!(field = spec.name, "{}", err);
            None
        }
    }
}

/// Extract an optional integer field, logging and dropping transform failures.
pub(crate) fn optional_integer(scope: ElementRef<'_>, spec: &FieldSpec) -> Option<i64> {
    match extract_field(scope, spec) {
        Ok(value) => value.as_ref().and_then(Value::as_integer),
        Err(err) => {
            tracing::warn!(field = spec.name, "{}", err);
            None
        }
    }
}

/// Log a setter rejection; the field keeps its prior value.
pub(crate) fn warn_rejected(result: Result<(), Rejection>) {
    if let Err(rejection) = result {
        tracing::warn!("{}", rejection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const FRAGMENT: &str = r#"
        <div class="stats">
            <span class="count">1,057</span>
            <span class="count">239회차</span>
            <b><i class="icon ion-bookmark"></i>계월향의 꿈</b>
            <p class="own">직접 <em>강조</em> 텍스트</p>
            <span class="episode_count_view novel_count_view_7146">0</span>
            <a onclick="$('.loads').show();location = '/viewer/3790123';">보기</a>
        </div>
    "#;

    fn spec(selector: &'static str) -> FieldSpec {
        FieldSpec::text("field", selector)
    }

    #[test]
    fn test_text_and_occurrence() {
        let doc = Html::parse_fragment(FRAGMENT);
        let root = doc.root_element();

        let first = extract_field(root, &spec("span.count").then(Transform::Integer(None))).unwrap();
        assert_eq!(first, Some(Value::Integer(1057)));

        let second = extract_field(root, &spec("span.count").nth(2).then(Transform::Integer(Some("회차")))).unwrap();
        assert_eq!(second, Some(Value::Integer(239)));
    }

    #[test]
    fn test_next_text() {
        let doc = Html::parse_fragment(FRAGMENT);
        let value = extract_field(doc.root_element(), &spec("b i").read(Accessor::NextText)).unwrap();
        assert_eq!(value, Some(Value::Text("계월향의 꿈".into())));
    }

    #[test]
    fn test_own_text() {
        let doc = Html::parse_fragment(FRAGMENT);
        let value = extract_field(doc.root_element(), &spec("p.own").read(Accessor::OwnText)).unwrap();
        assert_eq!(value, Some(Value::Text("직접  텍스트".into())));
    }

    #[test]
    fn test_class_token_with_prefix() {
        let doc = Html::parse_fragment(FRAGMENT);
        let field = spec(".episode_count_view")
            .read(Accessor::ClassToken("novel_count_view_"))
            .then(Transform::StripPrefix("novel_count_view_"));
        assert_eq!(extract_field(doc.root_element(), &field).unwrap(), Some(Value::Text("7146".into())));
    }

    #[test]
    fn test_attr_between() {
        let doc = Html::parse_fragment(FRAGMENT);
        let field = spec("a").read(Accessor::Attr("onclick")).then(Transform::Between("/viewer/", "'"));
        assert_eq!(extract_field(doc.root_element(), &field).unwrap(), Some(Value::Text("3790123".into())));
    }

    #[test]
    fn test_required_absent_is_missing_field() {
        let doc = Html::parse_fragment(FRAGMENT);
        let result = extract_field(doc.root_element(), &spec("div.synopsis"));
        assert_eq!(result, Err(Error::MissingField("field".into())));
    }

    #[test]
    fn test_optional_absent_is_none() {
        let doc = Html::parse_fragment(FRAGMENT);
        assert_eq!(extract_field(doc.root_element(), &spec("div.synopsis").optional()).unwrap(), None);
        assert_eq!(extract_field(doc.root_element(), &spec("span.count").nth(3).optional()).unwrap(), None);
    }

    #[test]
    fn test_bad_integer_is_field_parse() {
        let doc = Html::parse_fragment(FRAGMENT);
        let result = extract_field(doc.root_element(), &spec("span.count").nth(2).then(Transform::Integer(None)));
        assert!(matches!(result, Err(Error::FieldParse { .. })));
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Html::parse_fragment(FRAGMENT);
        assert!(matches!(extract_field(doc.root_element(), &spec("span[")), Err(Error::InvalidSelector(_))));
    }

    #[test]
    fn test_extract_all_in_order() {
        let html = r#"<p class="writer-tag"><span class="tag">#판타지</span><span class="tag">#현대</span></p>"#;
        let doc = Html::parse_fragment(html);
        let values = extract_all(doc.root_element(), &spec("span.tag").then(Transform::HashTag)).unwrap();
        assert_eq!(values, [Value::Text("판타지".into()), Value::Text("현대".into())]);
    }

    #[test]
    fn test_apply_between_missing_marker() {
        let result = apply("novel_code", "episode_list();", Transform::Between("novel_page_", "'"));
        assert!(matches!(result, Err(Error::FieldParse { .. })));
    }
}
