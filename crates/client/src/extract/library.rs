//! Novel links from the reader's library page.

use std::collections::HashSet;

use scraper::Html;

use super::{Accessor, FieldSpec, Transform, apply, select_scopes};
use crate::fetch::Endpoints;
use pianote_core::Error;

/// Library entry titles; the onclick navigates with `location = '/novel/{code}';`.
pub const LIBRARY: FieldSpec = FieldSpec::text("novel_code", "b.name_st")
    .read(Accessor::Attr("onclick"))
    .then(Transform::Between("/novel/", "'"));

/// A novel listed in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Title as shown in the library
    pub title: String,
    pub code: String,
    /// Novel main page
    pub url: url::Url,
}

/// Extract the library's novels in page order, removing duplicates by code.
///
/// Entries without a readable onclick link are skipped with a warning.
pub fn extract_library(html: &str, endpoints: &Endpoints) -> Result<Vec<LibraryEntry>, Error> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for element in select_scopes(document.root_element(), LIBRARY.selector)? {
        let Some(onclick) = element.value().attr("onclick") else {
            tracing::warn!("library entry without a link");
            continue;
        };

        let code = match apply(LIBRARY.name, onclick, LIBRARY.transform) {
            Ok(value) => value.into_text(),
            Err(err) => {
                tracing::warn!("{}", err);
                continue;
            }
        };

        if !seen.insert(code.clone()) {
            continue;
        }

        let title = element.text().collect::<Vec<_>>().join(" ").trim().to_string();
        let url = endpoints.novel(&code)?;
        entries.push(LibraryEntry { title, code, url });
    }

    tracing::debug!("library lists {} novels", entries.len());
    Ok(entries)
}
