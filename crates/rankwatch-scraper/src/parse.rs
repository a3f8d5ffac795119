//! Result-link extraction from a store search results document.

use scraper::{Html, Selector};

/// The featured ("main") result anchor, rendered above the grid when the
/// store considers one result an exact match.
const FEATURED_RESULT_SELECTOR: &str = "a.Qfxief";

/// The regular result-grid anchors.
const GRID_RESULT_SELECTOR: &str = "a.Gy4nib";

/// Extracts result links from a search page, featured result first, then grid
/// results in document order. Relative hrefs are resolved against `page_url`.
///
/// Returns an empty vector when the document has no recognizable results;
/// the caller decides whether that is a `NoResults` outcome.
#[must_use]
pub fn extract_result_links(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = reqwest::Url::parse(page_url).ok();

    let mut links = Vec::new();
    for source in [FEATURED_RESULT_SELECTOR, GRID_RESULT_SELECTOR] {
        let Ok(selector) = Selector::parse(source) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                links.push(absolutize(base.as_ref(), href));
            }
        }
    }
    links
}

/// Resolves `href` against the page URL, falling back to the raw value when
/// either side does not parse.
pub(crate) fn absolutize(base: Option<&reqwest::Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map_or_else(|| href.to_owned(), |url| url.to_string())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
