//! HTML link extraction
//!
//! Only anchor targets are collected; resolution and filtering happen in the
//! engine so that unparseable hrefs can be reported against their page.

use scraper::{Html, Selector};

/// Extracts the raw `href` of every `<a>` element, in document order
///
/// Malformed markup never fails: the HTML5 parser recovers the way a browser
/// would, and anchors it cannot recover are simply absent.
///
/// # Example
///
/// ```
/// use weaver::checker::extract_hrefs;
///
/// let html = r#"<p><a href="/one">1</a> <a name="x">no href</a> <a href="two">2</a></p>"#;
/// assert_eq!(extract_hrefs(html), vec!["/one", "two"]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}
