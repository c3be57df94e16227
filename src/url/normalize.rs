use url::{ParseError, Url};

/// Schemes that can appear in an href but can never be fetched
const NON_FETCHABLE_SCHEMES: &[&str] = &["mailto", "javascript", "tel", "data"];

/// Parses and normalizes a seed URL
///
/// The seed becomes both the scope boundary and the first page fetched. A seed
/// with no path gets `/` so that `https://example.com` and
/// `https://example.com/` are the same visited entry.
///
/// # Examples
///
/// ```
/// use weaver::url::normalize_seed;
///
/// let url = normalize_seed("https://example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// let url = normalize_seed("https://example.com/docs/index.html").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/index.html");
/// ```
pub fn normalize_seed(seed: &str) -> Result<Url, ParseError> {
    let mut url = Url::parse(seed.trim())?;
    if url.path().is_empty() && !url.cannot_be_a_base() {
        url.set_path("/");
    }
    url.set_fragment(None);
    Ok(url)
}

/// Returns true if a link with this scheme should be fetched
pub fn is_crawlable(url: &Url) -> bool {
    !NON_FETCHABLE_SCHEMES.contains(&url.scheme())
}

/// Resolves an href found on `page` into an absolute URL
///
/// Relative links are resolved against the page they appear on. Same-page
/// references (empty or fragment-only hrefs) and non-fetchable schemes such
/// as `mailto:` resolve to `Ok(None)`. The fragment is stripped so that
/// `/a#x` and `/a#y` are the same link.
///
/// # Returns
///
/// * `Ok(Some(Url))` - An absolute URL to check
/// * `Ok(None)` - The href should be ignored without recording anything
/// * `Err(ParseError)` - The href is not a valid URL
pub fn resolve_link(href: &str, page: &Url) -> Result<Option<Url>, ParseError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Ok(None);
    }

    let mut url = page.join(href)?;
    if !is_crawlable(&url) {
        return Ok(None);
    }

    url.set_fragment(None);
    Ok(Some(url))
}
