use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use weaver::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs belong to the same site
///
/// A site is a network host plus any explicit, non-default port, so
/// `http://example.com` and `https://example.com:443/docs` are the same site
/// (an http-to-https redirect stays in scope), while `http://127.0.0.1:8080`
/// and `http://127.0.0.1:9090` are not.
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(host_a), Some(host_b)) => host_a == host_b && a.port() == b.port(),
        _ => false,
    }
}
