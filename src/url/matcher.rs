/// Checks if a host matches an exception-table host pattern
///
/// Two pattern forms are supported:
/// 1. Exact: "twitter.com" matches only "twitter.com"
/// 2. Wildcard: "*.linkedin.com" matches "linkedin.com" and any subdomain of it
///
/// Comparison ignores ASCII case, since hosts in configuration files are
/// written by hand.
///
/// # Examples
///
/// ```
/// use weaver::url::matches_host;
///
/// assert!(matches_host("twitter.com", "twitter.com"));
/// assert!(!matches_host("twitter.com", "mobile.twitter.com"));
///
/// assert!(matches_host("*.linkedin.com", "linkedin.com"));
/// assert!(matches_host("*.linkedin.com", "www.linkedin.com"));
/// assert!(!matches_host("*.linkedin.com", "notlinkedin.com"));
/// ```
pub fn matches_host(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            if host.eq_ignore_ascii_case(base) {
                return true;
            }
            // Subdomain: "<anything>.<base>"
            let Some(dot) = host.len().checked_sub(base.len() + 1) else {
                return false;
            };
            dot > 0
                && host.as_bytes()[dot] == b'.'
                && host[dot + 1..].eq_ignore_ascii_case(base)
        }
        None => host.eq_ignore_ascii_case(pattern),
    }
}
