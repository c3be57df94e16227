//! Result classification
//!
//! Maps a fetch outcome to a [`LinkStatus`] and message. Host-specific
//! exceptions come from an ordered rule table so that sites known to reject
//! automated clients are reported as skipped instead of broken.

use crate::config::ExceptionRule;
use crate::state::LinkStatus;
use crate::url::{extract_host, matches_host};
use crate::FetchError;
use reqwest::StatusCode;
use url::Url;

/// Status codes that mean the resource is genuinely gone or unreachable
const DEAD_STATUSES: &[u16] = &[400, 401, 403, 404, 406, 410];

/// Ordered per-host exception table
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: Vec<ExceptionRule>,
}

impl Classifier {
    /// Creates a classifier with the given rules; the first matching rule wins
    pub fn new(rules: Vec<ExceptionRule>) -> Self {
        Self { rules }
    }

    /// Returns the exception rules in match order
    pub fn rules(&self) -> &[ExceptionRule] {
        &self.rules
    }

    /// Classifies a failed fetch
    ///
    /// Certificate failures are warnings (often an expired but reachable
    /// site); every other failure is an error.
    pub fn classify_error(&self, error: &FetchError) -> (LinkStatus, String) {
        let status = if error.is_certificate() {
            LinkStatus::Warning
        } else {
            LinkStatus::Error
        };
        (status, error.to_string())
    }

    /// Classifies an HTTP response for `url`
    ///
    /// # Rules
    ///
    /// | Status | Outcome |
    /// |--------|---------|
    /// | 2xx | Ok |
    /// | 400, 401, 403, 404, 406, 410 | Error, unless an exception matches |
    /// | anything else | Warning, unless an exception matches |
    ///
    /// A matching exception yields Skipped with the rule's message.
    pub fn classify_status(&self, url: &Url, status: StatusCode) -> (LinkStatus, String) {
        let line = status_line(status);

        if status.is_success() {
            return (LinkStatus::Ok, line);
        }

        if let Some(rule) = self.find_exception(url, status.as_u16()) {
            return (LinkStatus::Skipped, rule.message.clone());
        }

        if DEAD_STATUSES.contains(&status.as_u16()) {
            (LinkStatus::Error, line)
        } else {
            (LinkStatus::Warning, line)
        }
    }

    /// Finds the first rule covering this host and status
    fn find_exception(&self, url: &Url, status: u16) -> Option<&ExceptionRule> {
        let host = extract_host(url)?;
        self.rules.iter().find(|rule| {
            rule.statuses.contains(&status)
                && rule.hosts.iter().any(|pattern| matches_host(pattern, &host))
        })
    }
}

/// Formats a status as its reason line, e.g. "404 Not Found"
///
/// Non-standard codes such as 999 have no reason phrase and render as the
/// bare number.
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
