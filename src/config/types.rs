use serde::Deserialize;

/// Default ceiling for the request rate (requests per second)
pub const DEFAULT_MAX_RATE: f64 = 5.0;

/// Default quiet period before the rate may ramp back up (seconds)
pub const DEFAULT_COOLDOWN_SECS: u64 = 10;

/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Default number of times a throttled request is retried
pub const DEFAULT_MAX_THROTTLE_RETRIES: u32 = 10;

/// A browser-like User-Agent; several hosts reject requests without one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Main configuration structure for Weaver
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub checker: CheckerConfig,

    /// Per-host exception rules, checked in order
    #[serde(rename = "exception", default = "default_exceptions")]
    pub exceptions: Vec<ExceptionRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checker: CheckerConfig::default(),
            exceptions: default_exceptions(),
        }
    }
}

/// Crawl engine behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Ceiling for the adaptive request rate (requests per second)
    #[serde(rename = "max-rate")]
    pub max_rate: f64,

    /// Minimum time since the last rate change before ramping up (seconds)
    #[serde(rename = "cooldown-secs")]
    pub cooldown_secs: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// How many times a 429 response is retried before giving up
    #[serde(rename = "max-throttle-retries")]
    pub max_throttle_retries: u32,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// What to do with the rest of a page after an unparseable link
    #[serde(rename = "invalid-links")]
    pub invalid_links: InvalidLinkPolicy,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_rate: DEFAULT_MAX_RATE,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_throttle_retries: DEFAULT_MAX_THROTTLE_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            invalid_links: InvalidLinkPolicy::default(),
        }
    }
}

/// Handling of a discovered href that cannot be parsed as a URL
///
/// The bad link is always recorded as an error; the policy only decides
/// whether its siblings on the same page are still checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidLinkPolicy {
    /// Record the bad link and keep checking the rest of the page
    #[default]
    Skip,

    /// Record the bad link and stop processing the page
    AbortPage,
}

/// A host-specific accommodation for responses that are expected noise
///
/// Any response whose host matches one of `hosts` and whose status is in
/// `statuses` is reported as skipped with `message`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExceptionRule {
    /// Host patterns (e.g., "twitter.com" or "*.linkedin.com")
    pub hosts: Vec<String>,

    /// HTTP status codes this rule applies to
    pub statuses: Vec<u16>,

    /// Explanation recorded instead of the raw status line
    pub message: String,
}

impl ExceptionRule {
    /// Creates a rule from borrowed parts
    pub fn new(hosts: &[&str], statuses: &[u16], message: &str) -> Self {
        Self {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            statuses: statuses.to_vec(),
            message: message.to_string(),
        }
    }
}

/// Hosts known to answer automated clients with 403
const FORBIDDERS: &[&str] = &[
    "www.npmjs.com",
    "www.researchgate.net",
    "www.fiverr.com",
    "www.tandfonline.com",
];

/// The built-in exception table used when the config doesn't provide one
pub fn default_exceptions() -> Vec<ExceptionRule> {
    vec![
        ExceptionRule::new(
            &["www.reuters.com"],
            &[401],
            "This site always returns 'unauthorized' to bots",
        ),
        ExceptionRule::new(
            &["twitter.com"],
            &[400],
            "This site always returns 'bad request' to bots",
        ),
        ExceptionRule::new(
            FORBIDDERS,
            &[403],
            "This site always returns 'forbidden' to bots",
        ),
        ExceptionRule::new(
            &["www.linkedin.com"],
            &[999],
            "This site always returns code 999 to bots",
        ),
    ]
}
