use super::LinkStatus;
use std::fmt;

/// Referrer recorded for the seed page
pub const START_REFERRER: &str = "START";

/// One classified outcome per attempted link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    /// Absolute URL, or the raw href when it could not be parsed
    pub link: String,

    /// The verdict for this link
    pub status: LinkStatus,

    /// Status line, error text, or skip explanation
    pub message: String,

    /// Page the link was found on, or [`START_REFERRER`] for the seed
    pub referrer: String,
}

impl LinkResult {
    /// Creates a new result
    pub fn new(
        link: impl Into<String>,
        status: LinkStatus,
        message: impl Into<String>,
        referrer: impl Into<String>,
    ) -> Self {
        Self {
            link: link.into(),
            status,
            message: message.into(),
            referrer: referrer.into(),
        }
    }

    /// Returns true if this result is the seed page's
    pub fn is_seed(&self) -> bool {
        self.referrer == START_REFERRER
    }
}

impl fmt::Display for LinkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} (referrer: {})",
            self.status, self.message, self.link, self.referrer
        )
    }
}
