/// Link status definitions for classified fetch outcomes
use std::fmt;

/// The verdict recorded for a single link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    /// 2xx response
    Ok,

    /// Fetch failed outright or the status marks a dead resource
    Error,

    /// Any other non-success outcome, including certificate failures
    Warning,

    /// An expected non-success response from a known host
    Skipped,
}

impl LinkStatus {
    /// Returns true if this outcome is reported even when not verbose
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Error | Self::Warning)
    }

    /// Returns the fixed label used in rendered output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
