//! Terminal rendering of link results

use crate::state::{LinkResult, LinkStatus};
use colored::{ColoredString, Colorize};

/// Returns the bracketed status label, colored by severity
pub fn render_status(status: LinkStatus) -> ColoredString {
    let label = format!("[{}]", status);
    match status {
        LinkStatus::Ok => label.green(),
        LinkStatus::Error => label.red().bold(),
        LinkStatus::Warning => label.yellow(),
        LinkStatus::Skipped => label.dimmed(),
    }
}

/// Renders a result like its `Display` form, with a colored status label
pub fn render_result(result: &LinkResult) -> String {
    format!(
        "{} {} {} (referrer: {})",
        render_status(result.status),
        result.message,
        result.link,
        result.referrer
    )
}
