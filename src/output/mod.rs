//! Output module for reporting link-check results
//!
//! This module handles:
//! - Colored rendering of individual results
//! - Tallying results into a run summary
//! - Printing the per-page problem listing

mod render;
mod summary;

pub use render::{render_result, render_status};
pub use summary::{print_summary, problems_by_referrer, CrawlSummary};
