//! State module for a single link-checking run
//!
//! # Components
//!
//! - `LinkStatus`: The verdict for a link (ok, error, warning, skipped)
//! - `LinkResult`: One classified outcome per attempted link
//! - `VisitedSet`: Deduplicates URLs so each is fetched at most once
//! - `ResultLog`: Append-only record of results in discovery order

mod log;
mod result;
mod status;
mod visited;

// Re-export main types
pub use log::ResultLog;
pub use result::{LinkResult, START_REFERRER};
pub use status::LinkStatus;
pub use visited::VisitedSet;
