//! Link checking engine
//!
//! This module contains the core checking logic, including:
//! - The depth-first crawl engine ([`Checker`])
//! - HTTP fetching behind the [`Fetch`] trait
//! - Anchor extraction from HTML
//! - Outcome classification with per-host exceptions
//! - Adaptive rate limiting

mod classify;
mod engine;
mod fetcher;
mod limiter;
mod parser;

pub use classify::{status_line, Classifier};
pub use engine::{Checker, RunOutcome};
pub use fetcher::{
    build_http_client, error_chain, is_certificate_error, Fetch, FetchedPage, HttpFetcher,
};
pub use limiter::{AdaptiveLimiter, RAMP_FACTOR};
pub use parser::extract_hrefs;
