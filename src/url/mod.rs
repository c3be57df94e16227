//! URL handling module for Weaver
//!
//! This module provides seed normalization, link resolution, scope checks,
//! and host pattern matching for the exception table.

mod host;
mod matcher;
mod normalize;

pub use host::{extract_host, same_site};
pub use matcher::matches_host;
pub use normalize::{is_crawlable, normalize_seed, resolve_link};
