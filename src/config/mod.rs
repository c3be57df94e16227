//! Configuration module for Weaver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use weaver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("weaver.toml")).unwrap();
//! println!("Rate ceiling: {} req/s", config.checker.max_rate);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_exceptions, CheckerConfig, Config, ExceptionRule, InvalidLinkPolicy,
    DEFAULT_COOLDOWN_SECS, DEFAULT_MAX_RATE, DEFAULT_MAX_THROTTLE_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
