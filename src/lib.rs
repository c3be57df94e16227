//! Weaver: a site-scoped link checker
//!
//! This crate crawls every page reachable from a seed URL on the same site,
//! fetches each discovered link once, and classifies the outcome while
//! adapting its request rate to server throttling.

pub mod checker;
pub mod config;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Weaver operations
#[derive(Debug, Error)]
pub enum WeaverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// Reasons a single link could not be fetched
///
/// The display text of every variant is the message recorded for the link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connect, timeout, unsupported scheme or a malformed request
    #[error("{0}")]
    Transport(String),

    /// The TLS handshake failed certificate verification
    #[error("{0}")]
    Certificate(String),

    /// The link could not be parsed as a URL
    #[error("{0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns true if this is a certificate-verification failure
    pub fn is_certificate(&self) -> bool {
        matches!(self, Self::Certificate(_))
    }
}

/// The run was cancelled while waiting on a suspension point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("crawl cancelled")]
pub struct Cancelled;

/// Result type alias for Weaver operations
pub type Result<T> = std::result::Result<T, WeaverError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use checker::{Checker, RunOutcome};
pub use config::Config;
pub use state::{LinkResult, LinkStatus};
