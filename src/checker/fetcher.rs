//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the checker, including:
//! - Building HTTP clients with a realistic user agent and timeout
//! - GET requests returning status, final URL and (HTML) body
//! - Error classification into transport and certificate failures
//!
//! Fetching sits behind the [`Fetch`] trait so callers can inject their own
//! client configuration or a test double.

use crate::config::CheckerConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;
use url::Url;

/// A response received for a checked link
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,

    /// HTTP status code
    pub status: StatusCode,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Page body; only read for HTML responses
    pub body: Option<String>,
}

impl FetchedPage {
    /// Returns true if the response declares HTML (or declares nothing)
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().map_or(true, is_html_content_type)
    }
}

/// Something that can GET a URL
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches a single URL
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - Any HTTP response, whatever its status
    /// * `Err(FetchError)` - No response was received
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// The default [`Fetch`] implementation backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    /// Wraps an existing client; `user_agent` is sent with every request
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }

    /// Builds a fetcher from checker configuration
    pub fn from_config(config: &CheckerConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::new(client, config.user_agent.clone()))
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::Transport(format!(
                "Get \"{}\": unsupported protocol scheme \"{}\"",
                url,
                url.scheme()
            )));
        }

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|e| classify_request_error(&e))?;

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let wants_body = content_type.as_deref().map_or(true, is_html_content_type);
        let body = if wants_body {
            match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::debug!("Failed to read body of {}: {}", url, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(FetchedPage {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The checker configuration (user agent and timeout)
///
/// # Example
///
/// ```no_run
/// use weaver::checker::build_http_client;
/// use weaver::config::CheckerConfig;
///
/// let client = build_http_client(&CheckerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CheckerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .use_rustls_tls()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Converts a request failure into a [`FetchError`]
fn classify_request_error(error: &reqwest::Error) -> FetchError {
    let message = error_chain(error);
    if is_certificate_error(error) {
        FetchError::Certificate(message)
    } else if error.is_builder() {
        FetchError::InvalidUrl(message)
    } else {
        FetchError::Transport(message)
    }
}

/// Renders an error with all of its causes
///
/// e.g. "error sending request: tcp connect error: Connection refused"
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Returns true if a TLS certificate failed verification anywhere in the chain
///
/// rustls errors surface wrapped in `std::io::Error`, whose `source()` skips
/// the wrapped value, so those are unwrapped explicitly.
pub fn is_certificate_error(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(tls) = err.downcast_ref::<rustls::Error>() {
            if matches!(tls, rustls::Error::InvalidCertificate(_)) {
                return true;
            }
        }

        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if let Some(inner) = io.get_ref() {
                if is_certificate_error(inner) {
                    return true;
                }
            }
        }

        current = err.source();
    }
    false
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
