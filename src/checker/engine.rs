//! Crawl engine - link checking orchestration
//!
//! The [`Checker`] owns every piece of per-run state (visited set, result log,
//! rate limiter) and drives the traversal:
//! - Fetching each page behind the adaptive rate limiter
//! - Retrying throttled requests at a reduced rate
//! - Classifying and recording every outcome
//! - Parsing same-site HTML pages for further links
//!
//! Traversal is depth-first over an explicit stack of page frames. A child
//! link is checked against the visited set only once the subtree of the
//! sibling before it is finished, which matches plain recursion.

use crate::checker::classify::{status_line, Classifier};
use crate::checker::fetcher::{Fetch, FetchedPage, HttpFetcher};
use crate::checker::limiter::AdaptiveLimiter;
use crate::checker::parser::extract_hrefs;
use crate::config::{validate, Config, InvalidLinkPolicy};
use crate::state::{LinkResult, LinkStatus, ResultLog, VisitedSet, START_REFERRER};
use crate::url::{normalize_seed, resolve_link, same_site};
use crate::{Cancelled, WeaverError};
use reqwest::StatusCode;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every reachable link was checked
    Completed,

    /// The cancellation token fired; results so far are still available
    Cancelled,
}

/// A fetched page whose links are still being worked through
struct PageFrame {
    page: Url,
    hrefs: std::vec::IntoIter<String>,
}

/// Site-scoped link checker
///
/// One checker performs one run; create a new one for each seed.
pub struct Checker {
    fetcher: Box<dyn Fetch>,
    classifier: Classifier,
    limiter: AdaptiveLimiter,
    visited: VisitedSet,
    results: ResultLog,
    output: Box<dyn Write + Send>,
    verbose: bool,
    base_url: Option<Url>,
    max_throttle_retries: u32,
    invalid_links: InvalidLinkPolicy,
}

impl Checker {
    /// Creates a checker with an HTTP fetcher built from the configuration
    ///
    /// Output goes to stdout and verbose mode is off.
    ///
    /// # Returns
    ///
    /// * `Ok(Checker)` - Ready to run
    /// * `Err(WeaverError)` - The configuration is invalid or the HTTP client
    ///   could not be built
    pub fn new(config: &Config) -> Result<Self, WeaverError> {
        validate(config)?;
        let fetcher = HttpFetcher::from_config(&config.checker)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Creates a checker that fetches through the given implementation
    pub fn with_fetcher(config: &Config, fetcher: impl Fetch + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            classifier: Classifier::new(config.exceptions.clone()),
            limiter: AdaptiveLimiter::new(
                config.checker.max_rate,
                Duration::from_secs(config.checker.cooldown_secs),
            ),
            visited: VisitedSet::new(),
            results: ResultLog::new(),
            output: Box::new(std::io::stdout()),
            verbose: false,
            base_url: None,
            max_throttle_retries: config.checker.max_throttle_retries,
            invalid_links: config.checker.invalid_links,
        }
    }

    /// Reports every result and rate change, not just problems
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Redirects per-link lines to another writer
    pub fn set_output(&mut self, output: impl Write + Send + 'static) {
        self.output = Box::new(output);
    }

    /// Replaces the per-host exception table
    pub fn set_classifier(&mut self, classifier: Classifier) {
        self.classifier = classifier;
    }

    /// Returns the current request rate (requests per second)
    pub fn rate_limit(&self) -> f64 {
        self.limiter.rate()
    }

    /// Overrides the current request rate (requests per second)
    pub fn set_rate_limit(&mut self, rate: f64) {
        self.limiter.set_rate(rate);
    }

    /// Overrides the rate ceiling
    pub fn set_max_rate(&mut self, max_rate: f64) {
        self.limiter.set_max_rate(max_rate);
    }

    /// Halves the request rate as if the server had answered 429
    ///
    /// Returns the new rate.
    pub fn reduce_rate_limit(&mut self) -> f64 {
        let rate = self.limiter.throttle();
        self.info(&format!("reducing rate limit to {:.2}r/s", rate));
        rate
    }

    /// Returns all results recorded so far, in order
    pub fn results(&self) -> &[LinkResult] {
        self.results.entries()
    }

    /// Consumes the checker, returning its results
    pub fn into_results(self) -> Vec<LinkResult> {
        self.results.into_entries()
    }

    /// Returns how many distinct URLs have been scheduled
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns the normalized seed once a run has started
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Checks every link reachable from `seed` on the same site
    ///
    /// A seed that cannot be parsed produces a single error result. All other
    /// failures are recorded as results too; only cancellation ends the run
    /// early.
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute URL of the first page
    /// * `cancel` - Stops the run at the next rate-limit wait or fetch
    pub async fn check(&mut self, seed: &str, cancel: &CancellationToken) -> RunOutcome {
        let seed_url = match normalize_seed(seed) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Invalid seed URL {}: {}", seed, e);
                self.record(LinkResult::new(
                    seed,
                    LinkStatus::Error,
                    format!("parse \"{}\": {}", seed, e),
                    START_REFERRER,
                ));
                return RunOutcome::Completed;
            }
        };

        tracing::info!("Checking links from {}", seed_url);
        self.base_url = Some(seed_url.clone());
        self.visited.insert(seed_url.as_str());

        let mut stack: Vec<PageFrame> = Vec::new();
        match self.visit(&seed_url, START_REFERRER, cancel).await {
            Ok(Some(frame)) => stack.push(frame),
            Ok(None) => {}
            Err(Cancelled) => return self.cancelled(),
        }

        while let Some(frame) = stack.last_mut() {
            let Some(href) = frame.hrefs.next() else {
                stack.pop();
                continue;
            };
            let page = frame.page.clone();

            let link = match resolve_link(&href, &page) {
                Ok(Some(link)) => link,
                Ok(None) => continue,
                Err(e) => {
                    self.record(LinkResult::new(
                        href.as_str(),
                        LinkStatus::Error,
                        format!("parse \"{}\": {}", href, e),
                        page.as_str(),
                    ));
                    if self.invalid_links == InvalidLinkPolicy::AbortPage {
                        tracing::debug!("Abandoning remaining links on {}", page);
                        stack.pop();
                    }
                    continue;
                }
            };

            if !self.visited.insert(link.as_str()) {
                continue;
            }

            match self.visit(&link, page.as_str(), cancel).await {
                Ok(Some(child)) => stack.push(child),
                Ok(None) => {}
                Err(Cancelled) => return self.cancelled(),
            }
        }

        tracing::info!("Checked {} links from {}", self.results.len(), seed_url);
        RunOutcome::Completed
    }

    /// Fetches, classifies and records one page
    ///
    /// Returns a frame of the page's links if it should be crawled further.
    async fn visit(
        &mut self,
        page: &Url,
        referrer: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<PageFrame>, Cancelled> {
        let Some(fetched) = self.fetch_with_retry(page, referrer, cancel).await? else {
            return Ok(None);
        };

        if let Some(rate) = self.limiter.ramp_up() {
            self.info(&format!("increasing rate limit to {:.2}r/s", rate));
        }

        let (status, message) = self.classifier.classify_status(page, fetched.status);
        self.record(LinkResult::new(page.as_str(), status, message, referrer));

        Ok(self.page_frame(page, fetched))
    }

    /// Issues the GET, retrying while the server answers 429
    ///
    /// Returns `None` once a terminal result (transport failure or retry
    /// exhaustion) has been recorded.
    async fn fetch_with_retry(
        &mut self,
        page: &Url,
        referrer: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<FetchedPage>, Cancelled> {
        let mut retries = 0;

        loop {
            self.limiter.acquire(cancel).await?;

            tracing::debug!("Fetching {}", page);
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Cancelled),
                outcome = self.fetcher.fetch(page) => outcome,
            };

            let fetched = match outcome {
                Ok(fetched) => fetched,
                Err(error) => {
                    let (status, message) = self.classifier.classify_error(&error);
                    self.record(LinkResult::new(page.as_str(), status, message, referrer));
                    return Ok(None);
                }
            };

            if fetched.status != StatusCode::TOO_MANY_REQUESTS {
                return Ok(Some(fetched));
            }

            self.reduce_rate_limit();

            if retries >= self.max_throttle_retries {
                self.record(LinkResult::new(
                    page.as_str(),
                    LinkStatus::Warning,
                    format!(
                        "{} (gave up after {} retries)",
                        status_line(fetched.status),
                        retries
                    ),
                    referrer,
                ));
                return Ok(None);
            }

            retries += 1;
            tracing::debug!("Retrying {} after throttling (attempt {})", page, retries);
        }
    }

    /// Decides whether a fetched page is parsed for links
    fn page_frame(&self, page: &Url, fetched: FetchedPage) -> Option<PageFrame> {
        let in_scope = self
            .base_url
            .as_ref()
            .is_some_and(|base| same_site(&fetched.url, base));
        if !in_scope {
            tracing::debug!("Not parsing offsite page {}", fetched.url);
            return None;
        }

        if !fetched.is_html() {
            tracing::debug!(
                "Not parsing {} ({})",
                page,
                fetched.content_type.as_deref().unwrap_or("unknown type")
            );
            return None;
        }

        let body = fetched.body?;
        let hrefs = extract_hrefs(&body);
        tracing::debug!("Found {} links on {}", hrefs.len(), page);

        Some(PageFrame {
            page: page.clone(),
            hrefs: hrefs.into_iter(),
        })
    }

    /// Appends a result, echoing it to the output when appropriate
    fn record(&mut self, result: LinkResult) {
        tracing::debug!(
            status = %result.status,
            link = %result.link,
            "{}",
            result.message
        );
        if self.verbose || result.status.is_problem() {
            let line = result.to_string();
            self.emit(&line);
        }
        self.results.push(result);
    }

    /// Reports an informational event (rate changes)
    fn info(&mut self, message: &str) {
        tracing::info!("{}", message);
        if self.verbose {
            self.emit(&format!("[INFO] {}", message));
        }
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.output, "{}", line) {
            tracing::warn!("Failed to write output: {}", e);
        }
    }

    fn cancelled(&self) -> RunOutcome {
        tracing::info!("Run cancelled after {} results", self.results.len());
        RunOutcome::Cancelled
    }
}
