//! End-of-run summary

use super::render::render_result;
use crate::state::{LinkResult, LinkStatus};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Counts of each outcome for a finished (or cancelled) run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Number of links checked
    pub total: usize,

    pub ok: usize,
    pub skipped: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CrawlSummary {
    /// Tallies results from a run that took `elapsed`
    ///
    /// The start time is derived from the current time minus `elapsed`.
    pub fn from_results(results: &[LinkResult], elapsed: Duration) -> Self {
        let started_at = chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|d| Utc::now().checked_sub_signed(d))
            .unwrap_or_else(Utc::now);

        let count = |status: LinkStatus| results.iter().filter(|r| r.status == status).count();

        Self {
            started_at,
            elapsed,
            total: results.len(),
            ok: count(LinkStatus::Ok),
            skipped: count(LinkStatus::Skipped),
            errors: count(LinkStatus::Error),
            warnings: count(LinkStatus::Warning),
        }
    }

    /// Returns true if any link was classified as an error
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Formats the one-line tally, e.g. "12 links: 10 ok, 1 skipped, 1 errors, 0 warnings"
    pub fn tally(&self) -> String {
        format!(
            "{} links: {} ok, {} skipped, {} errors, {} warnings",
            self.total, self.ok, self.skipped, self.errors, self.warnings
        )
    }
}

/// Groups problem results by the page they were found on
///
/// Pages appear in sorted order; links keep their recorded order.
pub fn problems_by_referrer(results: &[LinkResult]) -> BTreeMap<&str, Vec<&LinkResult>> {
    let mut grouped: BTreeMap<&str, Vec<&LinkResult>> = BTreeMap::new();
    for result in results.iter().filter(|r| r.status.is_problem()) {
        grouped.entry(result.referrer.as_str()).or_default().push(result);
    }
    grouped
}

/// Prints the broken-link listing and the summary to stdout
///
/// # Arguments
///
/// * `summary` - Tallies for the run
/// * `results` - All results, used for the per-page problem listing
/// * `cancelled` - Whether the run ended early
pub fn print_summary(summary: &CrawlSummary, results: &[LinkResult], cancelled: bool) {
    let grouped = problems_by_referrer(results);
    if !grouped.is_empty() {
        println!("\n{}", "Problems by page:".bold());
        for (referrer, problems) in &grouped {
            println!("  {}", referrer.underline());
            for result in problems {
                println!("    {}", render_result(result));
            }
        }
    }

    println!();
    let heading = if cancelled {
        "Run cancelled".yellow().bold()
    } else {
        "Run complete".green().bold()
    };
    println!(
        "{} ({} started {}, took {:.1}s)",
        heading,
        summary.tally(),
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.elapsed.as_secs_f64()
    );

    if summary.has_errors() {
        println!("{}", format!("{} broken links found", summary.errors).red());
    }
}
