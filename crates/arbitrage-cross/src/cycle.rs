//! One fetch → scan → annotate cycle.
//!
//! Nothing survives a cycle: listings are fetched fresh, scanned, and the
//! report is handed back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::annotate::{annotate_all, AnnotatedOpportunity, Annotator};
use crate::error::{CycleError, SourceError};
use crate::scanner::{OpportunityScanner, ScanStats};
use crate::source::ListingSource;
use crate::types::{MarketListing, Platform};

/// A source that failed during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Platform whose listings are missing from this cycle.
    pub platform: Platform,
    /// Error text.
    pub reason: String,
}

/// Outcome of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// When fetching started.
    pub started_at: DateTime<Utc>,
    /// When the report was finalized.
    pub finished_at: DateTime<Utc>,
    /// Sources that failed and were treated as empty.
    pub source_failures: Vec<SourceFailure>,
    /// Scan counters.
    pub stats: ScanStats,
    /// Opportunities, best margin first.
    pub opportunities: Vec<AnnotatedOpportunity>,
}

/// Drives a scan over two listing sources.
pub struct ScanCycle {
    source_a: Box<dyn ListingSource>,
    source_b: Box<dyn ListingSource>,
    scanner: OpportunityScanner,
    annotator: Option<Box<dyn Annotator>>,
    annotation_timeout: Duration,
}

impl ScanCycle {
    /// Creates a cycle without annotation.
    #[must_use]
    pub fn new(
        source_a: Box<dyn ListingSource>,
        source_b: Box<dyn ListingSource>,
        scanner: OpportunityScanner,
    ) -> Self {
        Self {
            source_a,
            source_b,
            scanner,
            annotator: None,
            annotation_timeout: Duration::from_secs(2),
        }
    }

    /// Attaches an annotator with a per-opportunity timeout.
    #[must_use]
    pub fn with_annotator(mut self, annotator: Box<dyn Annotator>, timeout: Duration) -> Self {
        self.annotator = Some(annotator);
        self.annotation_timeout = timeout;
        self
    }

    /// Runs one cycle.
    ///
    /// Both sources are fetched concurrently. If one fails its side is
    /// scanned as empty and the failure is recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::AllSourcesFailed`] if both sources fail, or
    /// [`CycleError::Scan`] if neither produced a listing.
    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        let started_at = Utc::now();

        let (fetched_a, fetched_b) = tokio::join!(self.source_a.fetch(), self.source_b.fetch());

        let mut source_failures = Vec::new();
        let (listings_a, listings_b) = match (fetched_a, fetched_b) {
            (Err(first), Err(second)) => {
                return Err(CycleError::AllSourcesFailed { first, second });
            }
            (a, b) => (
                degrade(self.source_a.platform(), a, &mut source_failures),
                degrade(self.source_b.platform(), b, &mut source_failures),
            ),
        };

        let report = self.scanner.scan(&listings_a, &listings_b)?;

        let opportunities = match &self.annotator {
            Some(annotator) => {
                annotate_all(
                    annotator.as_ref(),
                    report.opportunities,
                    self.annotation_timeout,
                )
                .await
            }
            None => report
                .opportunities
                .into_iter()
                .map(AnnotatedOpportunity::bare)
                .collect(),
        };

        let finished_at = Utc::now();
        info!(
            listings_a = listings_a.len(),
            listings_b = listings_b.len(),
            opportunities = opportunities.len(),
            failed_sources = source_failures.len(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Scan cycle complete"
        );

        Ok(CycleReport {
            started_at,
            finished_at,
            source_failures,
            stats: report.stats,
            opportunities,
        })
    }
}

fn degrade(
    platform: Platform,
    fetched: Result<Vec<MarketListing>, SourceError>,
    failures: &mut Vec<SourceFailure>,
) -> Vec<MarketListing> {
    match fetched {
        Ok(listings) => listings,
        Err(e) => {
            warn!(platform = %platform, error = %e, "Source failed, scanning without it");
            failures.push(SourceFailure {
                platform,
                reason: e.to_string(),
            });
            Vec::new()
        }
    }
}
