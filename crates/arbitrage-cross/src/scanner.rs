//! Pairing pass over two platforms' listings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregator::aggregate_counted;
use crate::classifier::CategoryClassifier;
use crate::error::ScanError;
use crate::evaluator::{ArbitrageEvaluator, ArbitrageResult, EvaluatorConfig};
use crate::matcher::{build_matcher, build_matcher_with_classifier, MatchConfig, TitleMatcher};
use crate::types::{Category, MarketListing, MatchCandidate};

/// Counters describing one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Listings on the first platform.
    pub listings_a: usize,
    /// Listings on the second platform.
    pub listings_b: usize,
    /// Same-category pairs handed to the matcher.
    pub pairs_compared: usize,
    /// Pairs never compared because their categories differ.
    pub pairs_skipped_by_category: usize,
    /// Pairs the matcher accepted.
    pub matches: usize,
    /// Pairs skipped because a title was malformed.
    pub matching_errors: usize,
    /// Matched pairs skipped because a price was invalid.
    pub pricing_errors: usize,
    /// Matched pairs whose margin fell inside the acceptance band.
    pub accepted: usize,
    /// Accepted results dropped as duplicates.
    pub duplicates_dropped: usize,
}

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Counters for the scan.
    pub stats: ScanStats,
    /// Opportunities, best margin first.
    pub opportunities: Vec<ArbitrageResult>,
}

/// Matches listings across two platforms and scores every match.
#[derive(Debug)]
pub struct OpportunityScanner {
    matcher: Box<dyn TitleMatcher>,
    evaluator: ArbitrageEvaluator,
}

impl OpportunityScanner {
    /// Creates a scanner from a matcher and an evaluator.
    #[must_use]
    pub fn new(matcher: Box<dyn TitleMatcher>, evaluator: ArbitrageEvaluator) -> Self {
        Self { matcher, evaluator }
    }

    /// Creates a scanner from configuration.
    #[must_use]
    pub fn from_config(matching: &MatchConfig, evaluator: EvaluatorConfig) -> Self {
        Self::new(
            build_matcher(matching),
            ArbitrageEvaluator::with_config(evaluator),
        )
    }

    /// Creates a scanner whose matcher gates on `classifier`.
    ///
    /// Pass the classifier the listings were normalized with, so the
    /// category buckets and the matcher agree.
    #[must_use]
    pub fn from_config_with_classifier(
        matching: &MatchConfig,
        evaluator: EvaluatorConfig,
        classifier: CategoryClassifier,
    ) -> Self {
        Self::new(
            build_matcher_with_classifier(matching, classifier),
            ArbitrageEvaluator::with_config(evaluator),
        )
    }

    /// Returns the matcher in use.
    #[must_use]
    pub fn matcher(&self) -> &dyn TitleMatcher {
        self.matcher.as_ref()
    }

    /// Scans every same-category pair of `listings_a` × `listings_b`.
    ///
    /// A malformed title or invalid price only costs its own pair. Pairs are
    /// visited in input order of `listings_a`, then `listings_b`, so the
    /// result is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NoListings`] only if both sides are empty.
    pub fn scan(
        &self,
        listings_a: &[MarketListing],
        listings_b: &[MarketListing],
    ) -> Result<ScanReport, ScanError> {
        if listings_a.is_empty() && listings_b.is_empty() {
            return Err(ScanError::NoListings);
        }

        let mut stats = ScanStats {
            listings_a: listings_a.len(),
            listings_b: listings_b.len(),
            ..ScanStats::default()
        };

        let mut buckets: HashMap<Category, Vec<&MarketListing>> = HashMap::new();
        for listing in listings_b {
            buckets.entry(listing.category).or_default().push(listing);
        }

        let mut evaluations = Vec::new();
        for listing_a in listings_a {
            let Some(bucket) = buckets.get(&listing_a.category) else {
                continue;
            };

            for listing_b in bucket {
                stats.pairs_compared += 1;

                let result = match self.matcher.match_titles(&listing_a.title, &listing_b.title) {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(
                            listing_a = %listing_a.source_id,
                            listing_b = %listing_b.source_id,
                            error = %e,
                            "Skipping pair with malformed title"
                        );
                        stats.matching_errors += 1;
                        continue;
                    }
                };

                if !result.is_match {
                    continue;
                }

                stats.matches += 1;
                debug!(
                    listing_a = %listing_a.source_id,
                    listing_b = %listing_b.source_id,
                    confidence = result.confidence,
                    "Titles matched"
                );

                let candidate = MatchCandidate::new(listing_a.clone(), (*listing_b).clone(), result);
                match self.evaluator.evaluate_candidate(candidate) {
                    Ok(Some(opportunity)) => {
                        stats.accepted += 1;
                        evaluations.push(Some(opportunity));
                    }
                    Ok(None) => evaluations.push(None),
                    Err(e) => {
                        warn!(
                            listing_a = %listing_a.source_id,
                            listing_b = %listing_b.source_id,
                            error = %e,
                            "Skipping pair with invalid price"
                        );
                        stats.pricing_errors += 1;
                    }
                }
            }
        }

        stats.pairs_skipped_by_category =
            listings_a.len() * listings_b.len() - stats.pairs_compared;

        let (opportunities, duplicates) = aggregate_counted(evaluations);
        stats.duplicates_dropped = duplicates;

        info!(
            matcher = self.matcher.name(),
            pairs_compared = stats.pairs_compared,
            matches = stats.matches,
            opportunities = opportunities.len(),
            matching_errors = stats.matching_errors,
            pricing_errors = stats.pricing_errors,
            "Scan complete"
        );

        Ok(ScanReport {
            stats,
            opportunities,
        })
    }
}

impl Default for OpportunityScanner {
    fn default() -> Self {
        Self::from_config(&MatchConfig::default(), EvaluatorConfig::default())
    }
}
