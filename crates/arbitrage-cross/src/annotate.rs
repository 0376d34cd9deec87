//! Best-effort commentary attached to finished opportunities.
//!
//! Annotation runs after the opportunity list is final. A slow or failing
//! annotator only leaves its own opportunity without commentary.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AnnotationError;
use crate::evaluator::ArbitrageResult;

/// Produces a short human-readable note for an opportunity.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Annotates one opportunity.
    async fn annotate(&self, opportunity: &ArbitrageResult) -> Result<String, AnnotationError>;
}

/// An opportunity with optional commentary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedOpportunity {
    /// The opportunity itself.
    #[serde(flatten)]
    pub result: ArbitrageResult,
    /// Commentary, absent when annotation failed or was disabled.
    pub commentary: Option<String>,
}

impl AnnotatedOpportunity {
    /// Wraps a result without commentary.
    #[must_use]
    pub fn bare(result: ArbitrageResult) -> Self {
        Self {
            result,
            commentary: None,
        }
    }
}

/// Renders a deterministic one-line trade summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAnnotator;

impl SummaryAnnotator {
    /// Formats the summary synchronously.
    #[must_use]
    pub fn summarize(opportunity: &ArbitrageResult) -> String {
        let ((side_a, price_a), (side_b, price_b)) = opportunity.legs();
        let (price_a, price_b) = (price_a.normalize(), price_b.normalize());
        format!(
            "Buy {side_a} on {} @ {price_a} + {side_b} on {} @ {price_b} for {}% margin (confidence {:.2})",
            opportunity.listing_a.platform,
            opportunity.listing_b.platform,
            opportunity.margin_pct().round_dp(2).normalize(),
            opportunity.confidence,
        )
    }
}

#[async_trait]
impl Annotator for SummaryAnnotator {
    async fn annotate(&self, opportunity: &ArbitrageResult) -> Result<String, AnnotationError> {
        Ok(Self::summarize(opportunity))
    }
}

/// Annotates every opportunity concurrently, each bounded by `timeout`.
///
/// Order is preserved; failures and timeouts yield `commentary: None`.
pub async fn annotate_all(
    annotator: &dyn Annotator,
    opportunities: Vec<ArbitrageResult>,
    timeout: Duration,
) -> Vec<AnnotatedOpportunity> {
    let notes = join_all(opportunities.iter().map(|opportunity| async move {
        match tokio::time::timeout(timeout, annotator.annotate(opportunity)).await {
            Ok(Ok(note)) => Some(note),
            Ok(Err(e)) => {
                warn!(listing_a = %opportunity.listing_a.source_id, error = %e, "Annotation failed");
                None
            }
            Err(_) => {
                let e = AnnotationError::Timeout(timeout);
                warn!(listing_a = %opportunity.listing_a.source_id, error = %e, "Annotation failed");
                None
            }
        }
    }))
    .await;

    opportunities
        .into_iter()
        .zip(notes)
        .map(|(result, commentary)| AnnotatedOpportunity { result, commentary })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BinaryQuote, Category, MarketListing, Platform, Strategy};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn opportunity(title: &str) -> ArbitrageResult {
        let listing = |platform: Platform, yes: Decimal, no: Decimal| MarketListing {
            platform,
            source_id: format!("{platform}:{title}"),
            title: title.to_string(),
            category: Category::Crypto,
            quote: BinaryQuote { yes, no },
            volume: Decimal::ZERO,
        };

        ArbitrageResult {
            listing_a: listing(Platform::Kalshi, dec!(0.40), dec!(0.62)),
            listing_b: listing(Platform::Polymarket, dec!(0.55), dec!(0.45)),
            strategy: Strategy::BuyYesANoB,
            margin: dec!(0.15),
            price_delta_yes_pct: dec!(-15),
            price_delta_no_pct: dec!(17),
            confidence: 0.6833,
            matched_keywords: Default::default(),
        }
    }

    /// Fails on titles containing "fail", stalls on titles containing "slow".
    struct FlakyAnnotator;

    #[async_trait]
    impl Annotator for FlakyAnnotator {
        async fn annotate(&self, opportunity: &ArbitrageResult) -> Result<String, AnnotationError> {
            let title = &opportunity.listing_a.title;
            if title.contains("fail") {
                return Err(AnnotationError::Failed("upstream refused".to_string()));
            }
            if title.contains("slow") {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(format!("note for {title}"))
        }
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(
            SummaryAnnotator::summarize(&opportunity("Will BTC hit $100k?")),
            "Buy YES on Kalshi @ 0.4 + NO on Polymarket @ 0.45 for 15% margin (confidence 0.68)"
        );
    }

    #[tokio::test]
    async fn test_annotate_all_with_summary() {
        let out = annotate_all(
            &SummaryAnnotator,
            vec![opportunity("a"), opportunity("b")],
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|o| o.commentary.is_some()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_and_timeouts_leave_commentary_empty() {
        let out = annotate_all(
            &FlakyAnnotator,
            vec![opportunity("ok one"), opportunity("fail"), opportunity("slow"), opportunity("ok two")],
            Duration::from_millis(500),
        )
        .await;

        let commentary: Vec<Option<&str>> = out.iter().map(|o| o.commentary.as_deref()).collect();
        assert_eq!(
            commentary,
            vec![Some("note for ok one"), None, None, Some("note for ok two")]
        );
        // Order and content of the results are untouched
        assert_eq!(out[2].result.listing_a.title, "slow");
        assert_eq!(out[1].result.margin, dec!(0.15));
    }

    #[test]
    fn test_annotated_serializes_flat() {
        let annotated = AnnotatedOpportunity::bare(opportunity("x"));
        let json = serde_json::to_value(&annotated).unwrap();
        assert!(json.get("margin").is_some());
        assert!(json.get("commentary").unwrap().is_null());
    }
}
