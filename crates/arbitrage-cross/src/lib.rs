//! Cross-platform market matching and arbitrage scoring.
//!
//! This crate finds the same binary event listed on Kalshi and Polymarket
//! and scores the price gap between the two listings.
//!
//! # Overview
//!
//! When the same event is priced differently on the two platforms, buying
//! complementary legs locks in a margin:
//!
//! ```text
//! Kalshi:     "Will Bitcoin reach $100,000 by end of 2025?"  YES 0.40  NO 0.62
//! Polymarket: "Will Bitcoin hit $100k in 2025?"              YES 0.55  NO 0.45
//!
//!   Buy Kalshi YES      @ 0.40
//!   Buy Polymarket NO   @ 0.45
//!   Total cost:           0.85
//!   Guaranteed payout:    1.00
//!   Margin:               0.15 (15%)
//! ```
//!
//! # Modules
//!
//! - [`normalizer`]: Raw provider markets to [`MarketListing`]s
//! - [`classifier`]: Coarse topic buckets that prune pairing
//! - [`matcher`]: Title matching strategies
//! - [`evaluator`]: Complementary-leg margin scoring
//! - [`aggregator`]: Dedupe and rank opportunities
//! - [`scanner`]: Full pairing pass over two listing sets
//! - [`cycle`]: Concurrent fetch, scan and annotation
//!
//! # Example
//!
//! ```
//! use event_arb_cross::{ArbitrageEvaluator, Strategy};
//! use rust_decimal_macros::dec;
//!
//! let evaluator = ArbitrageEvaluator::new();
//! let spread = evaluator
//!     .evaluate(dec!(0.40), dec!(0.60), dec!(0.55), dec!(0.45))
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(spread.strategy, Strategy::BuyYesANoB);
//! assert_eq!(spread.margin, dec!(0.15));
//! ```
//!
//! # Caveats
//!
//! Matching is textual. A high-confidence match does not prove the two
//! listings settle on identical criteria; check resolution rules before
//! trading a reported spread.

pub mod aggregator;
pub mod annotate;
pub mod classifier;
pub mod config;
pub mod config_loader;
pub mod cycle;
pub mod error;
pub mod evaluator;
pub mod matcher;
pub mod normalizer;
pub mod scanner;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use aggregator::{aggregate, aggregate_counted};
pub use annotate::{annotate_all, AnnotatedOpportunity, Annotator, SummaryAnnotator};
pub use classifier::{classify, CategoryClassifier, CategoryRule};
pub use config::{AnnotationConfig, EngineConfig, SourcesConfig};
pub use config_loader::ConfigLoader;
pub use cycle::{CycleReport, ScanCycle, SourceFailure};
pub use error::{
    AnnotationError, ConfigError, CycleError, InvalidPriceError, MatchingError, NormalizeError,
    ScanError, SourceError,
};
pub use evaluator::{ArbitrageEvaluator, ArbitrageResult, EvaluatorConfig, Spread};
pub use matcher::{
    build_matcher, build_matcher_with_classifier, KeywordSimilarityMatcher, MatchConfig,
    MatcherKind, NumericStrictMatcher, TitleMatcher,
};
pub use normalizer::{KalshiRawMarket, MarketNormalizer, NormalizerConfig, PolymarketRawMarket};
pub use scanner::{OpportunityScanner, ScanReport, ScanStats};
pub use source::{JsonFileSource, ListingSource, StaticSource};
pub use types::{
    BinaryQuote, Category, MarketListing, MatchCandidate, MatchResult, Platform, Side, Strategy,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_public_api_exports() {
        // Verify main types are accessible
        let _ = ArbitrageEvaluator::new();
        let _ = OpportunityScanner::default();
        let _ = MarketNormalizer::default();
        let _ = EvaluatorConfig::default();
        let _ = MatchConfig::default();
        let _ = EngineConfig::default();
    }

    #[test]
    fn test_types_accessible() {
        let _ = Side::Yes;
        let _ = Side::No;
        let _ = Platform::Kalshi;
        let _ = Platform::Polymarket;
        let _ = Strategy::BuyNoAYesB;
        let _ = Category::Finance;
    }

    #[test]
    fn test_integration_matcher_and_evaluator() {
        let matcher = build_matcher(&MatchConfig::default());
        let result = matcher
            .match_titles(
                "Will Bitcoin reach $100,000 by end of 2025?",
                "Will Bitcoin hit $100k in 2025?",
            )
            .unwrap();
        assert!(result.is_match);

        let spread = ArbitrageEvaluator::new()
            .evaluate(dec!(0.40), dec!(0.62), dec!(0.55), dec!(0.45))
            .unwrap();
        assert!(spread.is_some());
    }
}
