//! Title matching for cross-platform markets.
//!
//! Kalshi and Polymarket phrase the same event differently, so matching is
//! done on the question text. Two strategies are available behind the
//! [`TitleMatcher`] trait and selected through [`MatchConfig::strategy`]:
//!
//! - [`KeywordSimilarityMatcher`]: keyword overlap blended with character
//!   bigram similarity.
//! - [`NumericStrictMatcher`]: additionally requires the amounts, months and
//!   years stated in both titles to agree exactly.

mod keyword;
mod numeric;
pub mod text;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::classifier::CategoryClassifier;
use crate::error::MatchingError;
use crate::types::MatchResult;

pub use keyword::KeywordSimilarityMatcher;
pub use numeric::NumericStrictMatcher;

// =============================================================================
// Match Configuration
// =============================================================================

/// Available title matching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Keyword overlap plus bigram similarity.
    #[default]
    KeywordSimilarity,
    /// Bigram similarity gated on identical numeric and date facts.
    NumericStrict,
}

impl MatcherKind {
    /// Returns the configuration name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeywordSimilarity => "keyword_similarity",
            Self::NumericStrict => "numeric_strict",
        }
    }
}

impl std::fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for title matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Strategy used to compare titles.
    pub strategy: MatcherKind,

    /// Confidence must exceed this for a keyword match (0.0 to 1.0).
    pub confidence_threshold: f64,

    /// Minimum number of shared keywords for a keyword match.
    pub min_common_keywords: usize,

    /// Similarity must exceed this for a numeric-strict match (0.0 to 1.0).
    pub similarity_threshold: f64,

    /// Longest title, in characters, accepted by the matcher.
    pub max_title_len: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            strategy: MatcherKind::KeywordSimilarity,
            confidence_threshold: 0.65,
            min_common_keywords: 2,
            similarity_threshold: 0.75,
            max_title_len: 512,
        }
    }
}

impl MatchConfig {
    /// Creates a strict configuration that requires numeric facts to agree.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strategy: MatcherKind::NumericStrict,
            confidence_threshold: 0.70,
            min_common_keywords: 3,
            similarity_threshold: 0.80,
            ..Self::default()
        }
    }

    /// Creates a relaxed configuration for broader matching.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            strategy: MatcherKind::KeywordSimilarity,
            confidence_threshold: 0.55,
            min_common_keywords: 2,
            similarity_threshold: 0.65,
            ..Self::default()
        }
    }

    /// Sets the matching strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: MatcherKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the keyword-strategy confidence threshold.
    #[must_use]
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Sets the minimum number of shared keywords.
    #[must_use]
    pub fn with_min_common_keywords(mut self, count: usize) -> Self {
        self.min_common_keywords = count;
        self
    }

    /// Sets the numeric-strategy similarity threshold.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Sets the maximum accepted title length.
    #[must_use]
    pub fn with_max_title_len(mut self, len: usize) -> Self {
        self.max_title_len = len;
        self
    }

    /// Checks that thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistent value.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("similarity_threshold", self.similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("matching.{name} must be within [0, 1], got {value}"));
            }
        }
        if self.max_title_len == 0 {
            return Err("matching.max_title_len must be positive".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Matcher Trait
// =============================================================================

/// Decides whether two market titles denote the same event.
pub trait TitleMatcher: Send + Sync + Debug {
    /// Short strategy name for logs.
    fn name(&self) -> &'static str;

    /// Compares two titles.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidTitle`] if either title is malformed.
    fn match_titles(&self, title_a: &str, title_b: &str) -> Result<MatchResult, MatchingError>;
}

/// Builds the matcher selected by `config.strategy` with the default
/// category table.
#[must_use]
pub fn build_matcher(config: &MatchConfig) -> Box<dyn TitleMatcher> {
    build_matcher_with_classifier(config, CategoryClassifier::default())
}

/// Builds the matcher selected by `config.strategy`, gating categories with
/// `classifier`.
#[must_use]
pub fn build_matcher_with_classifier(
    config: &MatchConfig,
    classifier: CategoryClassifier,
) -> Box<dyn TitleMatcher> {
    match config.strategy {
        MatcherKind::KeywordSimilarity => Box::new(
            KeywordSimilarityMatcher::new(config.clone()).with_classifier(classifier),
        ),
        MatcherKind::NumericStrict => {
            Box::new(NumericStrictMatcher::new(config.clone()).with_classifier(classifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_config_presets() {
        let default = MatchConfig::default();
        assert_eq!(default.strategy, MatcherKind::KeywordSimilarity);
        assert!((default.confidence_threshold - 0.65).abs() < f64::EPSILON);
        assert_eq!(default.min_common_keywords, 2);

        let strict = MatchConfig::strict();
        assert_eq!(strict.strategy, MatcherKind::NumericStrict);
        assert!(strict.similarity_threshold > default.similarity_threshold);

        let relaxed = MatchConfig::relaxed();
        assert!(relaxed.confidence_threshold < default.confidence_threshold);
    }

    #[test]
    fn test_match_config_builders() {
        let config = MatchConfig::default()
            .with_strategy(MatcherKind::NumericStrict)
            .with_confidence_threshold(0.8)
            .with_min_common_keywords(4)
            .with_similarity_threshold(0.9)
            .with_max_title_len(64);

        assert_eq!(config.strategy, MatcherKind::NumericStrict);
        assert!((config.confidence_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.min_common_keywords, 4);
        assert!((config.similarity_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.max_title_len, 64);
    }

    #[test]
    fn test_match_config_validate() {
        assert!(MatchConfig::default().validate().is_ok());
        assert!(MatchConfig::default()
            .with_confidence_threshold(1.5)
            .validate()
            .is_err());
        assert!(MatchConfig::default().with_max_title_len(0).validate().is_err());
    }

    #[test]
    fn test_matcher_kind_serde_names() {
        let kind: MatcherKind = serde_json::from_str("\"numeric_strict\"").unwrap();
        assert_eq!(kind, MatcherKind::NumericStrict);
        assert_eq!(
            serde_json::to_string(&MatcherKind::KeywordSimilarity).unwrap(),
            "\"keyword_similarity\""
        );
    }

    #[test]
    fn test_build_matcher_selects_strategy() {
        let keyword = build_matcher(&MatchConfig::default());
        assert_eq!(keyword.name(), "keyword_similarity");

        let strict = build_matcher(&MatchConfig::strict());
        assert_eq!(strict.name(), "numeric_strict");
    }
}
