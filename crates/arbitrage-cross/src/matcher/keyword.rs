use std::collections::BTreeSet;

use tracing::debug;

use super::text::{similarity, tokenize, validate_title};
use super::{MatchConfig, TitleMatcher};
use crate::classifier::CategoryClassifier;
use crate::error::MatchingError;
use crate::types::MatchResult;

/// Matches titles on shared keywords blended with bigram similarity.
///
/// `confidence = 0.5 * keyword_score + 0.5 * similarity`, where
/// `keyword_score` is the number of shared keywords over the larger keyword
/// set. Titles in different categories never match.
#[derive(Debug, Clone)]
pub struct KeywordSimilarityMatcher {
    config: MatchConfig,
    classifier: CategoryClassifier,
}

impl KeywordSimilarityMatcher {
    /// Creates a matcher with the given configuration.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            classifier: CategoryClassifier::default(),
        }
    }

    /// Replaces the classifier used for the category gate.
    ///
    /// This should be the classifier that categorized the listings, or pairs
    /// bucketed together by the scanner can be rejected here.
    #[must_use]
    pub fn with_classifier(mut self, classifier: CategoryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }
}

impl Default for KeywordSimilarityMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

/// Shared keywords over the larger keyword set, 0 when both are empty.
pub(super) fn keyword_score(
    keywords_a: &BTreeSet<String>,
    keywords_b: &BTreeSet<String>,
    common: &BTreeSet<String>,
) -> f64 {
    let largest = keywords_a.len().max(keywords_b.len());
    if largest == 0 {
        return 0.0;
    }
    common.len() as f64 / largest as f64
}

impl TitleMatcher for KeywordSimilarityMatcher {
    fn name(&self) -> &'static str {
        "keyword_similarity"
    }

    fn match_titles(&self, title_a: &str, title_b: &str) -> Result<MatchResult, MatchingError> {
        validate_title(title_a, self.config.max_title_len)?;
        validate_title(title_b, self.config.max_title_len)?;

        let (category_a, category_b) = (
            self.classifier.classify(title_a),
            self.classifier.classify(title_b),
        );
        if category_a != category_b {
            debug!(
                category_a = %category_a,
                category_b = %category_b,
                "Category mismatch"
            );
            return Ok(MatchResult::rejected());
        }

        let keywords_a = tokenize(title_a);
        let keywords_b = tokenize(title_b);
        let common: BTreeSet<String> = keywords_a.intersection(&keywords_b).cloned().collect();

        let keyword_score = keyword_score(&keywords_a, &keywords_b, &common);
        let similarity = similarity(title_a, title_b);
        let confidence = 0.5 * keyword_score + 0.5 * similarity;

        let is_match = confidence > self.config.confidence_threshold
            && common.len() >= self.config.min_common_keywords;

        debug!(
            keyword_score,
            similarity,
            confidence,
            common = common.len(),
            is_match,
            "Compared titles"
        );

        Ok(MatchResult {
            is_match,
            confidence,
            common_keywords: common,
        })
    }
}
