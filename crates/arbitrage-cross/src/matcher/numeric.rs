use std::collections::BTreeSet;

use tracing::debug;

use super::text::{extract_facts, similarity, tokenize, validate_title};
use super::{MatchConfig, TitleMatcher};
use crate::classifier::CategoryClassifier;
use crate::error::MatchingError;
use crate::types::MatchResult;

/// Matches titles only when their numeric and calendar facts agree.
///
/// Amounts, months and years must be identical sets on both sides, the
/// categories must agree, and the bigram similarity must exceed
/// [`MatchConfig::similarity_threshold`]. Confidence is the similarity when
/// the facts agree and zero otherwise.
#[derive(Debug, Clone)]
pub struct NumericStrictMatcher {
    config: MatchConfig,
    classifier: CategoryClassifier,
}

impl NumericStrictMatcher {
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
}

impl Default for NumericStrictMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::strict())
    }
}

impl TitleMatcher for NumericStrictMatcher {
    fn name(&self) -> &'static str {
        "numeric_strict"
    }

    fn match_titles(&self, title_a: &str, title_b: &str) -> Result<MatchResult, MatchingError> {
        validate_title(title_a, self.config.max_title_len)?;
        validate_title(title_b, self.config.max_title_len)?;

        if self.classifier.classify(title_a) != self.classifier.classify(title_b) {
            return Ok(MatchResult::rejected());
        }

        let facts_a = extract_facts(title_a);
        let facts_b = extract_facts(title_b);
        if facts_a != facts_b {
            debug!(?facts_a, ?facts_b, "Numeric facts differ");
            return Ok(MatchResult::rejected());
        }

        let common: BTreeSet<String> = tokenize(title_a)
            .intersection(&tokenize(title_b))
            .cloned()
            .collect();
        let confidence = similarity(title_a, title_b);
        let is_match = confidence > self.config.similarity_threshold;

        debug!(confidence, is_match, "Compared titles on numeric facts");

        Ok(MatchResult {
            is_match,
            confidence,
            common_keywords: common,
        })
    }
}
