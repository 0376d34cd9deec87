//! Keyword-based topic classification of market titles.
//!
//! The classifier is a coarse pre-filter: only titles that land in the same
//! [`Category`] are ever handed to a title matcher, which keeps the
//! quadratic pairing pass small.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::types::Category;

/// Keywords that identify one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category assigned when any keyword matches.
    pub category: Category,
    /// Lowercase keywords.
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// Creates a rule from static keywords.
    #[must_use]
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches_word(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| keyword_matches(k, word))
    }
}

/// Keywords of four or more letters also match words they prefix
/// (`election` → `elections`); shorter ones must match a whole word so
/// `eth` does not fire inside `whether`.
fn keyword_matches(keyword: &str, word: &str) -> bool {
    word == keyword || (keyword.len() >= 4 && word.starts_with(keyword))
}

/// Assigns a [`Category`] to a title by ordered keyword lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryClassifier {
    rules: Vec<CategoryRule>,
}

impl CategoryClassifier {
    /// Creates a classifier with custom rules, evaluated in order.
    #[must_use]
    pub fn with_rules(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Returns the rules in priority order.
    #[must_use]
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Classifies a title. The first rule with a matching keyword wins;
    /// no match yields [`Category::Other`].
    #[must_use]
    pub fn classify(&self, title: &str) -> Category {
        let lowered = title.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        self.rules
            .iter()
            .find(|rule| words.iter().any(|w| rule.matches_word(w)))
            .map_or(Category::Other, |rule| rule.category)
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::with_rules(vec![
            CategoryRule::new(
                Category::Crypto,
                &[
                    "bitcoin", "btc", "ethereum", "eth", "solana", "crypto", "dogecoin", "doge",
                    "xrp", "stablecoin",
                ],
            ),
            CategoryRule::new(
                Category::Politics,
                &[
                    "election", "president", "senate", "senator", "congress", "democrat",
                    "republican", "governor", "nominee", "nomination", "mayor", "parliament",
                    "minister", "electoral", "gop",
                ],
            ),
            CategoryRule::new(
                Category::Sports,
                &[
                    "league", "championship", "match", "cup", "nba", "nfl", "mlb", "nhl", "ufc",
                    "fifa", "tournament", "playoff", "finals", "bowl", "olympic",
                ],
            ),
            CategoryRule::new(
                Category::Finance,
                &[
                    "rate", "fed", "index", "inflation", "cpi", "gdp", "recession", "nasdaq",
                    "dow", "treasury", "yield", "unemployment", "interest", "stock",
                ],
            ),
        ])
    }
}

/// Classifies a title with the default keyword table.
#[must_use]
pub fn classify(title: &str) -> Category {
    static DEFAULT: OnceLock<CategoryClassifier> = OnceLock::new();
    DEFAULT.get_or_init(CategoryClassifier::default).classify(title)
}
