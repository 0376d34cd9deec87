//! Shared types for cross-platform matching and arbitrage scoring.
//!
//! Everything here is rebuilt from fresh provider data on every scan cycle;
//! nothing is cached or mutated across cycles.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InvalidPriceError;

// =============================================================================
// Platform Identifiers
// =============================================================================

/// Identifies which platform a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Kalshi event contracts.
    Kalshi,
    /// Polymarket CLOB markets.
    Polymarket,
}

impl Platform {
    /// Returns the display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kalshi => "Kalshi",
            Self::Polymarket => "Polymarket",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Category
// =============================================================================

/// Coarse topical bucket used only to prune the matching search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Cryptocurrency prices and events.
    Crypto,
    /// Elections and government.
    Politics,
    /// Leagues, matches and tournaments.
    Sports,
    /// Rates, indices and macro releases.
    Finance,
    /// Anything the keyword table does not recognise.
    Other,
}

impl Category {
    /// All categories in classification priority order.
    pub const ALL: [Category; 5] = [
        Category::Crypto,
        Category::Politics,
        Category::Sports,
        Category::Finance,
        Category::Other,
    ];

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Politics => "politics",
            Self::Sports => "sports",
            Self::Finance => "finance",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Sides and Strategies
// =============================================================================

/// Outcome leg of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The event resolves true.
    Yes,
    /// The event resolves false.
    No,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complementary leg combination across the two listings of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Buy YES on listing A and NO on listing B.
    BuyYesANoB,
    /// Buy NO on listing A and YES on listing B.
    BuyNoAYesB,
}

impl Strategy {
    /// Returns the sides bought on listing A and listing B.
    #[must_use]
    pub fn sides(self) -> (Side, Side) {
        match self {
            Self::BuyYesANoB => (Side::Yes, Side::No),
            Self::BuyNoAYesB => (Side::No, Side::Yes),
        }
    }

    /// Returns the same trade described with A and B swapped.
    #[must_use]
    pub fn mirrored(self) -> Self {
        match self {
            Self::BuyYesANoB => Self::BuyNoAYesB,
            Self::BuyNoAYesB => Self::BuyYesANoB,
        }
    }

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuyYesANoB => "buy YES on A + NO on B",
            Self::BuyNoAYesB => "buy NO on A + YES on B",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Prices
// =============================================================================

/// Validates that a price lies in `[0, 1]`.
///
/// # Errors
///
/// Returns [`InvalidPriceError::OutOfRange`] otherwise.
pub fn validate_price(value: Decimal, leg: &'static str) -> Result<Decimal, InvalidPriceError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(InvalidPriceError::OutOfRange { leg, value });
    }
    Ok(value)
}

/// Converts a floating point probability into a validated decimal price.
///
/// # Errors
///
/// Returns an error if the value is NaN, infinite or outside `[0, 1]`.
pub fn price_from_f64(value: f64, leg: &'static str) -> Result<Decimal, InvalidPriceError> {
    if !value.is_finite() {
        return Err(InvalidPriceError::NotFinite { leg });
    }
    let price = Decimal::try_from(value).map_err(|_| InvalidPriceError::NotFinite { leg })?;
    validate_price(price, leg)
}

/// Converts an exchange-native cent price (0-100) into a fraction.
///
/// The division is exact, so `49` cents is exactly `0.49`.
///
/// # Errors
///
/// Returns an error if the result falls outside `[0, 1]`.
pub fn price_from_cents(cents: Decimal, leg: &'static str) -> Result<Decimal, InvalidPriceError> {
    validate_price(cents / dec!(100), leg)
}

/// Yes/No quote of a single binary market.
///
/// The two prices are independent and need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryQuote {
    /// Price of the YES leg as a probability.
    pub yes: Decimal,
    /// Price of the NO leg as a probability.
    pub no: Decimal,
}

impl BinaryQuote {
    /// Creates a validated quote.
    ///
    /// # Errors
    ///
    /// Returns an error if either price is outside `[0, 1]`.
    pub fn new(yes: Decimal, no: Decimal) -> Result<Self, InvalidPriceError> {
        Ok(Self {
            yes: validate_price(yes, "yes")?,
            no: validate_price(no, "no")?,
        })
    }

    /// Creates a quote from an outcome price list ordered `[yes, no]`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPriceError::LegCount`] unless exactly two legs are
    /// given, or a range error for either leg.
    pub fn from_legs(legs: &[Decimal]) -> Result<Self, InvalidPriceError> {
        match legs {
            [yes, no] => Self::new(*yes, *no),
            _ => Err(InvalidPriceError::LegCount { count: legs.len() }),
        }
    }

    /// Creates a quote from floating point probabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is not finite or outside `[0, 1]`.
    pub fn from_f64(yes: f64, no: f64) -> Result<Self, InvalidPriceError> {
        Ok(Self {
            yes: price_from_f64(yes, "yes")?,
            no: price_from_f64(no, "no")?,
        })
    }

    /// Re-checks the quote, for values that arrived through deserialization.
    ///
    /// # Errors
    ///
    /// Returns an error if either price is outside `[0, 1]`.
    pub fn validated(&self) -> Result<Self, InvalidPriceError> {
        Self::new(self.yes, self.no)
    }

    /// Returns the price of the given side.
    #[must_use]
    pub fn price(&self, side: Side) -> Decimal {
        match side {
            Side::Yes => self.yes,
            Side::No => self.no,
        }
    }
}

// =============================================================================
// Market Listing
// =============================================================================

/// A provider market reduced to the fields matching and scoring need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketListing {
    /// Platform the listing was fetched from.
    pub platform: Platform,
    /// Provider identifier (Kalshi ticker, Polymarket condition ID).
    pub source_id: String,
    /// Market question as displayed by the provider.
    pub title: String,
    /// Topic bucket assigned by the classifier.
    pub category: Category,
    /// Yes/No prices as probabilities.
    pub quote: BinaryQuote,
    /// Traded volume, for display only.
    pub volume: Decimal,
}

impl MarketListing {
    /// Returns the YES price.
    #[must_use]
    pub fn yes_price(&self) -> Decimal {
        self.quote.yes
    }

    /// Returns the NO price.
    #[must_use]
    pub fn no_price(&self) -> Decimal {
        self.quote.no
    }

    /// Returns the title lowercased and trimmed, used as a dedupe key.
    #[must_use]
    pub fn normalized_title(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

// =============================================================================
// Match Results
// =============================================================================

/// Verdict of a title matcher for one pair of titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the titles denote the same event.
    pub is_match: bool,
    /// Combined score in `[0, 1]`.
    pub confidence: f64,
    /// Keywords present in both titles.
    pub common_keywords: BTreeSet<String>,
}

impl MatchResult {
    /// A definite non-match with zero confidence.
    #[must_use]
    pub fn rejected() -> Self {
        Self {
            is_match: false,
            confidence: 0.0,
            common_keywords: BTreeSet::new(),
        }
    }
}

/// Two listings judged to describe the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Listing from the first platform.
    pub listing_a: MarketListing,
    /// Listing from the second platform.
    pub listing_b: MarketListing,
    /// Matcher confidence in `[0, 1]`.
    pub confidence: f64,
    /// Keywords shared by both titles.
    pub matched_keywords: BTreeSet<String>,
}

impl MatchCandidate {
    /// Builds a candidate from a positive match result.
    #[must_use]
    pub fn new(listing_a: MarketListing, listing_b: MarketListing, result: MatchResult) -> Self {
        Self {
            listing_a,
            listing_b,
            confidence: result.confidence,
            matched_keywords: result.common_keywords,
        }
    }
}
