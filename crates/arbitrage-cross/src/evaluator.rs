//! Arbitrage scoring of matched market pairs.
//!
//! For a pair of binary markets describing the same event, buying YES on one
//! and NO on the other pays out exactly one unit whichever way the event
//! resolves. When the two legs together cost less than one unit the
//! difference is a locked-in margin. Both complementary combinations are
//! checked and the better one is kept.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::InvalidPriceError;
use crate::types::{
    price_from_f64, validate_price, BinaryQuote, MarketListing, MatchCandidate, Side, Strategy,
};

// =============================================================================
// Evaluator Configuration
// =============================================================================

/// Acceptance band for arbitrage margins.
///
/// A margin is accepted only when `min_margin < margin < max_margin`. The
/// upper bound is not a trading limit: spreads that wide almost always mean
/// the two listings were matched by mistake and describe different events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Margins at or below this are ignored (as decimal).
    pub min_margin: Decimal,

    /// Margins at or above this are treated as false-positive matches.
    pub max_margin: Decimal,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            min_margin: dec!(0.01), // 1% minimum
            max_margin: dec!(0.5),
        }
    }
}

impl EvaluatorConfig {
    /// Creates a conservative configuration with a tighter band.
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            min_margin: dec!(0.02),
            max_margin: dec!(0.25),
        }
    }

    /// Creates an aggressive configuration that surfaces thinner spreads.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            min_margin: dec!(0.005),
            max_margin: dec!(0.5),
        }
    }

    /// Sets the minimum margin.
    #[must_use]
    pub fn with_min_margin(mut self, margin: Decimal) -> Self {
        self.min_margin = margin;
        self
    }

    /// Sets the maximum margin.
    #[must_use]
    pub fn with_max_margin(mut self, margin: Decimal) -> Self {
        self.max_margin = margin;
        self
    }

    /// Checks that the band is non-empty and within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns a description of the inconsistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_margin < Decimal::ZERO || self.max_margin > Decimal::ONE {
            return Err(format!(
                "evaluator margins must lie within [0, 1], got ({}, {})",
                self.min_margin, self.max_margin
            ));
        }
        if self.min_margin >= self.max_margin {
            return Err(format!(
                "evaluator.min_margin {} must be below evaluator.max_margin {}",
                self.min_margin, self.max_margin
            ));
        }
        Ok(())
    }

    /// Returns true if the margin lies strictly inside the band.
    #[must_use]
    pub fn accepts(&self, margin: Decimal) -> bool {
        margin > self.min_margin && margin < self.max_margin
    }
}

// =============================================================================
// Spread and Result Types
// =============================================================================

/// Best complementary spread for one pair of quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spread {
    /// Leg combination achieving the margin.
    pub strategy: Strategy,
    /// `1 - (cost of both legs)`, as decimal.
    pub margin: Decimal,
    /// `(yes_a - yes_b) * 100`, in percentage points.
    pub price_delta_yes_pct: Decimal,
    /// `(no_a - no_b) * 100`, in percentage points.
    pub price_delta_no_pct: Decimal,
}

impl Spread {
    /// Returns the margin as a percentage.
    #[must_use]
    pub fn margin_pct(&self) -> Decimal {
        self.margin * dec!(100)
    }

    /// Returns the combined cost of both legs.
    #[must_use]
    pub fn combined_cost(&self) -> Decimal {
        Decimal::ONE - self.margin
    }
}

/// An accepted arbitrage opportunity between two matched listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageResult {
    /// Listing from the first platform.
    pub listing_a: MarketListing,
    /// Listing from the second platform.
    pub listing_b: MarketListing,
    /// Leg combination to buy.
    pub strategy: Strategy,
    /// Locked-in margin per unit stake, as decimal.
    pub margin: Decimal,
    /// YES price difference in percentage points.
    pub price_delta_yes_pct: Decimal,
    /// NO price difference in percentage points.
    pub price_delta_no_pct: Decimal,
    /// Matcher confidence in `[0, 1]`.
    pub confidence: f64,
    /// Keywords shared by both titles.
    pub matched_keywords: BTreeSet<String>,
}

impl ArbitrageResult {
    /// Returns the margin as a percentage.
    #[must_use]
    pub fn margin_pct(&self) -> Decimal {
        self.margin * dec!(100)
    }

    /// Returns the combined cost of both legs.
    #[must_use]
    pub fn combined_cost(&self) -> Decimal {
        Decimal::ONE - self.margin
    }

    /// Returns the `(side, price)` bought on listing A and listing B.
    #[must_use]
    pub fn legs(&self) -> ((Side, Decimal), (Side, Decimal)) {
        let (side_a, side_b) = self.strategy.sides();
        (
            (side_a, self.listing_a.quote.price(side_a)),
            (side_b, self.listing_b.quote.price(side_b)),
        )
    }

    /// Returns the spread part of the result.
    #[must_use]
    pub fn spread(&self) -> Spread {
        Spread {
            strategy: self.strategy,
            margin: self.margin,
            price_delta_yes_pct: self.price_delta_yes_pct,
            price_delta_no_pct: self.price_delta_no_pct,
        }
    }
}

// =============================================================================
// Arbitrage Evaluator
// =============================================================================

/// Scores pairs of binary quotes for complementary-leg arbitrage.
#[derive(Debug, Clone, Default)]
pub struct ArbitrageEvaluator {
    config: EvaluatorConfig,
}

impl ArbitrageEvaluator {
    /// Creates an evaluator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator with custom configuration.
    #[must_use]
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluates four leg prices.
    ///
    /// Computes `margin1 = 1 - (yes_a + no_b)` and `margin2 = 1 - (no_a +
    /// yes_b)`, keeps the larger (ties go to `margin1`) and returns it only if
    /// it lies strictly inside the configured band.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPriceError`] if any price is outside `[0, 1]`.
    pub fn evaluate(
        &self,
        yes_a: Decimal,
        no_a: Decimal,
        yes_b: Decimal,
        no_b: Decimal,
    ) -> Result<Option<Spread>, InvalidPriceError> {
        let yes_a = validate_price(yes_a, "yes_a")?;
        let no_a = validate_price(no_a, "no_a")?;
        let yes_b = validate_price(yes_b, "yes_b")?;
        let no_b = validate_price(no_b, "no_b")?;

        let margin1 = Decimal::ONE - (yes_a + no_b);
        let margin2 = Decimal::ONE - (no_a + yes_b);

        let (strategy, margin) = if margin1 >= margin2 {
            (Strategy::BuyYesANoB, margin1)
        } else {
            (Strategy::BuyNoAYesB, margin2)
        };

        if !self.config.accepts(margin) {
            debug!(
                margin = %margin,
                min_margin = %self.config.min_margin,
                max_margin = %self.config.max_margin,
                "Margin outside acceptance band"
            );
            return Ok(None);
        }

        Ok(Some(Spread {
            strategy,
            margin,
            price_delta_yes_pct: (yes_a - yes_b) * dec!(100),
            price_delta_no_pct: (no_a - no_b) * dec!(100),
        }))
    }

    /// Evaluates two quotes, re-validating both.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPriceError`] if either quote holds an out-of-range price.
    pub fn evaluate_quotes(
        &self,
        a: &BinaryQuote,
        b: &BinaryQuote,
    ) -> Result<Option<Spread>, InvalidPriceError> {
        self.evaluate(a.yes, a.no, b.yes, b.no)
    }

    /// Evaluates floating point probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPriceError`] if any value is NaN, infinite or
    /// outside `[0, 1]`.
    pub fn evaluate_f64(
        &self,
        yes_a: f64,
        no_a: f64,
        yes_b: f64,
        no_b: f64,
    ) -> Result<Option<Spread>, InvalidPriceError> {
        self.evaluate(
            price_from_f64(yes_a, "yes_a")?,
            price_from_f64(no_a, "no_a")?,
            price_from_f64(yes_b, "yes_b")?,
            price_from_f64(no_b, "no_b")?,
        )
    }

    /// Evaluates a matched pair of listings.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPriceError`] if either listing holds an
    /// out-of-range price.
    pub fn evaluate_candidate(
        &self,
        candidate: MatchCandidate,
    ) -> Result<Option<ArbitrageResult>, InvalidPriceError> {
        let Some(spread) =
            self.evaluate_quotes(&candidate.listing_a.quote, &candidate.listing_b.quote)?
        else {
            return Ok(None);
        };

        info!(
            listing_a = %candidate.listing_a.source_id,
            listing_b = %candidate.listing_b.source_id,
            strategy = %spread.strategy,
            margin_pct = %spread.margin_pct(),
            confidence = candidate.confidence,
            "Arbitrage opportunity detected"
        );

        Ok(Some(ArbitrageResult {
            listing_a: candidate.listing_a,
            listing_b: candidate.listing_b,
            strategy: spread.strategy,
            margin: spread.margin,
            price_delta_yes_pct: spread.price_delta_yes_pct,
            price_delta_no_pct: spread.price_delta_no_pct,
            confidence: candidate.confidence,
            matched_keywords: candidate.matched_keywords,
        }))
    }

    /// Returns the better raw margin of the two leg combinations, unfiltered.
    #[must_use]
    pub fn best_margin(a: &BinaryQuote, b: &BinaryQuote) -> Decimal {
        let margin1 = Decimal::ONE - (a.yes + b.no);
        let margin2 = Decimal::ONE - (a.no + b.yes);
        margin1.max(margin2)
    }
}
