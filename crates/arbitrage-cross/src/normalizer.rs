//! Conversion of raw provider markets into [`MarketListing`]s.
//!
//! Kalshi quotes integer cents (1-99) while Polymarket quotes decimal
//! probabilities, sometimes as a JSON-encoded string inside the JSON
//! payload. Both are reduced to exact decimal probabilities here.

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::classifier::CategoryClassifier;
use crate::error::{InvalidPriceError, NormalizeError};
use crate::types::{price_from_cents, BinaryQuote, MarketListing, Platform};

// =============================================================================
// Raw Provider Types
// =============================================================================

/// Raw Kalshi market as returned by the markets endpoint.
///
/// Prices are in cents. A zero ask means the book side is empty and a zero
/// last price means the market never traded. Bid fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KalshiRawMarket {
    /// Market ticker (e.g., "KXBTC-25DEC31-B100000").
    pub ticker: String,
    /// Market title/question.
    #[serde(default)]
    pub title: String,
    /// Market subtitle.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Yes ask in cents.
    #[serde(default)]
    pub yes_ask: Option<Decimal>,
    /// No ask in cents.
    #[serde(default)]
    pub no_ask: Option<Decimal>,
    /// Last trade price in cents.
    #[serde(default)]
    pub last_price: Option<Decimal>,
    /// Traded volume in contracts.
    #[serde(default)]
    pub volume: Option<Decimal>,
}

/// Raw Polymarket market as returned by the Gamma markets endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolymarketRawMarket {
    /// Gamma market ID.
    #[serde(default)]
    pub id: Option<String>,
    /// On-chain condition ID.
    #[serde(default)]
    pub condition_id: Option<String>,
    /// Market question.
    #[serde(default)]
    pub question: Option<String>,
    /// Outcome labels, usually `["Yes", "No"]`.
    #[serde(default, deserialize_with = "de_string_list")]
    pub outcomes: Option<Vec<String>>,
    /// Outcome prices as decimal strings, aligned with `outcomes`.
    #[serde(default, deserialize_with = "de_string_list")]
    pub outcome_prices: Option<Vec<String>>,
    /// Traded volume in USDC.
    #[serde(default)]
    pub volume: Option<Decimal>,
}

/// Accepts either a JSON array or a JSON-encoded array string.
///
/// Gamma returns `"outcomePrices": "[\"0.55\", \"0.45\"]"`; other
/// endpoints return a plain array, sometimes of numbers.
fn de_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawList {
        List(Vec<serde_json::Value>),
        Encoded(String),
    }

    let Some(raw) = Option::<RawList>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let values = match raw {
        RawList::List(values) => values,
        RawList::Encoded(text) => serde_json::from_str(&text).map_err(D::Error::custom)?,
    };

    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!("unexpected list entry {other}"))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

// =============================================================================
// Normalizer Configuration
// =============================================================================

/// Configuration for raw market normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Index of the YES leg in Polymarket `outcomePrices` when the outcome
    /// labels do not say.
    pub polymarket_yes_index: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            polymarket_yes_index: 0,
        }
    }
}

impl NormalizerConfig {
    /// Sets the Polymarket YES leg index.
    #[must_use]
    pub fn with_polymarket_yes_index(mut self, index: usize) -> Self {
        self.polymarket_yes_index = index;
        self
    }

    /// Checks that the YES index addresses one of two legs.
    ///
    /// # Errors
    ///
    /// Returns a description of the invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.polymarket_yes_index > 1 {
            return Err(format!(
                "normalizer.polymarket_yes_index must be 0 or 1, got {}",
                self.polymarket_yes_index
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Market Normalizer
// =============================================================================

/// Turns raw provider markets into classified [`MarketListing`]s.
#[derive(Debug, Clone, Default)]
pub struct MarketNormalizer {
    config: NormalizerConfig,
    classifier: CategoryClassifier,
}

impl MarketNormalizer {
    /// Creates a normalizer with the default classifier.
    #[must_use]
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            classifier: CategoryClassifier::default(),
        }
    }

    /// Replaces the category classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: CategoryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Returns the classifier assigning listing categories.
    #[must_use]
    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Normalizes a Kalshi market.
    ///
    /// YES is the yes ask, falling back to the last trade. NO is the no ask,
    /// falling back to `100 - yes`. Zero asks and a zero last price count
    /// as missing.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the title or prices are unusable.
    pub fn normalize_kalshi(&self, raw: KalshiRawMarket) -> Result<MarketListing, NormalizeError> {
        let title = pick_title(&raw.title, raw.subtitle.as_deref()).ok_or_else(|| {
            NormalizeError::MissingTitle {
                source_id: raw.ticker.clone(),
            }
        })?;

        let yes_cents = raw
            .yes_ask
            .filter(|p| *p > Decimal::ZERO)
            .or(raw.last_price.filter(|p| *p > Decimal::ZERO))
            .ok_or_else(|| NormalizeError::MissingPrice {
                source_id: raw.ticker.clone(),
            })?;
        let no_cents = raw
            .no_ask
            .filter(|p| *p > Decimal::ZERO)
            .unwrap_or(Decimal::ONE_HUNDRED - yes_cents);

        let quote = cents_quote(yes_cents, no_cents).map_err(|source| {
            NormalizeError::InvalidPrice {
                source_id: raw.ticker.clone(),
                source,
            }
        })?;
        let volume = check_volume(&raw.ticker, raw.volume)?;

        Ok(MarketListing {
            platform: Platform::Kalshi,
            category: self.classifier.classify(&title),
            source_id: raw.ticker,
            title,
            quote,
            volume,
        })
    }

    /// Normalizes a Polymarket market.
    ///
    /// Outcome labels `Yes`/`No` decide which leg is YES; otherwise
    /// [`NormalizerConfig::polymarket_yes_index`] does.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the title or prices are unusable,
    /// including price lists without exactly two legs.
    pub fn normalize_polymarket(
        &self,
        raw: PolymarketRawMarket,
    ) -> Result<MarketListing, NormalizeError> {
        let source_id = raw
            .condition_id
            .clone()
            .or_else(|| raw.id.clone())
            .unwrap_or_default();

        let title = pick_title(raw.question.as_deref().unwrap_or_default(), None).ok_or_else(
            || NormalizeError::MissingTitle {
                source_id: source_id.clone(),
            },
        )?;

        let prices = raw
            .outcome_prices
            .as_deref()
            .filter(|prices| !prices.is_empty())
            .ok_or_else(|| NormalizeError::MissingPrice {
                source_id: source_id.clone(),
            })?;

        let mut legs = prices
            .iter()
            .map(|text| {
                text.trim()
                    .parse::<Decimal>()
                    .map_err(|_| NormalizeError::MalformedPrice {
                        source_id: source_id.clone(),
                        value: text.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if legs.len() == 2 && self.yes_index(raw.outcomes.as_deref()) == 1 {
            legs.swap(0, 1);
        }

        let quote = BinaryQuote::from_legs(&legs).map_err(|source| {
            NormalizeError::InvalidPrice {
                source_id: source_id.clone(),
                source,
            }
        })?;
        let volume = check_volume(&source_id, raw.volume)?;

        Ok(MarketListing {
            platform: Platform::Polymarket,
            category: self.classifier.classify(&title),
            source_id,
            title,
            quote,
            volume,
        })
    }

    fn yes_index(&self, outcomes: Option<&[String]>) -> usize {
        match outcomes {
            Some([first, second])
                if first.eq_ignore_ascii_case("no") && second.eq_ignore_ascii_case("yes") =>
            {
                1
            }
            Some([first, second])
                if first.eq_ignore_ascii_case("yes") && second.eq_ignore_ascii_case("no") =>
            {
                0
            }
            _ => self.config.polymarket_yes_index,
        }
    }
}

fn pick_title(title: &str, fallback: Option<&str>) -> Option<String> {
    [Some(title), fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

fn cents_quote(yes_cents: Decimal, no_cents: Decimal) -> Result<BinaryQuote, InvalidPriceError> {
    Ok(BinaryQuote {
        yes: price_from_cents(yes_cents, "yes")?,
        no: price_from_cents(no_cents, "no")?,
    })
}

fn check_volume(source_id: &str, volume: Option<Decimal>) -> Result<Decimal, NormalizeError> {
    let volume = volume.unwrap_or(Decimal::ZERO);
    if volume < Decimal::ZERO {
        return Err(NormalizeError::NegativeVolume {
            source_id: source_id.to_string(),
            volume,
        });
    }
    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use rust_decimal_macros::dec;

    fn kalshi(title: &str) -> KalshiRawMarket {
        KalshiRawMarket {
            ticker: "KXBTC-25DEC31-B100000".to_string(),
            title: title.to_string(),
            yes_ask: Some(dec!(40)),
            no_ask: Some(dec!(62)),
            last_price: Some(dec!(39)),
            volume: Some(dec!(15000)),
            ..Default::default()
        }
    }

    // ==================== Kalshi Tests ====================

    #[test]
    fn test_kalshi_uses_asks_in_cents() {
        let listing = MarketNormalizer::default()
            .normalize_kalshi(kalshi("Will Bitcoin reach $100,000 by end of 2025?"))
            .unwrap();

        assert_eq!(listing.platform, Platform::Kalshi);
        assert_eq!(listing.category, Category::Crypto);
        assert_eq!(listing.yes_price(), dec!(0.40));
        assert_eq!(listing.no_price(), dec!(0.62));
        assert_eq!(listing.volume, dec!(15000));
    }

    #[test]
    fn test_kalshi_falls_back_to_last_price() {
        let mut raw = kalshi("Will the Fed cut rates in March 2026?");
        raw.yes_ask = Some(Decimal::ZERO);
        raw.no_ask = None;
        raw.last_price = Some(dec!(49));

        let listing = MarketNormalizer::default().normalize_kalshi(raw).unwrap();
        assert_eq!(listing.yes_price(), dec!(0.49));
        assert_eq!(listing.no_price(), dec!(0.51));
    }

    #[test]
    fn test_kalshi_missing_price() {
        let mut raw = kalshi("Will the Fed cut rates?");
        raw.yes_ask = None;
        raw.last_price = None;

        let err = MarketNormalizer::default().normalize_kalshi(raw).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingPrice { .. }));
    }

    #[test]
    fn test_kalshi_never_traded_market_has_no_price() {
        let mut raw = kalshi("Will Bitcoin reach $100,000 by end of 2025?");
        raw.yes_ask = Some(Decimal::ZERO);
        raw.no_ask = Some(Decimal::ZERO);
        raw.last_price = Some(Decimal::ZERO);

        let err = MarketNormalizer::default().normalize_kalshi(raw).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingPrice { .. }));
    }

    #[test]
    fn test_kalshi_bid_fields_are_ignored() {
        let raw: KalshiRawMarket = serde_json::from_str(
            r#"{"ticker": "KXFED-26MAR", "title": "Will the Fed cut rates in March 2026?",
                "yes_bid": 28, "yes_ask": 30, "no_bid": 69, "no_ask": 72}"#,
        )
        .unwrap();

        let listing = MarketNormalizer::default().normalize_kalshi(raw).unwrap();
        assert_eq!(listing.yes_price(), dec!(0.30));
        assert_eq!(listing.no_price(), dec!(0.72));
    }

    #[test]
    fn test_kalshi_title_falls_back_to_subtitle() {
        let mut raw = kalshi("  ");
        raw.subtitle = Some("Bitcoin above $100k".to_string());
        let listing = MarketNormalizer::default().normalize_kalshi(raw).unwrap();
        assert_eq!(listing.title, "Bitcoin above $100k");

        let err = MarketNormalizer::default()
            .normalize_kalshi(kalshi(""))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::MissingTitle { .. }));
    }

    #[test]
    fn test_kalshi_out_of_range_cents() {
        let mut raw = kalshi("Will BTC hit $100k?");
        raw.no_ask = Some(dec!(140));
        let err = MarketNormalizer::default().normalize_kalshi(raw).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::InvalidPrice {
                source: InvalidPriceError::OutOfRange { leg: "no", .. },
                ..
            }
        ));
    }

    #[test]
    fn test_kalshi_negative_volume() {
        let mut raw = kalshi("Will BTC hit $100k?");
        raw.volume = Some(dec!(-5));
        let err = MarketNormalizer::default().normalize_kalshi(raw).unwrap_err();
        assert!(matches!(err, NormalizeError::NegativeVolume { .. }));
    }

    #[test]
    fn test_kalshi_deserializes_numeric_cents() {
        let raw: KalshiRawMarket = serde_json::from_str(
            r#"{"ticker": "KXSENATE-26", "title": "Will the Democrats win the Senate in 2026?",
                "yes_ask": 45, "no_ask": 57, "volume": 1200}"#,
        )
        .unwrap();
        let listing = MarketNormalizer::default().normalize_kalshi(raw).unwrap();
        assert_eq!(listing.yes_price(), dec!(0.45));
        assert_eq!(listing.no_price(), dec!(0.57));
        assert_eq!(listing.category, Category::Politics);
    }

    // ==================== Polymarket Tests ====================

    #[test]
    fn test_polymarket_encoded_prices() {
        let raw: PolymarketRawMarket = serde_json::from_str(
            r#"{"id": "512", "conditionId": "0xabc", "question": "Will Bitcoin hit $100k in 2025?",
                "outcomes": "[\"Yes\", \"No\"]", "outcomePrices": "[\"0.55\", \"0.45\"]",
                "volume": "250000.5"}"#,
        )
        .unwrap();

        let listing = MarketNormalizer::default().normalize_polymarket(raw).unwrap();
        assert_eq!(listing.platform, Platform::Polymarket);
        assert_eq!(listing.source_id, "0xabc");
        assert_eq!(listing.yes_price(), dec!(0.55));
        assert_eq!(listing.no_price(), dec!(0.45));
        assert_eq!(listing.volume, dec!(250000.5));
    }

    #[test]
    fn test_polymarket_plain_array_prices() {
        let raw: PolymarketRawMarket = serde_json::from_str(
            r#"{"id": "77", "question": "Who wins the World Cup?", "outcomePrices": [0.2, 0.8]}"#,
        )
        .unwrap();

        let listing = MarketNormalizer::default().normalize_polymarket(raw).unwrap();
        assert_eq!(listing.source_id, "77");
        assert_eq!(listing.yes_price(), dec!(0.2));
        assert_eq!(listing.category, Category::Sports);
    }

    #[test]
    fn test_polymarket_labels_override_index() {
        let raw = PolymarketRawMarket {
            id: Some("1".to_string()),
            question: Some("Will the Fed cut rates?".to_string()),
            outcomes: Some(vec!["No".to_string(), "Yes".to_string()]),
            outcome_prices: Some(vec!["0.7".to_string(), "0.3".to_string()]),
            ..Default::default()
        };

        let listing = MarketNormalizer::default().normalize_polymarket(raw).unwrap();
        assert_eq!(listing.yes_price(), dec!(0.3));
        assert_eq!(listing.no_price(), dec!(0.7));
    }

    #[test]
    fn test_polymarket_configured_yes_index() {
        let raw = PolymarketRawMarket {
            id: Some("1".to_string()),
            question: Some("Will the Fed cut rates?".to_string()),
            outcomes: Some(vec!["Up".to_string(), "Down".to_string()]),
            outcome_prices: Some(vec!["0.7".to_string(), "0.3".to_string()]),
            ..Default::default()
        };

        let normalizer =
            MarketNormalizer::new(NormalizerConfig::default().with_polymarket_yes_index(1));
        let listing = normalizer.normalize_polymarket(raw).unwrap();
        assert_eq!(listing.yes_price(), dec!(0.3));
    }

    #[test]
    fn test_polymarket_requires_two_legs() {
        let raw = PolymarketRawMarket {
            id: Some("9".to_string()),
            question: Some("Who wins the election?".to_string()),
            outcome_prices: Some(vec!["0.3".into(), "0.3".into(), "0.4".into()]),
            ..Default::default()
        };

        let err = MarketNormalizer::default().normalize_polymarket(raw).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::InvalidPrice {
                source: InvalidPriceError::LegCount { count: 3 },
                ..
            }
        ));
    }

    #[test]
    fn test_polymarket_malformed_and_missing_prices() {
        let malformed = PolymarketRawMarket {
            id: Some("9".to_string()),
            question: Some("Who wins the election?".to_string()),
            outcome_prices: Some(vec!["abc".into(), "0.4".into()]),
            ..Default::default()
        };
        assert!(matches!(
            MarketNormalizer::default().normalize_polymarket(malformed),
            Err(NormalizeError::MalformedPrice { .. })
        ));

        let missing = PolymarketRawMarket {
            id: Some("9".to_string()),
            question: Some("Who wins the election?".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            MarketNormalizer::default().normalize_polymarket(missing),
            Err(NormalizeError::MissingPrice { .. })
        ));
    }

    #[test]
    fn test_polymarket_bad_encoded_list_fails_decode() {
        let result: Result<PolymarketRawMarket, _> =
            serde_json::from_str(r#"{"question": "x", "outcomePrices": "not json"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalizer_config_validate() {
        assert!(NormalizerConfig::default().validate().is_ok());
        assert!(NormalizerConfig::default()
            .with_polymarket_yes_index(2)
            .validate()
            .is_err());
    }
}
