//! Listing sources feeding a scan cycle.
//!
//! The engine holds no HTTP clients; a source is anything that can produce
//! one platform's listings for the current cycle. File-backed sources read
//! JSON dumps of the providers' market endpoints.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{NormalizeError, SourceError};
use crate::normalizer::{KalshiRawMarket, MarketNormalizer, PolymarketRawMarket};
use crate::types::{MarketListing, Platform};

/// Produces the listings of one platform.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Platform served by this source.
    fn platform(&self) -> Platform;

    /// Fetches the current listings.
    async fn fetch(&self) -> Result<Vec<MarketListing>, SourceError>;
}

// =============================================================================
// JSON File Source
// =============================================================================

/// Reads raw provider markets from a JSON file.
///
/// The file holds either an array of markets or an object with a `markets`
/// array, as returned by both providers' list endpoints. Entries that fail
/// to decode or normalize are skipped.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    platform: Platform,
    path: PathBuf,
    normalizer: MarketNormalizer,
}

impl JsonFileSource {
    /// Creates a source reading raw Kalshi markets.
    pub fn kalshi(path: impl Into<PathBuf>, normalizer: MarketNormalizer) -> Self {
        Self {
            platform: Platform::Kalshi,
            path: path.into(),
            normalizer,
        }
    }

    /// Creates a source reading raw Polymarket markets.
    pub fn polymarket(path: impl Into<PathBuf>, normalizer: MarketNormalizer) -> Self {
        Self {
            platform: Platform::Polymarket,
            path: path.into(),
            normalizer,
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn normalize(&self, entry: Value) -> Result<MarketListing, String> {
        match self.platform {
            Platform::Kalshi => decode::<KalshiRawMarket>(entry).and_then(|raw| {
                self.normalizer
                    .normalize_kalshi(raw)
                    .map_err(|e: NormalizeError| e.to_string())
            }),
            Platform::Polymarket => decode::<PolymarketRawMarket>(entry).and_then(|raw| {
                self.normalizer
                    .normalize_polymarket(raw)
                    .map_err(|e: NormalizeError| e.to_string())
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(entry: Value) -> Result<T, String> {
    serde_json::from_value(entry).map_err(|e| format!("undecodable market: {e}"))
}

/// Pulls the market array out of a list endpoint payload.
fn market_entries(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Array(entries) => Some(entries),
        Value::Object(mut object) => match object.remove("markets") {
            Some(Value::Array(entries)) => Some(entries),
            _ => None,
        },
        _ => None,
    }
}

#[async_trait]
impl ListingSource for JsonFileSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> Result<Vec<MarketListing>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let payload: Value = serde_json::from_str(&text).map_err(|e| SourceError::Decode {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let entries = market_entries(payload).ok_or_else(|| SourceError::Decode {
            path: self.path.clone(),
            reason: "expected an array of markets or an object with a `markets` array"
                .to_string(),
        })?;

        let total = entries.len();
        let mut listings = Vec::with_capacity(total);
        for (index, entry) in entries.into_iter().enumerate() {
            match self.normalize(entry) {
                Ok(listing) => listings.push(listing),
                Err(reason) => {
                    debug!(platform = %self.platform, index, reason = %reason, "Skipping market");
                }
            }
        }

        info!(
            platform = %self.platform,
            path = %self.path.display(),
            loaded = listings.len(),
            skipped = total - listings.len(),
            "Loaded listings"
        );

        Ok(listings)
    }
}

// =============================================================================
// Static Source
// =============================================================================

/// Serves a fixed set of already-normalized listings.
#[derive(Debug, Clone)]
pub struct StaticSource {
    platform: Platform,
    listings: Vec<MarketListing>,
}

impl StaticSource {
    /// Creates a source that always returns `listings`.
    #[must_use]
    pub fn new(platform: Platform, listings: Vec<MarketListing>) -> Self {
        Self { platform, listings }
    }
}

#[async_trait]
impl ListingSource for StaticSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> Result<Vec<MarketListing>, SourceError> {
        Ok(self.listings.clone())
    }
}
