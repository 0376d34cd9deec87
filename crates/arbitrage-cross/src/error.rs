//! Error types for market matching and arbitrage scoring.
//!
//! A pricing or matching error skips one pair. Source failures empty one
//! side of a cycle.

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::Platform;

/// Malformed or out-of-range price input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPriceError {
    /// The price was NaN or infinite.
    #[error("{leg} price is not a finite number")]
    NotFinite {
        /// Which leg carried the bad value.
        leg: &'static str,
    },

    /// The price was outside `[0, 1]`.
    #[error("{leg} price {value} is outside [0, 1]")]
    OutOfRange {
        /// Which leg carried the bad value.
        leg: &'static str,
        /// The offending value.
        value: Decimal,
    },

    /// A binary market must quote exactly two legs.
    #[error("expected exactly two legs, got {count}")]
    LegCount {
        /// Number of legs supplied.
        count: usize,
    },
}

/// Malformed title input to a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    /// Title could not be interpreted as a market question.
    #[error("invalid title: {reason}")]
    InvalidTitle {
        /// Why the title was rejected.
        reason: String,
    },
}

impl MatchingError {
    /// Creates an invalid title error.
    pub fn invalid_title(reason: impl Into<String>) -> Self {
        Self::InvalidTitle {
            reason: reason.into(),
        }
    }
}

/// A raw provider listing that cannot be turned into a [`crate::MarketListing`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// No usable title or question text.
    #[error("listing {source_id} has no title")]
    MissingTitle {
        /// Provider identifier of the listing.
        source_id: String,
    },

    /// No resolvable Yes/No price.
    #[error("listing {source_id} has no resolvable yes/no price")]
    MissingPrice {
        /// Provider identifier of the listing.
        source_id: String,
    },

    /// A price field could not be parsed as a decimal.
    #[error("listing {source_id} has unparseable price {value:?}")]
    MalformedPrice {
        /// Provider identifier of the listing.
        source_id: String,
        /// The raw text that failed to parse.
        value: String,
    },

    /// Prices parsed but failed validation.
    #[error("listing {source_id}: {source}")]
    InvalidPrice {
        /// Provider identifier of the listing.
        source_id: String,
        /// Underlying price error.
        #[source]
        source: InvalidPriceError,
    },

    /// Negative traded volume.
    #[error("listing {source_id} has negative volume {volume}")]
    NegativeVolume {
        /// Provider identifier of the listing.
        source_id: String,
        /// The reported volume.
        volume: Decimal,
    },
}

/// Failure to obtain listings from a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The payload could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The payload was not valid JSON of the expected shape.
    #[error("failed to decode {}: {reason}", .path.display())]
    Decode {
        /// Path that was being decoded.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The source is unavailable for some other reason.
    #[error("{platform} source unavailable: {reason}")]
    Unavailable {
        /// Platform the source serves.
        platform: Platform,
        /// What went wrong.
        reason: String,
    },
}

/// Failure of a whole scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Neither side supplied a single listing.
    #[error("no listings on either side to scan")]
    NoListings,
}

/// Failure of a whole fetch + scan cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Both sources failed to produce listings.
    #[error("all listing sources failed: {first}; {second}")]
    AllSourcesFailed {
        /// Error from the first source.
        first: SourceError,
        /// Error from the second source.
        second: SourceError,
    },

    /// The scan itself failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Failure of a best-effort annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// The annotator reported an error.
    #[error("annotation failed: {0}")]
    Failed(String),

    /// The annotator did not answer in time.
    #[error("annotation timed out after {0:?}")]
    Timeout(Duration),
}

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment could not extract the configuration.
    #[error("configuration error: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// Values were loaded but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
