//! CLI commands for the cross-platform arbitrage scanner.

pub mod inspect;
pub mod scan;

use clap::ValueEnum;
use event_arb_cross::MatcherKind;

pub use inspect::{EvaluateArgs, MatchArgs};
pub use scan::ScanArgs;

/// Title matching strategy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Keyword overlap plus bigram similarity
    KeywordSimilarity,
    /// Bigram similarity gated on identical amounts, months and years
    NumericStrict,
}

impl From<StrategyArg> for MatcherKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::KeywordSimilarity => MatcherKind::KeywordSimilarity,
            StrategyArg::NumericStrict => MatcherKind::NumericStrict,
        }
    }
}
