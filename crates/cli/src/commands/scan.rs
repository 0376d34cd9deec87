//! CLI command for a single fetch → match → score cycle.
//!
//! Reads raw market dumps for both platforms, runs the configured matcher
//! over every same-category pair and prints the ranked opportunities.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use event_arb_cross::{
    ConfigLoader, CycleReport, EngineConfig, JsonFileSource, MarketNormalizer, OpportunityScanner,
    ScanCycle, SummaryAnnotator,
};
use tracing::info;

use super::StrategyArg;

/// Arguments for the scan command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Configuration file (defaults to config/Config.toml).
    #[arg(short, long, conflicts_with = "profile")]
    pub config: Option<PathBuf>,

    /// Profile overlay, loads config/Config.<PROFILE>.toml on top of the base file.
    #[arg(long)]
    pub profile: Option<String>,

    /// Raw Kalshi markets JSON, overrides sources.kalshi_path.
    #[arg(long)]
    pub kalshi: Option<PathBuf>,

    /// Raw Polymarket markets JSON, overrides sources.polymarket_path.
    #[arg(long)]
    pub polymarket: Option<PathBuf>,

    /// Title matching strategy, overrides matching.strategy.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Print the full report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Skip trade summaries.
    #[arg(long)]
    pub no_annotate: bool,
}

impl ScanArgs {
    /// Loads configuration and applies command-line overrides.
    fn resolve_config(&self) -> Result<EngineConfig> {
        let mut config = match (&self.config, &self.profile) {
            (Some(path), _) => ConfigLoader::load_from(path)?,
            (None, Some(profile)) => ConfigLoader::load_with_profile(profile)?,
            (None, None) => ConfigLoader::load()?,
        };

        if let Some(path) = &self.kalshi {
            config.sources.kalshi_path = path.clone();
        }
        if let Some(path) = &self.polymarket {
            config.sources.polymarket_path = path.clone();
        }
        if let Some(strategy) = self.strategy {
            config.matching.strategy = strategy.into();
        }
        if self.no_annotate {
            config.annotation.enabled = false;
        }

        Ok(config)
    }
}

/// Runs one scan cycle and prints the result.
pub async fn run(args: ScanArgs) -> Result<()> {
    let config = args.resolve_config()?;

    info!(
        kalshi = %config.sources.kalshi_path.display(),
        polymarket = %config.sources.polymarket_path.display(),
        strategy = %config.matching.strategy,
        "Starting scan"
    );

    let normalizer = MarketNormalizer::new(config.normalizer.clone());
    let scanner = OpportunityScanner::from_config_with_classifier(
        &config.matching,
        config.evaluator.clone(),
        normalizer.classifier().clone(),
    );

    let mut cycle = ScanCycle::new(
        Box::new(JsonFileSource::kalshi(
            &config.sources.kalshi_path,
            normalizer.clone(),
        )),
        Box::new(JsonFileSource::polymarket(
            &config.sources.polymarket_path,
            normalizer,
        )),
        scanner,
    );
    if config.annotation.enabled {
        cycle = cycle.with_annotator(Box::new(SummaryAnnotator), config.annotation.timeout());
    }

    let report = cycle.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    Ok(())
}

/// Formats a report as a plain-text table.
fn render_report(report: &CycleReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str(&format!(
        "Listings: {} Kalshi, {} Polymarket | pairs compared: {} | matches: {} | opportunities: {}\n",
        stats.listings_a,
        stats.listings_b,
        stats.pairs_compared,
        stats.matches,
        report.opportunities.len()
    ));
    for failure in &report.source_failures {
        out.push_str(&format!(
            "WARNING: {} source failed: {}\n",
            failure.platform, failure.reason
        ));
    }

    if report.opportunities.is_empty() {
        out.push_str("No arbitrage opportunities found.\n");
        return out;
    }

    for (rank, opportunity) in report.opportunities.iter().enumerate() {
        let result = &opportunity.result;
        out.push_str(&format!(
            "\n#{} {}% margin ({}) confidence {:.2}\n",
            rank + 1,
            result.margin_pct().round_dp(2).normalize(),
            result.strategy,
            result.confidence
        ));
        out.push_str(&format!(
            "   A [{}] {} (YES {} / NO {})\n",
            result.listing_a.platform,
            result.listing_a.title,
            result.listing_a.yes_price(),
            result.listing_a.no_price()
        ));
        out.push_str(&format!(
            "   B [{}] {} (YES {} / NO {})\n",
            result.listing_b.platform,
            result.listing_b.title,
            result.listing_b.yes_price(),
            result.listing_b.no_price()
        ));
        if let Some(commentary) = &opportunity.commentary {
            out.push_str(&format!("   {commentary}\n"));
        }
    }

    out
}
