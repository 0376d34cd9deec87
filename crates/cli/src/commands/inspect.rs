//! One-shot commands for checking a single title pair or price set.

use anyhow::{bail, Result};
use clap::Args;
use event_arb_cross::{
    build_matcher, classify, ArbitrageEvaluator, BinaryQuote, EvaluatorConfig, MatchConfig,
    MatchResult, Spread,
};
use rust_decimal::Decimal;

use super::StrategyArg;

// =============================================================================
// Match
// =============================================================================

/// Arguments for the match command.
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// First market title (Kalshi side).
    pub title_a: String,

    /// Second market title (Polymarket side).
    pub title_b: String,

    /// Matching strategy.
    #[arg(long, value_enum, default_value = "keyword-similarity")]
    pub strategy: StrategyArg,

    /// Override the confidence threshold (keyword strategy).
    #[arg(long)]
    pub confidence_threshold: Option<f64>,

    /// Override the similarity threshold (numeric strategy).
    #[arg(long)]
    pub similarity_threshold: Option<f64>,
}

impl MatchArgs {
    fn match_config(&self) -> Result<MatchConfig> {
        let mut config = MatchConfig::default().with_strategy(self.strategy.into());
        if let Some(threshold) = self.confidence_threshold {
            config = config.with_confidence_threshold(threshold);
        }
        if let Some(threshold) = self.similarity_threshold {
            config = config.with_similarity_threshold(threshold);
        }
        if let Err(reason) = config.validate() {
            bail!("invalid matching options: {reason}");
        }
        Ok(config)
    }
}

/// Runs the matcher on two titles and prints the verdict.
pub fn run_match(args: &MatchArgs) -> Result<()> {
    let matcher = build_matcher(&args.match_config()?);
    let result = matcher.match_titles(&args.title_a, &args.title_b)?;

    println!("Strategy:   {}", matcher.name());
    println!(
        "Categories: {} / {}",
        classify(&args.title_a),
        classify(&args.title_b)
    );
    print!("{}", render_match(&result));

    Ok(())
}

fn render_match(result: &MatchResult) -> String {
    let verdict = if result.is_match { "MATCH" } else { "NO MATCH" };
    let keywords = if result.common_keywords.is_empty() {
        "-".to_string()
    } else {
        result
            .common_keywords
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Verdict:    {verdict}\nConfidence: {:.4}\nKeywords:   {keywords}\n",
        result.confidence
    )
}

// =============================================================================
// Evaluate
// =============================================================================

/// Arguments for the evaluate command.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// YES price on platform A, in [0, 1].
    pub yes_a: Decimal,

    /// NO price on platform A, in [0, 1].
    pub no_a: Decimal,

    /// YES price on platform B, in [0, 1].
    pub yes_b: Decimal,

    /// NO price on platform B, in [0, 1].
    pub no_b: Decimal,

    /// Exclusive lower margin bound.
    #[arg(long)]
    pub min_margin: Option<Decimal>,

    /// Exclusive upper margin bound.
    #[arg(long)]
    pub max_margin: Option<Decimal>,
}

impl EvaluateArgs {
    fn evaluator_config(&self) -> Result<EvaluatorConfig> {
        let mut config = EvaluatorConfig::default();
        if let Some(margin) = self.min_margin {
            config = config.with_min_margin(margin);
        }
        if let Some(margin) = self.max_margin {
            config = config.with_max_margin(margin);
        }
        if let Err(reason) = config.validate() {
            bail!("invalid margin band: {reason}");
        }
        Ok(config)
    }
}

/// Scores four leg prices and prints the spread, if any.
pub fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    let evaluator = ArbitrageEvaluator::with_config(args.evaluator_config()?);
    let spread = evaluator.evaluate(args.yes_a, args.no_a, args.yes_b, args.no_b)?;

    match spread {
        Some(spread) => print!("{}", render_spread(&spread)),
        None => println!(
            "No opportunity: best margin {} is outside ({}, {})",
            best_margin(args)?,
            evaluator.config().min_margin,
            evaluator.config().max_margin
        ),
    }

    Ok(())
}

fn best_margin(args: &EvaluateArgs) -> Result<Decimal> {
    let a = BinaryQuote::new(args.yes_a, args.no_a)?;
    let b = BinaryQuote::new(args.yes_b, args.no_b)?;
    Ok(ArbitrageEvaluator::best_margin(&a, &b))
}

fn render_spread(spread: &Spread) -> String {
    let (side_a, side_b) = spread.strategy.sides();
    format!(
        "Strategy:   {} (buy {side_a} on A, {side_b} on B)\n\
         Cost:       {}\n\
         Margin:     {} ({}%)\n\
         YES delta:  {} pts\n\
         NO delta:   {} pts\n",
        spread.strategy,
        spread.combined_cost(),
        spread.margin,
        spread.margin_pct().round_dp(2).normalize(),
        spread.price_delta_yes_pct.normalize(),
        spread.price_delta_no_pct.normalize(),
    )
}
