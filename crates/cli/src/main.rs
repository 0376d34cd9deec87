use clap::{Parser, Subcommand};

mod commands;

use commands::{EvaluateArgs, MatchArgs, ScanArgs};

#[derive(Parser)]
#[command(name = "event-arb")]
#[command(
    about = "Cross-platform prediction market matching and arbitrage scanning for Kalshi and Polymarket",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load both platforms' markets, match them and rank arbitrage spreads
    Scan(ScanArgs),
    /// Compare two market titles with a matching strategy
    Match(MatchArgs),
    /// Score four leg prices for complementary-leg arbitrage
    Evaluate(EvaluateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(args) => commands::scan::run(args).await?,
        Commands::Match(args) => commands::inspect::run_match(&args)?,
        Commands::Evaluate(args) => commands::inspect::run_evaluate(&args)?,
    }

    Ok(())
}
