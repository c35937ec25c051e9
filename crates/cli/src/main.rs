use clap::{Parser, Subcommand};

mod commands;
mod fixtures;

use commands::{EvaluateArgs, MetricsArgs, SentimentArgs};

#[derive(Parser)]
#[command(name = "oipulse")]
#[command(about = "Option-chain metrics, sentiment and pre-trade risk checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute option-chain metrics, OI activity and alerts for one cycle
    Metrics(MetricsArgs),
    /// Score daily and intraday sentiment
    Sentiment(SentimentArgs),
    /// Run pre-trade risk checks on an order
    Evaluate(EvaluateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Metrics(args) => commands::run_metrics(args).await?,
        Commands::Sentiment(args) => commands::run_sentiment(args).await?,
        Commands::Evaluate(args) => commands::run_evaluate(args).await?,
    }

    Ok(())
}
