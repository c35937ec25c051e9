//! `sentiment`: daily and intraday scores for an underlying.

use anyhow::Result;
use clap::Args;

use super::{print_json, CommonArgs};

#[derive(Args, Debug, Clone)]
pub struct SentimentArgs {
    /// Underlying index or stock (e.g. NIFTY)
    #[arg(short, long)]
    pub underlying: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// # Errors
/// Returns an error if the config or the option chain cannot be read.
pub async fn run_sentiment(args: SentimentArgs) -> Result<()> {
    let service = args.common.service()?;
    let score = service
        .score_sentiment(&args.underlying, args.common.expiry.into())
        .await?;

    if score.divergence {
        tracing::warn!(
            daily = score.daily.score,
            intraday = score.intraday.score,
            "Daily and intraday sentiment disagree"
        );
    }
    print_json(&score)
}
