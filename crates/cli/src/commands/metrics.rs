//! `metrics`: one polling cycle over the option chain.

use anyhow::Result;
use clap::Args;

use super::{print_json, CommonArgs};

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    /// Underlying index or stock (e.g. NIFTY)
    #[arg(short, long)]
    pub underlying: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Computes metrics, activity and alerts, and advances the stored state.
///
/// # Errors
/// Returns an error if the config or the option chain cannot be read.
pub async fn run_metrics(args: MetricsArgs) -> Result<()> {
    let service = args.common.service()?;
    let update = service
        .refresh_metrics(&args.underlying, args.common.expiry.into())
        .await?;

    tracing::info!(
        underlying = %update.metrics.underlying,
        activity = %update.activity.label,
        alerts = update.alerts.len(),
        "Cycle complete"
    );
    print_json(&update)
}
