//! `evaluate`: pre-trade risk checks for one order.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use oipulse_core::OrderRequest;

use super::{print_json, CommonArgs};

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// JSON file with the order (tradingsymbol, underlying, transactionType, quantity)
    #[arg(short, long)]
    pub order: PathBuf,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// # Errors
/// Returns an error if the config or the order file cannot be read. Market
/// data failures only skip the checks that need the data.
pub async fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.order)
        .await
        .with_context(|| format!("reading order {}", args.order.display()))?;
    let order: OrderRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing order {}", args.order.display()))?;

    let service = args.common.service()?;
    let expiry = args.common.expiry.into();
    let verdict = match args.as_of {
        Some(date) => service.evaluate_order_at(&order, expiry, date).await,
        None => service.evaluate_order(&order, expiry).await,
    };

    print_json(&verdict)
}
