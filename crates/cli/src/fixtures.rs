//! Market data read from a directory of JSON files.
//!
//! Layout:
//!
//! ```text
//! <dir>/chain_weekly.json    OptionChainSnapshot
//! <dir>/chain_monthly.json   OptionChainSnapshot
//! <dir>/candles_5m.json      [Candle]
//! <dir>/candles_1d.json      [Candle]
//! <dir>/portfolio.json       PortfolioSnapshot
//! <dir>/context.json         MarketContext
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use oipulse_core::{
    Candle, CandleInterval, ExpiryKind, MarketContext, MarketDataSource, OptionChainSnapshot,
    PortfolioSnapshot,
};
use serde::de::DeserializeOwned;

pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

fn chain_file(expiry: ExpiryKind) -> &'static str {
    match expiry {
        ExpiryKind::Weekly => "chain_weekly.json",
        ExpiryKind::Monthly => "chain_monthly.json",
    }
}

fn candles_file(interval: CandleInterval) -> &'static str {
    match interval {
        CandleInterval::FiveMinute => "candles_5m.json",
        CandleInterval::Day => "candles_1d.json",
    }
}

#[async_trait]
impl MarketDataSource for FixtureSource {
    async fn option_chain(
        &self,
        underlying: &str,
        expiry: ExpiryKind,
    ) -> Result<OptionChainSnapshot> {
        let chain: OptionChainSnapshot = self.read(chain_file(expiry)).await?;
        if !chain.underlying.eq_ignore_ascii_case(underlying) {
            bail!(
                "{} holds a {} chain, not {underlying}",
                chain_file(expiry),
                chain.underlying
            );
        }
        Ok(chain)
    }

    async fn candles(&self, _underlying: &str, interval: CandleInterval) -> Result<Vec<Candle>> {
        let mut candles: Vec<Candle> = self.read(candles_file(interval)).await?;
        candles.sort_by_key(|c| c.time);
        Ok(candles)
    }

    async fn portfolio(&self) -> Result<PortfolioSnapshot> {
        self.read("portfolio.json").await
    }

    async fn market_context(&self) -> Result<MarketContext> {
        self.read("context.json").await
    }
}
