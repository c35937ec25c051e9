use crate::market::{Candle, CandleInterval, ExpiryKind, MarketContext, OptionChainSnapshot};
use crate::portfolio::PortfolioSnapshot;
use anyhow::Result;
use async_trait::async_trait;

/// Data-access collaborator. Implementations wrap the broker API, a cache,
/// or fixture files; the engine itself never performs I/O.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn option_chain(
        &self,
        underlying: &str,
        expiry: ExpiryKind,
    ) -> Result<OptionChainSnapshot>;

    /// Candles in ascending time order.
    async fn candles(&self, underlying: &str, interval: CandleInterval) -> Result<Vec<Candle>>;

    async fn portfolio(&self) -> Result<PortfolioSnapshot>;

    async fn market_context(&self) -> Result<MarketContext>;
}
