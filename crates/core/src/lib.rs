pub mod config;
pub mod config_loader;
pub mod market;
pub mod portfolio;
pub mod signal;
pub mod traits;

pub use config::{AppConfig, MarketConfig, RiskConfig};
pub use config_loader::ConfigLoader;
pub use market::{
    Candle, CandleInterval, ExpiryKind, MarketContext, OptionChainSnapshot, OptionLeg, OptionType,
};
pub use portfolio::{
    OpenOrder, OrderRequest, OrderStatus, PortfolioSnapshot, Position, TransactionType,
};
pub use signal::{Bias, NEUTRAL_BAND_HIGH, NEUTRAL_BAND_LOW};
pub use traits::MarketDataSource;
