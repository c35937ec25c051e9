pub mod activity;
pub mod commentary;
pub mod indicators;
pub mod option_metrics;
pub mod persistence;
pub mod sentiment;
pub mod state;

pub use activity::{
    classify, ActionTier, ActivityClassification, ActivityDeltas, ActivityDriver, ActivityLabel,
    Delta,
};
pub use commentary::{diff, AlertEntry, AlertHistory, AlertSeverity, ALERT_CAPACITY};
pub use indicators::{adx, current_session, ema, rsi, vwap, Adx, DEFAULT_PERIOD};
pub use option_metrics::{
    atm_strike, compute_metrics, max_pain, pain_at, pcr, strike_window, OiLevel, OptionMetrics,
};
pub use persistence::{FileStateStore, StateStoreError};
pub use sentiment::{
    is_divergent, DailySentiment, FactorScore, IntradaySentiment, IntradaySource, Mood,
    SentimentFactor, SentimentScore, SentimentScorer,
};
pub use state::{advance, InMemoryStateStore, PreviousState, PulseUpdate, StateKey, StateStore};
