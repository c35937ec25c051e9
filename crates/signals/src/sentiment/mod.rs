//! Multi-timeframe sentiment.
//!
//! The daily and intraday scores are computed independently and keep their
//! own mood buckets. [`SentimentScorer`] runs both and reports where they
//! disagree.

pub mod daily;
pub mod intraday;

use chrono_tz::Tz;
use oipulse_core::{Bias, Candle, MarketConfig, MarketContext, NEUTRAL_BAND_HIGH};
use serde::{Deserialize, Serialize};

pub use daily::{score_daily, DailySentiment};
pub use intraday::{score_intraday, IntradaySentiment, IntradaySource, MIN_INTRADAY_CANDLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    VeryBullish,
    Bullish,
    SlightlyBullish,
    Neutral,
    SlightlyBearish,
    Bearish,
    VeryBearish,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::VeryBullish => "very bullish",
            Self::Bullish => "bullish",
            Self::SlightlyBullish => "slightly bullish",
            Self::Neutral => "neutral",
            Self::SlightlyBearish => "slightly bearish",
            Self::Bearish => "bearish",
            Self::VeryBearish => "very bearish",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentFactor {
    InstitutionalFlow,
    Technical,
    PcrBand,
    EmaTrend,
    Vwap,
    Rsi,
    Adx,
    Pcr,
}

/// One line of a score breakdown.
///
/// Daily factors carry a sub-score and a weight; intraday factors are plain
/// additive adjustments and have neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScore {
    pub factor: SentimentFactor,
    /// Raw input, `None` when it was unavailable.
    pub value: Option<f64>,
    pub score: Option<f64>,
    pub weight: Option<f64>,
    pub contribution: f64,
}

impl FactorScore {
    #[must_use]
    pub fn weighted(factor: SentimentFactor, value: Option<f64>, score: f64, weight: f64) -> Self {
        Self {
            factor,
            value,
            score: Some(score),
            weight: Some(weight),
            contribution: score * weight,
        }
    }

    #[must_use]
    pub fn adjustment(factor: SentimentFactor, value: Option<f64>, contribution: f64) -> Self {
        Self {
            factor,
            value,
            score: None,
            weight: None,
            contribution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentScore {
    /// Mean of the daily and intraday scores. Display only.
    pub composite_score: f64,
    /// Daily mood.
    pub mood: Mood,
    pub daily_bias: Bias,
    pub intraday_bias: Bias,
    /// Exactly one timeframe sits at or above 55.
    pub divergence: bool,
    pub daily: DailySentiment,
    pub intraday: IntradaySentiment,
}

impl SentimentScore {
    /// Every factor from both timeframes, daily first.
    pub fn breakdown(&self) -> impl Iterator<Item = &FactorScore> {
        self.daily.breakdown.iter().chain(self.intraday.breakdown.iter())
    }
}

#[must_use]
pub fn is_divergent(daily: f64, intraday: f64) -> bool {
    (daily >= NEUTRAL_BAND_HIGH) != (intraday >= NEUTRAL_BAND_HIGH)
}

/// Merges daily and intraday sentiment for one underlying.
#[derive(Debug, Clone, Copy)]
pub struct SentimentScorer {
    tz: Tz,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Kolkata)
    }
}

impl SentimentScorer {
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Uses the configured timezone, falling back to Asia/Kolkata when the
    /// name does not parse.
    #[must_use]
    pub fn from_config(config: &MarketConfig) -> Self {
        match config.timezone.parse::<Tz>() {
            Ok(tz) => Self::new(tz),
            Err(e) => {
                tracing::warn!(
                    timezone = %config.timezone,
                    error = %e,
                    "Unknown timezone, using Asia/Kolkata"
                );
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Scores both timeframes. `candles` are 5-minute bars, oldest first;
    /// only the newest bar's session feeds the intraday score.
    #[must_use]
    pub fn score(&self, context: &MarketContext, pcr: f64, candles: &[Candle]) -> SentimentScore {
        let daily = score_daily(context.fii_net, context.dii_net, context.technical_score, pcr);
        let intraday = score_intraday(candles, pcr, self.tz);

        let divergence = is_divergent(daily.score, intraday.score);
        if divergence {
            tracing::debug!(
                daily = daily.score,
                intraday = intraday.score,
                "Daily and intraday sentiment diverge"
            );
        }

        SentimentScore {
            composite_score: (daily.score + intraday.score) / 2.0,
            mood: daily.mood,
            daily_bias: Bias::from_score(daily.score),
            intraday_bias: Bias::from_score(intraday.score),
            divergence,
            daily,
            intraday,
        }
    }
}
