//! Intraday sentiment from 5-minute candles and live PCR.
//!
//! Starts from a neutral 50 and adds fixed adjustments per factor. When the
//! session is too young for the indicators, only PCR is used and the result
//! is tagged [`IntradaySource::PcrOnly`].

use chrono_tz::Tz;
use oipulse_core::Candle;
use serde::{Deserialize, Serialize};

use super::{FactorScore, Mood, SentimentFactor};
use crate::indicators::{self, DEFAULT_PERIOD};

/// Five-minute candles needed before indicators are trusted.
pub const MIN_INTRADAY_CANDLES: usize = 30;

const BASE: f64 = 50.0;
const FAST_EMA: usize = 9;
const SLOW_EMA: usize = 21;
const VWAP_BAND_PCT: f64 = 0.3;
const ADX_TRENDING: f64 = 25.0;

/// Which inputs produced an intraday score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntradaySource {
    Live,
    PcrOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradaySentiment {
    pub score: f64,
    pub mood: Mood,
    pub source: IntradaySource,
    pub breakdown: Vec<FactorScore>,
}

/// Intraday mood buckets. Narrower than the daily buckets.
#[must_use]
pub fn intraday_mood(score: f64) -> Mood {
    if score >= 65.0 {
        Mood::Bullish
    } else if score >= 55.0 {
        Mood::SlightlyBullish
    } else if score <= 35.0 {
        Mood::Bearish
    } else if score <= 45.0 {
        Mood::SlightlyBearish
    } else {
        Mood::Neutral
    }
}

/// +15 when price > EMA9 > EMA21, -15 when price < EMA9 < EMA21.
#[must_use]
pub fn ema_trend_adjustment(price: f64, fast: f64, slow: f64) -> f64 {
    if fast > slow && price > fast {
        15.0
    } else if fast < slow && price < fast {
        -15.0
    } else {
        0.0
    }
}

/// Distance from VWAP in percent of VWAP.
#[must_use]
pub fn vwap_distance_pct(price: f64, vwap: f64) -> f64 {
    if vwap == 0.0 {
        return 0.0;
    }
    (price - vwap) / vwap * 100.0
}

#[must_use]
pub fn vwap_adjustment(distance_pct: f64) -> f64 {
    if distance_pct > VWAP_BAND_PCT {
        13.0
    } else if distance_pct < -VWAP_BAND_PCT {
        -13.0
    } else {
        0.0
    }
}

#[must_use]
pub fn rsi_adjustment(rsi: f64) -> f64 {
    if rsi > 65.0 {
        10.0
    } else if rsi >= 55.0 {
        5.0
    } else if rsi < 35.0 {
        -10.0
    } else if rsi <= 45.0 {
        -5.0
    } else {
        0.0
    }
}

/// Only a trending market (ADX above 25) contributes; the sign follows DI.
#[must_use]
pub fn adx_adjustment(reading: &indicators::Adx) -> f64 {
    if reading.adx <= ADX_TRENDING {
        0.0
    } else if reading.plus_di > reading.minus_di {
        7.0
    } else {
        -7.0
    }
}

#[must_use]
pub fn live_pcr_adjustment(pcr: f64) -> f64 {
    if pcr > 1.2 {
        13.0
    } else if pcr > 1.0 {
        5.0
    } else if pcr < 0.75 {
        -13.0
    } else if pcr < 0.9 {
        -5.0
    } else {
        0.0
    }
}

#[must_use]
pub fn pcr_only_adjustment(pcr: f64) -> f64 {
    if pcr > 1.2 {
        15.0
    } else if pcr < 0.75 {
        -15.0
    } else {
        0.0
    }
}

fn finish(breakdown: Vec<FactorScore>, source: IntradaySource) -> IntradaySentiment {
    let score = (BASE + breakdown.iter().map(|f| f.contribution).sum::<f64>()).clamp(0.0, 100.0);
    IntradaySentiment {
        score,
        mood: intraday_mood(score),
        source,
        breakdown,
    }
}

/// Scores the current session. `candles` are 5-minute bars, oldest first.
///
/// Only bars on the `tz` calendar day of the newest bar count; earlier
/// sessions are dropped before the candle gate and every indicator.
#[must_use]
pub fn score_intraday(candles: &[Candle], pcr: f64, tz: Tz) -> IntradaySentiment {
    let candles = indicators::current_session(candles, tz);
    let Some(price) = candles
        .last()
        .map(|c| c.close)
        .filter(|_| candles.len() >= MIN_INTRADAY_CANDLES)
    else {
        tracing::debug!(
            candles = candles.len(),
            required = MIN_INTRADAY_CANDLES,
            "Not enough intraday candles, scoring from PCR only"
        );
        let breakdown = vec![FactorScore::adjustment(
            SentimentFactor::Pcr,
            Some(pcr),
            pcr_only_adjustment(pcr),
        )];
        return finish(breakdown, IntradaySource::PcrOnly);
    };

    let fast = indicators::ema(candles, FAST_EMA);
    let slow = indicators::ema(candles, SLOW_EMA);
    let ema_trend = match (fast, slow) {
        (Some(fast), Some(slow)) => ema_trend_adjustment(price, fast, slow),
        _ => 0.0,
    };

    let vwap_distance = indicators::vwap(candles, tz).map(|v| vwap_distance_pct(price, v));
    let rsi = indicators::rsi(candles, DEFAULT_PERIOD);
    let adx = indicators::adx(candles, DEFAULT_PERIOD);

    let breakdown = vec![
        FactorScore::adjustment(
            SentimentFactor::EmaTrend,
            fast.zip(slow).map(|(f, s)| f - s),
            ema_trend,
        ),
        FactorScore::adjustment(
            SentimentFactor::Vwap,
            vwap_distance,
            vwap_distance.map_or(0.0, vwap_adjustment),
        ),
        FactorScore::adjustment(SentimentFactor::Rsi, rsi, rsi.map_or(0.0, rsi_adjustment)),
        FactorScore::adjustment(
            SentimentFactor::Adx,
            adx.map(|a| a.adx),
            adx.as_ref().map_or(0.0, adx_adjustment),
        ),
        FactorScore::adjustment(SentimentFactor::Pcr, Some(pcr), live_pcr_adjustment(pcr)),
    ];

    finish(breakdown, IntradaySource::Live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn session(closes: impl IntoIterator<Item = f64>) -> Vec<Candle> {
        // 09:15 IST
        let open = Utc.with_ymd_and_hms(2024, 10, 14, 3, 45, 0).unwrap();
        closes
            .into_iter()
            .enumerate()
            .map(|(i, close)| Candle {
                time: open + Duration::minutes(5 * i as i64),
                open: close,
                high: close + 2.0,
                low: close - 2.0,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    fn ist() -> Tz {
        chrono_tz::Asia::Kolkata
    }

    #[test]
    fn short_session_falls_back_to_pcr() {
        let candles = session((0..29_i32).map(|i| 25_000.0 + f64::from(i)));

        let bullish = score_intraday(&candles, 1.3, ist());
        assert_eq!(bullish.source, IntradaySource::PcrOnly);
        assert!((bullish.score - 65.0).abs() < f64::EPSILON);

        let bearish = score_intraday(&candles, 0.7, ist());
        assert!((bearish.score - 35.0).abs() < f64::EPSILON);
        assert_eq!(bearish.mood, Mood::Bearish);

        let neutral = score_intraday(&[], 1.0, ist());
        assert!((neutral.score - 50.0).abs() < f64::EPSILON);
        assert_eq!(neutral.breakdown.len(), 1);
    }

    #[test]
    fn previous_session_bars_do_not_count() {
        // 30 rising bars on Friday 2024-10-11 from 09:15 IST
        let friday = Utc.with_ymd_and_hms(2024, 10, 11, 3, 45, 0).unwrap();
        let mut candles: Vec<Candle> = (0..30_i32)
            .map(|i| {
                let close = 25_000.0 + 10.0 * f64::from(i);
                Candle {
                    time: friday + Duration::minutes(5 * i64::from(i)),
                    open: close,
                    high: close + 2.0,
                    low: close - 2.0,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect();
        candles.extend(session((0..5_i32).map(|i| 25_300.0 + 10.0 * f64::from(i))));

        let result = score_intraday(&candles, 1.0, ist());

        assert_eq!(result.source, IntradaySource::PcrOnly);
        assert!((result.score - 50.0).abs() < f64::EPSILON);
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn steady_rally_scores_bullish() {
        let candles = session((0..40_i32).map(|i| 25_000.0 + 10.0 * f64::from(i)));
        let result = score_intraday(&candles, 1.25, ist());

        assert_eq!(result.source, IntradaySource::Live);
        // 50 + 15 (ema) + 13 (vwap) + 10 (rsi 100) + 7 (adx) + 13 (pcr) -> clamped
        assert!((result.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(result.mood, Mood::Bullish);
        assert_eq!(result.breakdown.len(), 5);
    }

    #[test]
    fn steady_selloff_scores_bearish() {
        let candles = session((0..40_i32).map(|i| 25_000.0 - 10.0 * f64::from(i)));
        let result = score_intraday(&candles, 0.7, ist());

        assert_eq!(result.source, IntradaySource::Live);
        assert!(result.score.abs() < f64::EPSILON);
        assert_eq!(result.mood, Mood::Bearish);
    }

    #[test]
    fn flat_session_is_neutral() {
        let candles = session(std::iter::repeat(25_000.0).take(35));
        let result = score_intraday(&candles, 0.95, ist());

        // RSI is 100 with no losses: +10, everything else flat.
        assert!((result.score - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn adjustment_bands() {
        assert!((rsi_adjustment(66.0) - 10.0).abs() < f64::EPSILON);
        assert!((rsi_adjustment(65.0) - 5.0).abs() < f64::EPSILON);
        assert!((rsi_adjustment(55.0) - 5.0).abs() < f64::EPSILON);
        assert!(rsi_adjustment(50.0).abs() < f64::EPSILON);
        assert!((rsi_adjustment(45.0) + 5.0).abs() < f64::EPSILON);
        assert!((rsi_adjustment(35.0) + 5.0).abs() < f64::EPSILON);
        assert!((rsi_adjustment(34.9) + 10.0).abs() < f64::EPSILON);

        assert!((live_pcr_adjustment(1.21) - 13.0).abs() < f64::EPSILON);
        assert!((live_pcr_adjustment(1.1) - 5.0).abs() < f64::EPSILON);
        assert!(live_pcr_adjustment(0.95).abs() < f64::EPSILON);
        assert!((live_pcr_adjustment(0.8) + 5.0).abs() < f64::EPSILON);
        assert!((live_pcr_adjustment(0.7) + 13.0).abs() < f64::EPSILON);

        assert!(vwap_adjustment(0.3).abs() < f64::EPSILON);
        assert!((vwap_adjustment(0.31) - 13.0).abs() < f64::EPSILON);
        assert!((vwap_adjustment(-0.31) + 13.0).abs() < f64::EPSILON);

        assert!(ema_trend_adjustment(101.0, 100.0, 99.0) > 0.0);
        assert!(ema_trend_adjustment(99.5, 100.0, 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mood_buckets() {
        assert_eq!(intraday_mood(65.0), Mood::Bullish);
        assert_eq!(intraday_mood(60.0), Mood::SlightlyBullish);
        assert_eq!(intraday_mood(50.0), Mood::Neutral);
        assert_eq!(intraday_mood(45.0), Mood::SlightlyBearish);
        assert_eq!(intraday_mood(35.0), Mood::Bearish);
    }
}
