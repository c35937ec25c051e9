//! Technical indicators over a candle series.
//!
//! Pure functions, no I/O. Candles are expected in ascending time order and
//! every indicator returns `None` rather than guessing when the series is
//! too short.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use oipulse_core::Candle;
use serde::{Deserialize, Serialize};

/// Default lookback for RSI and ADX.
pub const DEFAULT_PERIOD: usize = 14;

const ADX_EPSILON: f64 = 1e-10;

/// Exponential moving average of closes.
///
/// Seeded with the simple average of the first `period` closes, then
/// `ema = close * k + prev * (1 - k)` with `k = 2 / (period + 1)`.
#[must_use]
pub fn ema(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = candles[..period].iter().map(|c| c.close).sum::<f64>() / period as f64;

    Some(
        candles[period..]
            .iter()
            .fold(seed, |prev, c| c.close * k + prev * (1.0 - k)),
    )
}

/// Relative strength index over the trailing `period + 1` candles only.
///
/// Gains and losses are simple averages over that window, no Wilder
/// smoothing across the full history. Returns 100 when there are no losses.
#[must_use]
pub fn rsi(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let window = &candles[candles.len() - (period + 1)..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1].close - pair[0].close)
        .fold((0.0, 0.0), |(g, l), change| {
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Start of the calendar day containing `at`, in `tz`, as UTC.
fn session_start(at: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let local_midnight = at.with_timezone(&tz).date_naive().and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&local_midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Trailing candles on the `tz` calendar day of the newest candle.
#[must_use]
pub fn current_session(candles: &[Candle], tz: Tz) -> &[Candle] {
    let Some(start) = candles.last().and_then(|c| session_start(c.time, tz)) else {
        return &[];
    };
    let first = candles.partition_point(|c| c.time < start);
    &candles[first..]
}

/// Volume-weighted average price for the current session.
///
/// The session is the `tz` calendar day of the newest candle; earlier
/// candles are ignored. Returns `None` when the session has no volume.
#[must_use]
pub fn vwap(candles: &[Candle], tz: Tz) -> Option<f64> {
    let (pv, volume) = current_session(candles, tz)
        .iter()
        .fold((0.0, 0.0), |(pv, vol), c| {
            (pv + c.typical_price() * c.volume, vol + c.volume)
        });

    if volume <= 0.0 {
        return None;
    }
    Some(pv / volume)
}

/// Directional strength reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adx {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Single-pass ADX over the trailing `2 * period` candles.
///
/// Directional movement and true range are summed across the window, then
/// `adx = |+DI - -DI| / (+DI + -DI + eps) * 100`. This is a one-shot
/// directional index, not Wilder's smoothed ADX, and callers tune their
/// thresholds to it.
#[must_use]
pub fn adx(candles: &[Candle], period: usize) -> Option<Adx> {
    let span = period.checked_mul(2)?;
    if period == 0 || candles.len() < span {
        return None;
    }

    let window = &candles[candles.len() - span..];
    let mut plus_dm = 0.0;
    let mut minus_dm = 0.0;
    let mut true_range = 0.0;

    for pair in window.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        if up_move > down_move && up_move > 0.0 {
            plus_dm += up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm += down_move;
        }

        true_range += cur
            .range()
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());
    }

    let (plus_di, minus_di) = if true_range > 0.0 {
        (plus_dm / true_range * 100.0, minus_dm / true_range * 100.0)
    } else {
        (0.0, 0.0)
    };

    let adx = (plus_di - minus_di).abs() / (plus_di + minus_di + ADX_EPSILON) * 100.0;

    Some(Adx {
        adx,
        plus_di,
        minus_di,
    })
}
