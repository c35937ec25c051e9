//! Market data records consumed by the signal engine.
//!
//! Everything here is a plain, immutable snapshot handed over by a data
//! collaborator. Prices and open interest are `f64` because every consumer
//! feeds them straight into ratio and indicator math.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Series are expected in ascending `time` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Typical price `(high + low + close) / 3`.
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// High-low range of the bar.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Candle interval requested from a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandleInterval {
    FiveMinute,
    Day,
}

impl std::fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FiveMinute => write!(f, "5minute"),
            Self::Day => write!(f, "day"),
        }
    }
}

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionType {
    /// Infers the option type from an exchange tradingsymbol such as
    /// `NIFTY24O1725000CE`.
    #[must_use]
    pub fn from_tradingsymbol(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_ascii_uppercase();
        if upper.ends_with("CE") {
            Some(Self::Call)
        } else if upper.ends_with("PE") {
            Some(Self::Put)
        } else {
            None
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CE"),
            Self::Put => write!(f, "PE"),
        }
    }
}

/// Which expiry of an underlying a chain belongs to. Part of the key under
/// which previous-cycle state is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryKind {
    Weekly,
    Monthly,
}

impl std::fmt::Display for ExpiryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// A single contract row of an option chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLeg {
    pub strike: f64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub open_interest: f64,
    #[serde(default)]
    pub last_price: f64,
    #[serde(default)]
    pub volume: f64,
}

impl OptionLeg {
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self.option_type, OptionType::Call)
    }

    #[must_use]
    pub const fn is_put(&self) -> bool {
        matches!(self.option_type, OptionType::Put)
    }
}

/// Option chain for one underlying and expiry at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainSnapshot {
    pub underlying: String,
    pub expiry: NaiveDate,
    pub spot: f64,
    #[serde(default)]
    pub legs: Vec<OptionLeg>,
    pub captured_at: DateTime<Utc>,
}

impl OptionChainSnapshot {
    /// Distinct strikes present in the chain, ascending.
    #[must_use]
    pub fn strikes(&self) -> Vec<f64> {
        let mut strikes: Vec<f64> = self.legs.iter().map(|l| l.strike).collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();
        strikes
    }

    /// Calendar days from `today` until expiry. Negative once expired.
    #[must_use]
    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry - today).num_days()
    }
}

/// Externally sourced market-wide inputs: volatility index, institutional
/// flows and the daily technical recommendation score.
///
/// Every field is optional; absent values make the dependent checks and
/// factors fall back rather than fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContext {
    /// India VIX level.
    #[serde(default)]
    pub vix: Option<f64>,
    /// FII net cash flow in crore.
    #[serde(default)]
    pub fii_net: Option<f64>,
    /// DII net cash flow in crore.
    #[serde(default)]
    pub dii_net: Option<f64>,
    /// Daily technical recommendation score, 0-100.
    #[serde(default)]
    pub technical_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn leg(strike: f64, option_type: OptionType, oi: f64) -> OptionLeg {
        OptionLeg {
            strike,
            option_type,
            open_interest: oi,
            last_price: 0.0,
            volume: 0.0,
        }
    }

    #[test]
    fn option_type_from_tradingsymbol() {
        assert_eq!(
            OptionType::from_tradingsymbol("NIFTY24O1725000CE"),
            Some(OptionType::Call)
        );
        assert_eq!(
            OptionType::from_tradingsymbol("banknifty24oct52000pe"),
            Some(OptionType::Put)
        );
        assert_eq!(OptionType::from_tradingsymbol("RELIANCE"), None);
    }

    #[test]
    fn strikes_are_sorted_and_distinct() {
        let snapshot = OptionChainSnapshot {
            underlying: "NIFTY".to_string(),
            expiry: NaiveDate::from_ymd_opt(2024, 10, 17).unwrap(),
            spot: 25_000.0,
            legs: vec![
                leg(25_100.0, OptionType::Call, 10.0),
                leg(24_900.0, OptionType::Put, 10.0),
                leg(25_100.0, OptionType::Put, 10.0),
                leg(25_000.0, OptionType::Call, 10.0),
            ],
            captured_at: Utc.with_ymd_and_hms(2024, 10, 14, 4, 0, 0).unwrap(),
        };

        assert_eq!(snapshot.strikes(), vec![24_900.0, 25_000.0, 25_100.0]);
        assert_eq!(
            snapshot.days_to_expiry(NaiveDate::from_ymd_opt(2024, 10, 14).unwrap()),
            3
        );
    }

    #[test]
    fn leg_deserializes_from_camel_case() {
        let json = r#"{"strike":25000,"type":"PE","openInterest":1200,"lastPrice":85.5}"#;
        let leg: OptionLeg = serde_json::from_str(json).unwrap();
        assert!(leg.is_put());
        assert!((leg.open_interest - 1200.0).abs() < f64::EPSILON);
        assert!((leg.volume - 0.0).abs() < f64::EPSILON);
    }
}
