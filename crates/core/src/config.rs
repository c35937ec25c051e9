use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// IANA timezone whose midnight starts the VWAP session.
    pub timezone: String,
    /// Strike spacing per underlying.
    pub strike_gaps: HashMap<String, f64>,
    /// Strike spacing for underlyings missing from `strike_gaps`.
    pub default_strike_gap: f64,
    /// Strikes kept on each side of ATM before metrics are computed.
    pub strike_window: usize,
    /// Underlyings treated as index options by the PCR-extreme check.
    pub index_underlyings: Vec<String>,
}

impl MarketConfig {
    #[must_use]
    pub fn strike_gap_for(&self, underlying: &str) -> f64 {
        self.strike_gaps
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(underlying))
            .map_or(self.default_strike_gap, |(_, gap)| *gap)
    }

    #[must_use]
    pub fn is_index(&self, underlying: &str) -> bool {
        self.index_underlyings
            .iter()
            .any(|name| name.eq_ignore_ascii_case(underlying))
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        let strike_gaps = [
            ("NIFTY", 50.0),
            ("BANKNIFTY", 100.0),
            ("FINNIFTY", 50.0),
            ("MIDCPNIFTY", 25.0),
            ("SENSEX", 100.0),
            ("BANKEX", 100.0),
        ]
        .into_iter()
        .map(|(name, gap)| (name.to_string(), gap))
        .collect();

        Self {
            timezone: "Asia/Kolkata".to_string(),
            strike_gaps,
            default_strike_gap: 50.0,
            strike_window: 10,
            index_underlyings: ["NIFTY", "BANKNIFTY", "FINNIFTY", "MIDCPNIFTY", "SENSEX", "BANKEX"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Thresholds and score contributions for pre-trade risk checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Open positions at or above this count raise a warning.
    pub position_count_warning: usize,
    /// Open positions at or above this count (below the warning) raise an info.
    pub position_count_info: usize,
    /// Unrealised loss beyond which adding to a position counts as averaging down.
    pub averaging_down_loss: Decimal,
    /// VIX above this level raises a warning.
    pub vix_warning: f64,
    /// VIX above this level (up to the warning) raises a caution.
    pub vix_caution: f64,
    /// PCR below this is an extreme for bullish index option trades.
    pub pcr_extreme_low: f64,
    /// PCR above this is an extreme for bearish index option trades.
    pub pcr_extreme_high: f64,
    /// Distance from spot, in percent, at which an OI wall is "near".
    pub oi_wall_proximity_pct: f64,
    /// Max-pain check only applies at or inside this many days to expiry.
    pub max_pain_dte: i64,
    /// Spot further than this percent from max pain raises a caution.
    pub max_pain_distance_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            position_count_warning: 5,
            position_count_info: 3,
            averaging_down_loss: Decimal::from(500),
            vix_warning: 25.0,
            vix_caution: 18.0,
            pcr_extreme_low: 0.7,
            pcr_extreme_high: 1.5,
            oi_wall_proximity_pct: 0.75,
            max_pain_dte: 3,
            max_pain_distance_pct: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strike_gap_lookup_is_case_insensitive() {
        let config = MarketConfig::default();
        assert!((config.strike_gap_for("banknifty") - 100.0).abs() < f64::EPSILON);
        assert!((config.strike_gap_for("RELIANCE") - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn index_detection() {
        let config = MarketConfig::default();
        assert!(config.is_index("Nifty"));
        assert!(!config.is_index("INFY"));
    }
}
