//! Structural option-chain metrics: PCR, max pain and OI walls.
//!
//! Computed once per polling cycle from a single [`OptionChainSnapshot`].
//! The calculation is total: an empty chain produces fallback levels around
//! the ATM strike instead of an error.

use chrono::{DateTime, NaiveDate, Utc};
use oipulse_core::{OptionChainSnapshot, OptionLeg};
use serde::{Deserialize, Serialize};

/// A strike acting as support or resistance, with the OI behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OiLevel {
    pub level: f64,
    pub oi: f64,
}

impl OiLevel {
    #[must_use]
    pub const fn new(level: f64, oi: f64) -> Self {
        Self { level, oi }
    }

    const fn fallback(level: f64) -> Self {
        Self::new(level, 0.0)
    }
}

/// Derived metrics for one chain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionMetrics {
    pub underlying: String,
    pub expiry: NaiveDate,
    pub spot: f64,
    pub atm_strike: f64,
    pub pcr: f64,
    pub max_pain_strike: f64,
    pub support: OiLevel,
    pub support2: OiLevel,
    pub resistance: OiLevel,
    pub resistance2: OiLevel,
    #[serde(rename = "totalCallOI")]
    pub total_call_oi: f64,
    #[serde(rename = "totalPutOI")]
    pub total_put_oi: f64,
    pub captured_at: DateTime<Utc>,
}

impl OptionMetrics {
    #[must_use]
    pub fn total_oi(&self) -> f64 {
        self.total_call_oi + self.total_put_oi
    }
}

/// Nearest strike to `spot` on a `gap` grid.
#[must_use]
pub fn atm_strike(spot: f64, gap: f64) -> f64 {
    if gap <= 0.0 {
        return spot;
    }
    (spot / gap).round() * gap
}

/// Put/call ratio, 0 when there is no call OI.
#[must_use]
pub fn pcr(total_call_oi: f64, total_put_oi: f64) -> f64 {
    if total_call_oi > 0.0 {
        total_put_oi / total_call_oi
    } else {
        0.0
    }
}

/// Aggregate writer payout if the underlying expires at `expiry_strike`.
#[must_use]
pub fn pain_at(legs: &[OptionLeg], expiry_strike: f64) -> f64 {
    legs.iter()
        .map(|leg| {
            if leg.is_call() && leg.strike > expiry_strike {
                leg.open_interest * (leg.strike - expiry_strike)
            } else if leg.is_put() && leg.strike < expiry_strike {
                leg.open_interest * (expiry_strike - leg.strike)
            } else {
                0.0
            }
        })
        .sum()
}

/// Strike with the least writer payout. Ties go to the lowest strike.
/// `None` for an empty chain.
#[must_use]
pub fn max_pain(snapshot: &OptionChainSnapshot) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for strike in snapshot.strikes() {
        let pain = pain_at(&snapshot.legs, strike);
        match best {
            Some((_, best_pain)) if pain >= best_pain => {}
            _ => best = Some((strike, pain)),
        }
    }
    best.map(|(strike, _)| strike)
}

/// Top two legs by OI, scanning ascending strikes so equal OI keeps the
/// lower strike first.
fn top_two_by_oi<'a>(
    legs: impl Iterator<Item = &'a OptionLeg>,
) -> (Option<OiLevel>, Option<OiLevel>) {
    let mut sorted: Vec<&OptionLeg> = legs.collect();
    sorted.sort_by(|a, b| a.strike.total_cmp(&b.strike));

    let mut first: Option<OiLevel> = None;
    let mut second: Option<OiLevel> = None;
    for leg in sorted {
        let candidate = OiLevel {
            level: leg.strike,
            oi: leg.open_interest,
        };
        match first {
            Some(top) if candidate.oi <= top.oi => {
                if second.map_or(true, |s| candidate.oi > s.oi) {
                    second = Some(candidate);
                }
            }
            _ => {
                second = first;
                first = Some(candidate);
            }
        }
    }
    (first, second)
}

/// Computes [`OptionMetrics`] for a snapshot on a `strike_gap` grid.
#[must_use]
pub fn compute_metrics(snapshot: &OptionChainSnapshot, strike_gap: f64) -> OptionMetrics {
    let atm = atm_strike(snapshot.spot, strike_gap);

    let (total_call_oi, total_put_oi) = snapshot
        .legs
        .iter()
        .fold((0.0, 0.0), |(calls, puts), leg| {
            let oi = leg.open_interest.max(0.0);
            if leg.is_call() {
                (calls + oi, puts)
            } else {
                (calls, puts + oi)
            }
        });

    let (support, support2) =
        top_two_by_oi(snapshot.legs.iter().filter(|l| l.is_put() && l.strike <= atm));
    let (resistance, resistance2) =
        top_two_by_oi(snapshot.legs.iter().filter(|l| l.is_call() && l.strike >= atm));

    OptionMetrics {
        underlying: snapshot.underlying.clone(),
        expiry: snapshot.expiry,
        spot: snapshot.spot,
        atm_strike: atm,
        pcr: pcr(total_call_oi, total_put_oi),
        max_pain_strike: max_pain(snapshot).unwrap_or(atm),
        support: support.unwrap_or_else(|| OiLevel::fallback(atm - 2.0 * strike_gap)),
        support2: support2.unwrap_or_else(|| OiLevel::fallback(atm - 3.0 * strike_gap)),
        resistance: resistance.unwrap_or_else(|| OiLevel::fallback(atm + 2.0 * strike_gap)),
        resistance2: resistance2.unwrap_or_else(|| OiLevel::fallback(atm + 3.0 * strike_gap)),
        total_call_oi,
        total_put_oi,
        captured_at: snapshot.captured_at,
    }
}

/// Restricts a chain to `strikes_each_side` strikes either side of ATM.
#[must_use]
pub fn strike_window(
    snapshot: &OptionChainSnapshot,
    strike_gap: f64,
    strikes_each_side: usize,
) -> OptionChainSnapshot {
    let atm = atm_strike(snapshot.spot, strike_gap);
    let half_width = strike_gap * strikes_each_side as f64;
    let (low, high) = (atm - half_width, atm + half_width);

    OptionChainSnapshot {
        legs: snapshot
            .legs
            .iter()
            .filter(|leg| leg.strike >= low && leg.strike <= high)
            .copied()
            .collect(),
        ..snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use oipulse_core::OptionType;

    fn leg(strike: f64, option_type: OptionType, oi: f64) -> OptionLeg {
        OptionLeg {
            strike,
            option_type,
            open_interest: oi,
            last_price: 0.0,
            volume: 0.0,
        }
    }

    fn snapshot(spot: f64, legs: Vec<OptionLeg>) -> OptionChainSnapshot {
        OptionChainSnapshot {
            underlying: "NIFTY".to_string(),
            expiry: NaiveDate::from_ymd_opt(2024, 10, 17).unwrap(),
            spot,
            legs,
            captured_at: Utc.with_ymd_and_hms(2024, 10, 14, 4, 0, 0).unwrap(),
        }
    }

    fn sample_chain() -> OptionChainSnapshot {
        use OptionType::{Call, Put};
        snapshot(
            25_020.0,
            vec![
                leg(24_900.0, Put, 90_000.0),
                leg(24_900.0, Call, 5_000.0),
                leg(24_950.0, Put, 60_000.0),
                leg(24_950.0, Call, 12_000.0),
                leg(25_000.0, Put, 120_000.0),
                leg(25_000.0, Call, 40_000.0),
                leg(25_050.0, Put, 20_000.0),
                leg(25_050.0, Call, 70_000.0),
                leg(25_100.0, Put, 8_000.0),
                leg(25_100.0, Call, 150_000.0),
                leg(25_150.0, Put, 2_000.0),
                leg(25_150.0, Call, 95_000.0),
            ],
        )
    }

    #[test]
    fn atm_rounds_to_grid() {
        assert!((atm_strike(25_020.0, 50.0) - 25_000.0).abs() < f64::EPSILON);
        assert!((atm_strike(25_025.0, 50.0) - 25_050.0).abs() < f64::EPSILON);
        assert!((atm_strike(51_960.0, 100.0) - 52_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pcr_is_zero_without_call_oi() {
        use OptionType::Put;
        let chain = snapshot(25_000.0, vec![leg(25_000.0, Put, 10_000.0)]);
        let metrics = compute_metrics(&chain, 50.0);
        assert!(metrics.pcr.abs() < f64::EPSILON);
        assert!((metrics.total_put_oi - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn support_and_resistance_pick_oi_walls() {
        let metrics = compute_metrics(&sample_chain(), 50.0);

        assert!((metrics.atm_strike - 25_000.0).abs() < f64::EPSILON);
        assert_eq!(metrics.support, OiLevel::new(25_000.0, 120_000.0));
        assert_eq!(metrics.support2, OiLevel::new(24_900.0, 90_000.0));
        assert_eq!(metrics.resistance, OiLevel::new(25_100.0, 150_000.0));
        assert_eq!(metrics.resistance2, OiLevel::new(25_150.0, 95_000.0));
        assert!((metrics.total_call_oi - 372_000.0).abs() < f64::EPSILON);
        assert!((metrics.total_put_oi - 300_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn max_pain_minimizes_payout_over_all_strikes() {
        let chain = sample_chain();
        let metrics = compute_metrics(&chain, 50.0);
        let best = pain_at(&chain.legs, metrics.max_pain_strike);

        assert!(chain.strikes().contains(&metrics.max_pain_strike));
        for strike in chain.strikes() {
            assert!(best <= pain_at(&chain.legs, strike));
        }
    }

    #[test]
    fn max_pain_tie_goes_to_lowest_strike() {
        use OptionType::{Call, Put};
        // Symmetric book: pain at 100 and 200 are both 1000.
        let chain = snapshot(
            150.0,
            vec![leg(100.0, Put, 10.0), leg(200.0, Call, 10.0)],
        );
        assert!((pain_at(&chain.legs, 100.0) - pain_at(&chain.legs, 200.0)).abs() < f64::EPSILON);
        assert_eq!(max_pain(&chain), Some(100.0));
    }

    #[test]
    fn empty_chain_uses_fallback_levels() {
        let metrics = compute_metrics(&snapshot(25_020.0, vec![]), 50.0);

        assert!(metrics.pcr.abs() < f64::EPSILON);
        assert!((metrics.max_pain_strike - 25_000.0).abs() < f64::EPSILON);
        assert_eq!(metrics.support, OiLevel::new(24_900.0, 0.0));
        assert_eq!(metrics.support2, OiLevel::new(24_850.0, 0.0));
        assert_eq!(metrics.resistance, OiLevel::new(25_100.0, 0.0));
        assert_eq!(metrics.resistance2, OiLevel::new(25_150.0, 0.0));
    }

    #[test]
    fn single_leg_side_falls_back_for_second_level() {
        use OptionType::{Call, Put};
        let chain = snapshot(
            25_000.0,
            vec![leg(24_950.0, Put, 500.0), leg(25_050.0, Call, 700.0)],
        );
        let metrics = compute_metrics(&chain, 50.0);
        assert_eq!(metrics.support, OiLevel::new(24_950.0, 500.0));
        assert_eq!(metrics.support2, OiLevel::new(24_850.0, 0.0));
        assert_eq!(metrics.resistance2, OiLevel::new(25_150.0, 0.0));
    }

    #[test]
    fn equal_oi_keeps_lower_strike_first() {
        use OptionType::Put;
        let chain = snapshot(
            25_000.0,
            vec![leg(24_950.0, Put, 500.0), leg(24_900.0, Put, 500.0)],
        );
        let metrics = compute_metrics(&chain, 50.0);
        assert!((metrics.support.level - 24_900.0).abs() < f64::EPSILON);
        assert!((metrics.support2.level - 24_950.0).abs() < f64::EPSILON);
    }

    #[test]
    fn compute_is_idempotent() {
        let chain = sample_chain();
        assert_eq!(compute_metrics(&chain, 50.0), compute_metrics(&chain, 50.0));
    }

    #[test]
    fn strike_window_keeps_atm_neighbourhood() {
        let windowed = strike_window(&sample_chain(), 50.0, 1);
        let strikes = windowed.strikes();
        assert_eq!(strikes, vec![24_950.0, 25_000.0, 25_050.0]);
        assert_eq!(windowed.legs.len(), 6);
    }
}
