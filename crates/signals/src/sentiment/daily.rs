//! Daily sentiment: institutional flow, technical recommendation and PCR band.

use serde::{Deserialize, Serialize};

use super::{FactorScore, Mood, SentimentFactor};

pub const FLOW_WEIGHT: f64 = 0.40;
pub const TECHNICAL_WEIGHT: f64 = 0.35;
pub const PCR_BAND_WEIGHT: f64 = 0.25;

/// Net flow, in crore, that counts as a heavy institutional day.
const HEAVY_FLOW: f64 = 500.0;
/// Combined net flow, in crore, that tilts an otherwise quiet day.
const TILT_FLOW: f64 = 200.0;
const NEUTRAL: f64 = 50.0;

/// FII/DII flow mapped onto six tiers. First match wins.
#[must_use]
pub fn flow_score(fii_net: f64, dii_net: f64) -> f64 {
    let combined = fii_net + dii_net;
    if fii_net > HEAVY_FLOW && dii_net > HEAVY_FLOW {
        85.0
    } else if fii_net > HEAVY_FLOW || dii_net > HEAVY_FLOW {
        70.0
    } else if fii_net < -HEAVY_FLOW && dii_net < -HEAVY_FLOW {
        15.0
    } else if fii_net < -HEAVY_FLOW || dii_net < -HEAVY_FLOW {
        30.0
    } else if combined > TILT_FLOW {
        60.0
    } else if combined < -TILT_FLOW {
        40.0
    } else {
        NEUTRAL
    }
}

/// PCR mapped onto the daily bands. First match wins, so the balanced
/// 0.8-1.0 band scores highest and both tails score low.
#[must_use]
pub fn pcr_band_score(pcr: f64) -> f64 {
    if (0.8..=1.0).contains(&pcr) {
        70.0
    } else if pcr > 1.0 && pcr <= 1.3 {
        55.0
    } else if pcr > 1.3 {
        40.0
    } else if pcr < 0.7 {
        35.0
    } else {
        NEUTRAL
    }
}

/// Daily mood buckets.
#[must_use]
pub fn daily_mood(score: f64) -> Mood {
    if score >= 70.0 {
        Mood::VeryBullish
    } else if score >= 60.0 {
        Mood::Bullish
    } else if score >= 55.0 {
        Mood::SlightlyBullish
    } else if score <= 30.0 {
        Mood::VeryBearish
    } else if score <= 40.0 {
        Mood::Bearish
    } else if score <= 45.0 {
        Mood::SlightlyBearish
    } else {
        Mood::Neutral
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySentiment {
    pub score: f64,
    pub mood: Mood,
    pub breakdown: Vec<FactorScore>,
}

/// Weighted daily composite. Missing flow or technical inputs score neutral.
#[must_use]
pub fn score_daily(
    fii_net: Option<f64>,
    dii_net: Option<f64>,
    technical_score: Option<f64>,
    pcr: f64,
) -> DailySentiment {
    let flows = match (fii_net, dii_net) {
        (None, None) => None,
        (fii, dii) => Some((fii.unwrap_or(0.0), dii.unwrap_or(0.0))),
    };
    let flow = flows.map_or(NEUTRAL, |(fii, dii)| flow_score(fii, dii));
    let technical = technical_score.map_or(NEUTRAL, |s| s.clamp(0.0, 100.0));
    let pcr_band = pcr_band_score(pcr);

    let breakdown = vec![
        FactorScore::weighted(
            SentimentFactor::InstitutionalFlow,
            flows.map(|(fii, dii)| fii + dii),
            flow,
            FLOW_WEIGHT,
        ),
        FactorScore::weighted(
            SentimentFactor::Technical,
            technical_score,
            technical,
            TECHNICAL_WEIGHT,
        ),
        FactorScore::weighted(SentimentFactor::PcrBand, Some(pcr), pcr_band, PCR_BAND_WEIGHT),
    ];

    let score = breakdown
        .iter()
        .map(|f| f.contribution)
        .sum::<f64>()
        .clamp(0.0, 100.0);

    DailySentiment {
        score,
        mood: daily_mood(score),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_tiers() {
        assert!((flow_score(800.0, 600.0) - 85.0).abs() < f64::EPSILON);
        assert!((flow_score(800.0, -900.0) - 70.0).abs() < f64::EPSILON);
        assert!((flow_score(-800.0, -600.0) - 15.0).abs() < f64::EPSILON);
        assert!((flow_score(100.0, -600.0) - 30.0).abs() < f64::EPSILON);
        assert!((flow_score(150.0, 100.0) - 60.0).abs() < f64::EPSILON);
        assert!((flow_score(-150.0, -100.0) - 40.0).abs() < f64::EPSILON);
        assert!((flow_score(100.0, 50.0) - 50.0).abs() < f64::EPSILON);
        // exactly 500 is not heavy
        assert!((flow_score(500.0, 0.0) - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pcr_bands_first_match_wins() {
        assert!((pcr_band_score(0.8) - 70.0).abs() < f64::EPSILON);
        assert!((pcr_band_score(1.0) - 70.0).abs() < f64::EPSILON);
        assert!((pcr_band_score(1.2) - 55.0).abs() < f64::EPSILON);
        assert!((pcr_band_score(1.3) - 55.0).abs() < f64::EPSILON);
        assert!((pcr_band_score(1.6) - 40.0).abs() < f64::EPSILON);
        assert!((pcr_band_score(0.65) - 35.0).abs() < f64::EPSILON);
        assert!((pcr_band_score(0.75) - 50.0).abs() < f64::EPSILON);
        assert!((pcr_band_score(0.0) - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mood_buckets() {
        assert_eq!(daily_mood(70.0), Mood::VeryBullish);
        assert_eq!(daily_mood(60.0), Mood::Bullish);
        assert_eq!(daily_mood(55.0), Mood::SlightlyBullish);
        assert_eq!(daily_mood(50.0), Mood::Neutral);
        assert_eq!(daily_mood(45.0), Mood::SlightlyBearish);
        assert_eq!(daily_mood(40.0), Mood::Bearish);
        assert_eq!(daily_mood(30.0), Mood::VeryBearish);
    }

    #[test]
    fn weighted_composite() {
        // 0.40*85 + 0.35*80 + 0.25*70 = 34 + 28 + 17.5 = 79.5
        let daily = score_daily(Some(900.0), Some(700.0), Some(80.0), 0.9);
        assert!((daily.score - 79.5).abs() < 1e-9);
        assert_eq!(daily.mood, Mood::VeryBullish);
        assert_eq!(daily.breakdown.len(), 3);
    }

    #[test]
    fn missing_inputs_score_neutral() {
        // 0.40*50 + 0.35*50 + 0.25*50
        let daily = score_daily(None, None, None, 0.75);
        assert!((daily.score - 50.0).abs() < 1e-9);
        assert!(daily.breakdown[0].value.is_none());
        assert!(daily.breakdown[1].value.is_none());
    }

    #[test]
    fn technical_score_is_clamped() {
        let high = score_daily(None, None, Some(250.0), 0.75);
        assert!((high.score - (20.0 + 35.0 + 12.5)).abs() < 1e-9);
    }
}
