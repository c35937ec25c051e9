//! Directional bias shared by sentiment, activity and risk evaluation.

use serde::{Deserialize, Serialize};

use crate::market::OptionType;
use crate::portfolio::TransactionType;

/// Lower edge of the neutral sentiment band.
pub const NEUTRAL_BAND_LOW: f64 = 45.0;
/// Upper edge of the neutral sentiment band.
pub const NEUTRAL_BAND_HIGH: f64 = 55.0;

/// Market or trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    /// Expects price to rise
    Bullish,
    /// Expects price to fall
    Bearish,
    /// No directional view
    Neutral,
}

impl Bias {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Bullish => Self::Bearish,
            Self::Bearish => Self::Bullish,
            Self::Neutral => Self::Neutral,
        }
    }

    /// Returns true if this bias has a direction.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        !matches!(self, Self::Neutral)
    }

    /// True when both sides are directional and point opposite ways.
    #[must_use]
    pub fn conflicts_with(self, other: Self) -> bool {
        self.is_directional() && other == self.opposite()
    }

    /// Directional exposure of an order.
    ///
    /// Buying a call or selling a put is bullish, selling a call or buying a
    /// put is bearish. Futures and equity follow the transaction side.
    #[must_use]
    pub const fn of_trade(side: TransactionType, option_type: Option<OptionType>) -> Self {
        match (side, option_type) {
            (TransactionType::Buy, Some(OptionType::Call))
            | (TransactionType::Sell, Some(OptionType::Put))
            | (TransactionType::Buy, None) => Self::Bullish,
            (TransactionType::Sell, Some(OptionType::Call))
            | (TransactionType::Buy, Some(OptionType::Put))
            | (TransactionType::Sell, None) => Self::Bearish,
        }
    }

    /// Maps a 0-100 sentiment score to a bias using the 45/55 neutral band.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > NEUTRAL_BAND_HIGH {
            Self::Bullish
        } else if score < NEUTRAL_BAND_LOW {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_bias_matrix() {
        use OptionType::{Call, Put};
        use TransactionType::{Buy, Sell};

        assert_eq!(Bias::of_trade(Buy, Some(Call)), Bias::Bullish);
        assert_eq!(Bias::of_trade(Sell, Some(Call)), Bias::Bearish);
        assert_eq!(Bias::of_trade(Buy, Some(Put)), Bias::Bearish);
        assert_eq!(Bias::of_trade(Sell, Some(Put)), Bias::Bullish);
        assert_eq!(Bias::of_trade(Buy, None), Bias::Bullish);
        assert_eq!(Bias::of_trade(Sell, None), Bias::Bearish);
    }

    #[test]
    fn neutral_band_edges_are_neutral() {
        assert_eq!(Bias::from_score(45.0), Bias::Neutral);
        assert_eq!(Bias::from_score(55.0), Bias::Neutral);
        assert_eq!(Bias::from_score(44.9), Bias::Bearish);
        assert_eq!(Bias::from_score(55.1), Bias::Bullish);
    }

    #[test]
    fn neutral_never_conflicts() {
        assert!(!Bias::Neutral.conflicts_with(Bias::Bullish));
        assert!(!Bias::Bullish.conflicts_with(Bias::Neutral));
        assert!(Bias::Bullish.conflicts_with(Bias::Bearish));
    }
}
