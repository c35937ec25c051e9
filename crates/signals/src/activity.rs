//! Market-activity regime classification.
//!
//! Compares two metric snapshots and labels the combined price and open
//! interest move using the buildup / unwinding / covering taxonomy:
//!
//! | price | OI | regime |
//! |-------|----|--------|
//! | up    | up | long buildup |
//! | down  | up | short buildup |
//! | down  | down | long unwinding |
//! | up    | down | short covering |
//!
//! Small moves in both dimensions are treated as consolidation before the
//! quadrant is considered.

use oipulse_core::Bias;
use serde::{Deserialize, Serialize};

use crate::option_metrics::OptionMetrics;

/// Total-OI move, in percent, at or below which OI is considered flat.
pub const OI_NOISE_PCT: f64 = 2.0;
/// Price move, in percent, at or below which price is considered flat.
pub const PRICE_NOISE_PCT: f64 = 0.3;
/// Strength above which a regime is reported as strong.
pub const STRONG_THRESHOLD: u8 = 6;

const CONSOLIDATION_STRENGTH: u8 = 2;
const STRENGTH_SCALE: f64 = 1.5;
const MAX_STRENGTH: f64 = 10.0;

/// Regime label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLabel {
    /// No previous snapshot to compare against
    Initializing,
    Consolidation,
    LongBuildup,
    ShortBuildup,
    LongUnwinding,
    ShortCovering,
    MixedSignals,
}

impl ActivityLabel {
    /// Direction the regime implies for the underlying.
    #[must_use]
    pub const fn implied_bias(self) -> Bias {
        match self {
            Self::LongBuildup | Self::ShortCovering => Bias::Bullish,
            Self::LongUnwinding | Self::ShortBuildup => Bias::Bearish,
            Self::Initializing | Self::Consolidation | Self::MixedSignals => Bias::Neutral,
        }
    }
}

impl std::fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Initializing => "Initializing",
            Self::Consolidation => "Consolidation",
            Self::LongBuildup => "Long Buildup",
            Self::ShortBuildup => "Short Buildup",
            Self::LongUnwinding => "Long Unwinding",
            Self::ShortCovering => "Short Covering",
            Self::MixedSignals => "Mixed Signals",
        };
        f.write_str(label)
    }
}

/// What drove a quadrant regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityDriver {
    FreshLongs,
    PutWriting,
    FreshShorts,
    CallWriting,
    CallDriven,
    PutDriven,
}

impl std::fmt::Display for ActivityDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let driver = match self {
            Self::FreshLongs => "fresh longs",
            Self::PutWriting => "put writing",
            Self::FreshShorts => "fresh shorts",
            Self::CallWriting => "call writing",
            Self::CallDriven => "call-driven",
            Self::PutDriven => "put-driven",
        };
        f.write_str(driver)
    }
}

/// How hard to lean on the regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTier {
    Strong,
    Moderate,
}

/// Absolute and percentage change of one quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub change: f64,
    pub pct: f64,
}

impl Delta {
    /// Change from `previous` to `current`; percent is 0 when `previous` is 0.
    #[must_use]
    pub fn between(current: f64, previous: f64) -> Self {
        let change = current - previous;
        let pct = if previous == 0.0 {
            0.0
        } else {
            change / previous * 100.0
        };
        Self { change, pct }
    }
}

/// Deltas between two metric snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDeltas {
    pub call_oi: Delta,
    pub put_oi: Delta,
    pub total_oi: Delta,
    pub price: Delta,
}

impl ActivityDeltas {
    #[must_use]
    pub fn between(current: &OptionMetrics, previous: &OptionMetrics) -> Self {
        Self {
            call_oi: Delta::between(current.total_call_oi, previous.total_call_oi),
            put_oi: Delta::between(current.total_put_oi, previous.total_put_oi),
            total_oi: Delta::between(current.total_oi(), previous.total_oi()),
            price: Delta::between(current.spot, previous.spot),
        }
    }

    /// Both price and total OI moved within noise.
    #[must_use]
    pub fn is_insignificant(&self) -> bool {
        self.total_oi.pct.abs() <= OI_NOISE_PCT && self.price.pct.abs() <= PRICE_NOISE_PCT
    }

    /// Regime strength, 0 to 10.
    #[must_use]
    pub fn strength(&self) -> u8 {
        let raw = ((self.price.pct.abs() + self.total_oi.pct.abs()) * STRENGTH_SCALE).round();
        raw.clamp(0.0, MAX_STRENGTH) as u8
    }
}

/// Classified regime with human-readable context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityClassification {
    pub label: ActivityLabel,
    pub driver: Option<ActivityDriver>,
    /// 0 (no conviction) to 10.
    pub strength: u8,
    pub tier: ActionTier,
    pub narrative: String,
    pub actionable_hint: String,
    pub deltas: Option<ActivityDeltas>,
}

impl ActivityClassification {
    fn initializing() -> Self {
        Self {
            label: ActivityLabel::Initializing,
            driver: None,
            strength: 0,
            tier: ActionTier::Moderate,
            narrative: "Waiting for a second snapshot to compare open interest and price."
                .to_string(),
            actionable_hint: "No activity read yet; rely on price action.".to_string(),
            deltas: None,
        }
    }

    /// Direction the regime implies for the underlying.
    #[must_use]
    pub const fn implied_bias(&self) -> Bias {
        self.label.implied_bias()
    }
}

/// Picks the quadrant label and driver from the signs of the deltas.
fn quadrant(deltas: &ActivityDeltas) -> (ActivityLabel, Option<ActivityDriver>) {
    let call = deltas.call_oi.pct;
    let put = deltas.put_oi.pct;
    let price_up = deltas.price.change > 0.0;
    let price_down = deltas.price.change < 0.0;
    let oi_up = deltas.total_oi.change > 0.0;
    let oi_down = deltas.total_oi.change < 0.0;

    if price_up && oi_up {
        let driver = if call > put {
            ActivityDriver::FreshLongs
        } else {
            ActivityDriver::PutWriting
        };
        (ActivityLabel::LongBuildup, Some(driver))
    } else if price_down && oi_up {
        let driver = if put > call {
            ActivityDriver::FreshShorts
        } else {
            ActivityDriver::CallWriting
        };
        (ActivityLabel::ShortBuildup, Some(driver))
    } else if price_down && oi_down {
        let driver = if call.abs() > put.abs() {
            ActivityDriver::CallDriven
        } else {
            ActivityDriver::PutDriven
        };
        (ActivityLabel::LongUnwinding, Some(driver))
    } else if price_up && oi_down {
        let driver = if put.abs() > call.abs() {
            ActivityDriver::PutDriven
        } else {
            ActivityDriver::CallDriven
        };
        (ActivityLabel::ShortCovering, Some(driver))
    } else {
        (ActivityLabel::MixedSignals, None)
    }
}

fn narrative(
    label: ActivityLabel,
    driver: Option<ActivityDriver>,
    deltas: &ActivityDeltas,
) -> String {
    let moves = format!(
        "price {:+.2}%, total OI {:+.2}% (calls {:+.2}%, puts {:+.2}%)",
        deltas.price.pct, deltas.total_oi.pct, deltas.call_oi.pct, deltas.put_oi.pct
    );
    match (label, driver) {
        (ActivityLabel::Consolidation, _) => {
            format!("Range-bound: {moves}. Neither side is committing fresh positions.")
        }
        (ActivityLabel::MixedSignals, _) => {
            format!("Price and open interest disagree: {moves}.")
        }
        (label, Some(driver)) => format!("{label} led by {driver}: {moves}."),
        (label, None) => format!("{label}: {moves}."),
    }
}

fn actionable_hint(label: ActivityLabel, tier: ActionTier) -> String {
    let hint = match (label, tier) {
        (ActivityLabel::LongBuildup, ActionTier::Strong) => {
            "Strong bullish participation; dips toward support are likely to be bought."
        }
        (ActivityLabel::LongBuildup, ActionTier::Moderate) => {
            "Bullish bias building; prefer longs with stops below support."
        }
        (ActivityLabel::ShortBuildup, ActionTier::Strong) => {
            "Strong bearish participation; rallies toward resistance are likely to be sold."
        }
        (ActivityLabel::ShortBuildup, ActionTier::Moderate) => {
            "Bearish bias building; prefer shorts with stops above resistance."
        }
        (ActivityLabel::LongUnwinding, ActionTier::Strong) => {
            "Longs exiting aggressively; avoid fresh longs until OI stabilises."
        }
        (ActivityLabel::LongUnwinding, ActionTier::Moderate) => {
            "Longs trimming positions; momentum is fading."
        }
        (ActivityLabel::ShortCovering, ActionTier::Strong) => {
            "Sharp short covering; expect fast moves but watch for exhaustion."
        }
        (ActivityLabel::ShortCovering, ActionTier::Moderate) => {
            "Shorts covering; upside may lack fresh buying support."
        }
        (ActivityLabel::Consolidation, _) => "Wait for a breakout from the current range.",
        (ActivityLabel::MixedSignals, _) => "No clear regime; reduce size or stay flat.",
        (ActivityLabel::Initializing, _) => "No activity read yet; rely on price action.",
    };
    hint.to_string()
}

/// Classifies the move from `previous` to `current`.
///
/// Without a previous snapshot the result is [`ActivityLabel::Initializing`]
/// with zero strength.
#[must_use]
pub fn classify(
    current: &OptionMetrics,
    previous: Option<&OptionMetrics>,
) -> ActivityClassification {
    let Some(previous) = previous else {
        return ActivityClassification::initializing();
    };

    let deltas = ActivityDeltas::between(current, previous);

    let (label, driver, strength) = if deltas.is_insignificant() {
        (ActivityLabel::Consolidation, None, CONSOLIDATION_STRENGTH)
    } else {
        let (label, driver) = quadrant(&deltas);
        (label, driver, deltas.strength())
    };

    let tier = if strength > STRONG_THRESHOLD {
        ActionTier::Strong
    } else {
        ActionTier::Moderate
    };

    tracing::debug!(
        underlying = %current.underlying,
        %label,
        strength,
        oi_pct = deltas.total_oi.pct,
        price_pct = deltas.price.pct,
        "Activity classified"
    );

    ActivityClassification {
        label,
        driver,
        strength,
        tier,
        narrative: narrative(label, driver, &deltas),
        actionable_hint: actionable_hint(label, tier),
        deltas: Some(deltas),
    }
}
