//! Snapshot-to-snapshot commentary.
//!
//! Diffs two consecutive [`OptionMetrics`] into short alert entries and keeps
//! them in a bounded, newest-first [`AlertHistory`].

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::Delta;
use crate::option_metrics::OptionMetrics;

/// Maximum entries retained in an [`AlertHistory`].
pub const ALERT_CAPACITY: usize = 10;

const PCR_SHIFT: f64 = 0.05;
const WALL_OI_SHIFT_PCT: f64 = 5.0;
const TOTAL_OI_SHIFT_PCT: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Bullish,
    Bearish,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Newest-first alert log. Only grows at the front; the oldest entries are
/// evicted once [`ALERT_CAPACITY`] is exceeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AlertEntry>", into = "Vec<AlertEntry>")]
pub struct AlertHistory {
    entries: VecDeque<AlertEntry>,
}

impl AlertHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a batch produced by one diff. The batch lands at the front in
    /// its original order.
    pub fn record(&mut self, batch: Vec<AlertEntry>) {
        for entry in batch.into_iter().rev() {
            self.entries.push_front(entry);
        }
        self.entries.truncate(ALERT_CAPACITY);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry first.
    pub fn iter(&self) -> impl Iterator<Item = &AlertEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&AlertEntry> {
        self.entries.front()
    }
}

impl From<Vec<AlertEntry>> for AlertHistory {
    fn from(mut entries: Vec<AlertEntry>) -> Self {
        entries.truncate(ALERT_CAPACITY);
        Self {
            entries: entries.into(),
        }
    }
}

impl From<AlertHistory> for Vec<AlertEntry> {
    fn from(history: AlertHistory) -> Self {
        history.entries.into()
    }
}

fn directional(up: bool) -> AlertSeverity {
    if up {
        AlertSeverity::Bullish
    } else {
        AlertSeverity::Bearish
    }
}

/// Alerts describing what changed from `previous` to `current`.
///
/// Entries are returned in a fixed order (PCR, support, resistance, max
/// pain, support OI, resistance OI, total OI), all stamped with
/// `current.captured_at`. No previous snapshot means nothing to report.
#[must_use]
pub fn diff(current: &OptionMetrics, previous: Option<&OptionMetrics>) -> Vec<AlertEntry> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut alerts = Vec::new();
    let mut push = |severity: AlertSeverity, message: String| {
        alerts.push(AlertEntry {
            timestamp: current.captured_at,
            severity,
            message,
        });
    };

    let pcr_change = current.pcr - previous.pcr;
    if pcr_change.abs() >= PCR_SHIFT {
        let rising = pcr_change > 0.0;
        push(
            directional(rising),
            format!(
                "PCR {} from {:.2} to {:.2}: {}",
                if rising { "rose" } else { "fell" },
                previous.pcr,
                current.pcr,
                if rising {
                    "put writers adding, bullish tilt"
                } else {
                    "call writers adding, bearish tilt"
                }
            ),
        );
    }

    if current.support.level != previous.support.level {
        let up = current.support.level > previous.support.level;
        push(
            directional(up),
            format!(
                "Support shifted {} from {:.0} to {:.0}",
                if up { "up" } else { "down" },
                previous.support.level,
                current.support.level
            ),
        );
    }

    if current.resistance.level != previous.resistance.level {
        let up = current.resistance.level > previous.resistance.level;
        push(
            directional(up),
            format!(
                "Resistance shifted {} from {:.0} to {:.0}",
                if up { "up" } else { "down" },
                previous.resistance.level,
                current.resistance.level
            ),
        );
    }

    if current.max_pain_strike != previous.max_pain_strike {
        push(
            AlertSeverity::Info,
            format!(
                "Max pain moved from {:.0} to {:.0}",
                previous.max_pain_strike, current.max_pain_strike
            ),
        );
    }

    let support_oi = Delta::between(current.support.oi, previous.support.oi);
    if support_oi.pct.abs() >= WALL_OI_SHIFT_PCT {
        if support_oi.pct < 0.0 {
            push(
                AlertSeverity::Warning,
                format!(
                    "Support at {:.0} weakening: put OI {:+.1}%",
                    current.support.level, support_oi.pct
                ),
            );
        } else {
            push(
                AlertSeverity::Bullish,
                format!(
                    "Support at {:.0} strengthening: put OI {:+.1}%",
                    current.support.level, support_oi.pct
                ),
            );
        }
    }

    let resistance_oi = Delta::between(current.resistance.oi, previous.resistance.oi);
    if resistance_oi.pct.abs() >= WALL_OI_SHIFT_PCT {
        if resistance_oi.pct < 0.0 {
            push(
                AlertSeverity::Bullish,
                format!(
                    "Resistance at {:.0} weakening: call OI {:+.1}%",
                    current.resistance.level, resistance_oi.pct
                ),
            );
        } else {
            push(
                AlertSeverity::Warning,
                format!(
                    "Resistance at {:.0} strengthening: call OI {:+.1}%",
                    current.resistance.level, resistance_oi.pct
                ),
            );
        }
    }

    let total_oi = Delta::between(current.total_oi(), previous.total_oi());
    if total_oi.pct.abs() >= TOTAL_OI_SHIFT_PCT {
        push(
            AlertSeverity::Info,
            format!("Total OI {:+.1}% since last update", total_oi.pct),
        );
    }

    alerts
}
