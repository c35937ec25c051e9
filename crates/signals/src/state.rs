//! Previous-state cycle.
//!
//! Activity and commentary compare each snapshot against the one before it.
//! The pure [`advance`] step takes the stored [`PreviousState`] and returns
//! the update together with the state to store for the next cycle; the
//! [`StateStore`] trait keeps that state between calls.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use oipulse_core::{ExpiryKind, OptionChainSnapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::activity::{classify, ActivityClassification};
use crate::commentary::{diff, AlertEntry, AlertHistory};
use crate::option_metrics::{compute_metrics, OptionMetrics};
use crate::persistence::StateStoreError;

/// Previous state is tracked per underlying and expiry kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateKey {
    pub underlying: String,
    pub expiry_kind: ExpiryKind,
}

impl StateKey {
    #[must_use]
    pub fn new(underlying: impl Into<String>, expiry_kind: ExpiryKind) -> Self {
        Self {
            underlying: underlying.into().to_uppercase(),
            expiry_kind,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.expiry_kind {
            ExpiryKind::Weekly => "weekly",
            ExpiryKind::Monthly => "monthly",
        };
        write!(f, "{}:{kind}", self.underlying)
    }
}

/// What survives between two polling cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousState {
    pub metrics: Option<OptionMetrics>,
    #[serde(default)]
    pub alerts: AlertHistory,
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseUpdate {
    pub metrics: OptionMetrics,
    pub activity: ActivityClassification,
    /// Alerts raised by this cycle, in report order.
    pub new_alerts: Vec<AlertEntry>,
    /// Full history after this cycle, newest first.
    pub alerts: AlertHistory,
}

/// Runs one read-compute-write cycle over a snapshot.
///
/// Previous metrics for a different expiry are dropped, so the first cycle
/// after a rollover reports `Initializing` instead of a spurious OI swing.
#[must_use]
pub fn advance(
    snapshot: &OptionChainSnapshot,
    strike_gap: f64,
    previous: Option<PreviousState>,
) -> (PulseUpdate, PreviousState) {
    let metrics = compute_metrics(snapshot, strike_gap);
    let PreviousState {
        metrics: previous_metrics,
        mut alerts,
    } = previous.unwrap_or_default();

    let previous_metrics = previous_metrics.filter(|prev| {
        let same_expiry = prev.expiry == metrics.expiry;
        if !same_expiry {
            tracing::info!(
                underlying = %metrics.underlying,
                previous_expiry = %prev.expiry,
                expiry = %metrics.expiry,
                "Expiry rolled over, discarding previous metrics"
            );
        }
        same_expiry
    });

    let activity = classify(&metrics, previous_metrics.as_ref());
    let new_alerts = diff(&metrics, previous_metrics.as_ref());
    alerts.record(new_alerts.clone());

    let next = PreviousState {
        metrics: Some(metrics.clone()),
        alerts: alerts.clone(),
    };

    (
        PulseUpdate {
            metrics,
            activity,
            new_alerts,
            alerts,
        },
        next,
    )
}

/// Storage for [`PreviousState`]. Last writer wins.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, key: &StateKey) -> Result<Option<PreviousState>, StateStoreError>;

    async fn save(&self, key: &StateKey, state: &PreviousState) -> Result<(), StateStoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<StateKey, PreviousState>>,
}

impl InMemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, key: &StateKey) -> Result<Option<PreviousState>, StateStoreError> {
        Ok(self.states.read().await.get(key).cloned())
    }

    async fn save(&self, key: &StateKey, state: &PreviousState) -> Result<(), StateStoreError> {
        self.states.write().await.insert(key.clone(), state.clone());
        Ok(())
    }
}
