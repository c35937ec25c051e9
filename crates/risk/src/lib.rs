//! Deterministic pre-trade risk evaluation.
//!
//! Each rule inspects one aspect of a proposed order (exposure, trend,
//! market conditions) and yields a scored finding. The [`RiskAgent`] runs
//! them all and sums the scores into a verdict; the [`AdvisorService`]
//! gathers the inputs from a market data source.

pub mod agent;
pub mod exposure;
pub mod market;
pub mod service;
pub mod trend;
pub mod types;

pub use agent::RiskAgent;
pub use service::AdvisorService;
pub use types::{CheckError, CheckId, RiskContext, RiskFinding, RiskVerdict, Severity, Verdict};
