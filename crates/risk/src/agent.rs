//! Runs every check against an order and aggregates the findings.

use oipulse_core::RiskConfig;

use crate::exposure;
use crate::market;
use crate::trend;
use crate::types::{CheckError, CheckId, RiskContext, RiskFinding, RiskVerdict};

type CheckFn = fn(&RiskContext, &RiskConfig) -> Result<RiskFinding, CheckError>;

/// Checks in report order.
const CHECKS: [(CheckId, CheckFn); 9] = [
    (CheckId::PositionCount, exposure::check_position_count),
    (CheckId::ExistingPosition, exposure::check_existing_position),
    (CheckId::DuplicateOrder, exposure::check_duplicate_order),
    (CheckId::TrendConflict, trend::check_trend_conflict),
    (CheckId::Volatility, market::check_volatility),
    (CheckId::PcrExtreme, market::check_pcr_extreme),
    (CheckId::OiWall, market::check_oi_wall),
    (CheckId::MaxPain, market::check_max_pain),
    (CheckId::ActivityConflict, trend::check_activity_conflict),
];

/// Deterministic pre-trade risk evaluation.
///
/// A check that cannot run is reported as passed and logged; partial data
/// never blocks an evaluation.
#[derive(Debug, Clone, Default)]
pub struct RiskAgent {
    config: RiskConfig,
}

impl RiskAgent {
    #[must_use]
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// One finding per check, in table order.
    #[must_use]
    pub fn evaluate(&self, ctx: &RiskContext) -> RiskVerdict {
        let findings = CHECKS
            .iter()
            .map(|&(id, check)| self.run_check(id, check, ctx))
            .collect();

        let verdict = RiskVerdict::from_findings(findings);

        tracing::info!(
            symbol = %ctx.order.tradingsymbol,
            side = ?ctx.order.transaction_type,
            score = verdict.aggregate_score,
            verdict = ?verdict.verdict,
            raised = verdict.raised().count(),
            "Order evaluated"
        );

        verdict
    }

    fn run_check(&self, id: CheckId, check: CheckFn, ctx: &RiskContext) -> RiskFinding {
        match check(ctx, &self.config) {
            Ok(finding) => finding,
            Err(e) => {
                tracing::warn!(
                    check = %id,
                    error = %e,
                    "Risk check could not run, treating as passed"
                );
                RiskFinding::not_evaluated(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Verdict;
    use chrono::NaiveDate;
    use oipulse_core::{OrderRequest, TransactionType};

    #[test]
    fn bare_context_is_clear_with_one_finding_per_check() {
        let order = OrderRequest {
            tradingsymbol: "INFY".to_string(),
            underlying: "INFY".to_string(),
            transaction_type: TransactionType::Buy,
            option_type: None,
            strike: None,
            quantity: 10,
        };
        let ctx = RiskContext::new(order, NaiveDate::from_ymd_opt(2024, 10, 14).unwrap());

        let verdict = RiskAgent::default().evaluate(&ctx);

        assert_eq!(verdict.aggregate_score, 0);
        assert_eq!(verdict.verdict, Verdict::Clear);
        let ids: Vec<_> = verdict.findings.iter().map(|f| f.check_id).collect();
        assert_eq!(ids, CheckId::ALL.to_vec());
        // PCR extreme passes as not applicable, the rest lack inputs.
        assert!(verdict.findings[0].title.contains("not evaluated"));
        assert!(verdict.findings[5].title.contains("OK"));
    }
}
