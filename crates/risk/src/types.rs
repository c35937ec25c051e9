//! Types for pre-trade risk evaluation.

use chrono::NaiveDate;
use oipulse_core::{Bias, MarketContext, OrderRequest, PortfolioSnapshot};
use oipulse_signals::{ActivityClassification, OptionMetrics, SentimentScore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One rule in the check table. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    PositionCount,
    ExistingPosition,
    DuplicateOrder,
    TrendConflict,
    Volatility,
    PcrExtreme,
    OiWall,
    MaxPain,
    ActivityConflict,
}

impl CheckId {
    pub const ALL: [Self; 9] = [
        Self::PositionCount,
        Self::ExistingPosition,
        Self::DuplicateOrder,
        Self::TrendConflict,
        Self::Volatility,
        Self::PcrExtreme,
        Self::OiWall,
        Self::MaxPain,
        Self::ActivityConflict,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PositionCount => "Position count",
            Self::ExistingPosition => "Existing position",
            Self::DuplicateOrder => "Duplicate order",
            Self::TrendConflict => "Trend conflict",
            Self::Volatility => "Volatility",
            Self::PcrExtreme => "PCR extreme",
            Self::OiWall => "OI wall",
            Self::MaxPain => "Max pain",
            Self::ActivityConflict => "Activity conflict",
        }
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered from harmless to serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Passed,
    Info,
    Caution,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFinding {
    pub check_id: CheckId,
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    pub risk_score_contribution: u32,
}

impl RiskFinding {
    #[must_use]
    pub fn passed(check_id: CheckId, detail: impl Into<String>) -> Self {
        Self {
            check_id,
            severity: Severity::Passed,
            title: format!("{} OK", check_id.label()),
            detail: detail.into(),
            risk_score_contribution: 0,
        }
    }

    /// Placeholder for a check that could not run.
    #[must_use]
    pub fn not_evaluated(check_id: CheckId) -> Self {
        Self {
            check_id,
            severity: Severity::Passed,
            title: format!("{} not evaluated", check_id.label()),
            detail: "Insufficient data for this check.".to_string(),
            risk_score_contribution: 0,
        }
    }

    #[must_use]
    pub fn raised(
        check_id: CheckId,
        severity: Severity,
        contribution: u32,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            check_id,
            severity,
            title: title.into(),
            detail: detail.into(),
            risk_score_contribution: contribution,
        }
    }

    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.severity == Severity::Passed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Clear,
    Caution,
    Warning,
    Danger,
}

impl Verdict {
    /// 0 is clear, below 20 caution, below 45 warning, anything else danger.
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        match score {
            0 => Self::Clear,
            1..=19 => Self::Caution,
            20..=44 => Self::Warning,
            _ => Self::Danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskVerdict {
    /// Sum of contributions. Not clamped.
    pub aggregate_score: u32,
    pub verdict: Verdict,
    pub findings: Vec<RiskFinding>,
}

impl RiskVerdict {
    #[must_use]
    pub fn from_findings(findings: Vec<RiskFinding>) -> Self {
        let aggregate_score = findings
            .iter()
            .filter(|f| !f.is_passed())
            .map(|f| f.risk_score_contribution)
            .sum();
        Self {
            aggregate_score,
            verdict: Verdict::from_score(aggregate_score),
            findings,
        }
    }

    /// Findings that raised something.
    pub fn raised(&self) -> impl Iterator<Item = &RiskFinding> {
        self.findings.iter().filter(|f| !f.is_passed())
    }
}

/// Everything a check may look at. Any input can be missing; checks that
/// need it report [`CheckError::MissingInput`].
#[derive(Debug, Clone)]
pub struct RiskContext {
    pub order: OrderRequest,
    pub today: NaiveDate,
    /// Underlying is an index, so index-only checks apply.
    pub is_index: bool,
    pub portfolio: Option<PortfolioSnapshot>,
    pub metrics: Option<OptionMetrics>,
    pub activity: Option<ActivityClassification>,
    pub sentiment: Option<SentimentScore>,
    pub market: Option<MarketContext>,
}

impl RiskContext {
    #[must_use]
    pub fn new(order: OrderRequest, today: NaiveDate) -> Self {
        Self {
            order,
            today,
            is_index: false,
            portfolio: None,
            metrics: None,
            activity: None,
            sentiment: None,
            market: None,
        }
    }

    #[must_use]
    pub fn with_index(mut self, is_index: bool) -> Self {
        self.is_index = is_index;
        self
    }

    #[must_use]
    pub fn with_portfolio(mut self, portfolio: PortfolioSnapshot) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: OptionMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn with_activity(mut self, activity: ActivityClassification) -> Self {
        self.activity = Some(activity);
        self
    }

    #[must_use]
    pub fn with_sentiment(mut self, sentiment: SentimentScore) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    #[must_use]
    pub fn with_market(mut self, market: MarketContext) -> Self {
        self.market = Some(market);
        self
    }

    /// Direction the order adds to the book.
    #[must_use]
    pub fn trade_bias(&self) -> Bias {
        Bias::of_trade(
            self.order.transaction_type,
            self.order.resolved_option_type(),
        )
    }

    pub(crate) fn portfolio(&self) -> Result<&PortfolioSnapshot, CheckError> {
        self.portfolio
            .as_ref()
            .ok_or(CheckError::MissingInput("portfolio"))
    }

    /// Metrics for the order's underlying with a usable spot.
    pub(crate) fn metrics(&self) -> Result<&OptionMetrics, CheckError> {
        let metrics = self
            .metrics
            .as_ref()
            .ok_or(CheckError::MissingInput("option metrics"))?;

        if !metrics
            .underlying
            .eq_ignore_ascii_case(&self.order.underlying)
        {
            return Err(CheckError::InvalidInput(format!(
                "metrics are for {}, order is on {}",
                metrics.underlying, self.order.underlying
            )));
        }
        if metrics.spot <= 0.0 {
            return Err(CheckError::InvalidInput(format!(
                "non-positive spot {}",
                metrics.spot
            )));
        }
        Ok(metrics)
    }

    pub(crate) fn sentiment(&self) -> Result<&SentimentScore, CheckError> {
        self.sentiment
            .as_ref()
            .ok_or(CheckError::MissingInput("sentiment"))
    }

    pub(crate) fn activity(&self) -> Result<&ActivityClassification, CheckError> {
        self.activity
            .as_ref()
            .ok_or(CheckError::MissingInput("activity"))
    }

    pub(crate) fn vix(&self) -> Result<f64, CheckError> {
        self.market
            .as_ref()
            .and_then(|m| m.vix)
            .ok_or(CheckError::MissingInput("vix"))
    }
}

/// Why a check could not produce a finding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_bands() {
        assert_eq!(Verdict::from_score(0), Verdict::Clear);
        assert_eq!(Verdict::from_score(19), Verdict::Caution);
        assert_eq!(Verdict::from_score(20), Verdict::Warning);
        assert_eq!(Verdict::from_score(44), Verdict::Warning);
        assert_eq!(Verdict::from_score(45), Verdict::Danger);
        assert_eq!(Verdict::from_score(140), Verdict::Danger);
    }

    #[test]
    fn aggregate_ignores_passed_and_is_unclamped() {
        let mut findings: Vec<_> = CheckId::ALL
            .iter()
            .map(|&id| RiskFinding::raised(id, Severity::Warning, 25, "x", "y"))
            .collect();
        findings.push(RiskFinding {
            risk_score_contribution: 99,
            ..RiskFinding::passed(CheckId::MaxPain, "ok")
        });

        let verdict = RiskVerdict::from_findings(findings);
        assert_eq!(verdict.aggregate_score, 225);
        assert_eq!(verdict.verdict, Verdict::Danger);
        assert_eq!(verdict.raised().count(), 9);
    }

    #[test]
    fn findings_serialize_camel_case() {
        let finding = RiskFinding::raised(CheckId::OiWall, Severity::Warning, 15, "t", "d");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["checkId"], "oi_wall");
        assert_eq!(json["riskScoreContribution"], 15);
    }
}
