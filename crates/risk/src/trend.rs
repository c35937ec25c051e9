//! Direction rules: trade bias against sentiment and against OI activity.

use oipulse_core::{Bias, RiskConfig};
use oipulse_signals::ActivityLabel;

use crate::types::{CheckError, CheckId, RiskContext, RiskFinding, Severity};

const BOTH_TIMEFRAMES_RISK: u32 = 25;
const ONE_TIMEFRAME_RISK: u32 = 12;
const ACTIVITY_CONFLICT_RISK: u32 = 12;

/// Compares the trade bias with the daily and intraday sentiment biases.
pub fn check_trend_conflict(
    ctx: &RiskContext,
    _config: &RiskConfig,
) -> Result<RiskFinding, CheckError> {
    let sentiment = ctx.sentiment()?;
    let trade = ctx.trade_bias();

    let daily = trade.conflicts_with(sentiment.daily_bias);
    let intraday = trade.conflicts_with(sentiment.intraday_bias);

    let finding = match (daily, intraday) {
        (true, true) => RiskFinding::raised(
            CheckId::TrendConflict,
            Severity::Warning,
            BOTH_TIMEFRAMES_RISK,
            "Against the trend",
            format!(
                "A {trade} trade against {} daily ({:.0}) and {} intraday ({:.0}) sentiment.",
                sentiment.daily_bias,
                sentiment.daily.score,
                sentiment.intraday_bias,
                sentiment.intraday.score
            ),
        ),
        (true, false) | (false, true) => {
            let (frame, bias, score) = if daily {
                ("daily", sentiment.daily_bias, sentiment.daily.score)
            } else {
                ("intraday", sentiment.intraday_bias, sentiment.intraday.score)
            };
            RiskFinding::raised(
                CheckId::TrendConflict,
                Severity::Caution,
                ONE_TIMEFRAME_RISK,
                "Partly against the trend",
                format!("A {trade} trade against {bias} {frame} sentiment ({score:.0})."),
            )
        }
        (false, false) => RiskFinding::passed(
            CheckId::TrendConflict,
            format!(
                "A {trade} trade with {} daily and {} intraday sentiment.",
                sentiment.daily_bias, sentiment.intraday_bias
            ),
        ),
    };
    Ok(finding)
}

/// Compares the trade bias with the regime implied by the latest OI activity.
/// Consolidation, mixed and initializing regimes carry no bias and pass.
pub fn check_activity_conflict(
    ctx: &RiskContext,
    _config: &RiskConfig,
) -> Result<RiskFinding, CheckError> {
    let activity = ctx.activity()?;
    let implied = activity.implied_bias();

    if implied == Bias::Neutral {
        return Ok(RiskFinding::passed(
            CheckId::ActivityConflict,
            format!("{} carries no directional read.", activity.label),
        ));
    }

    let trade = ctx.trade_bias();
    if !trade.conflicts_with(implied) {
        return Ok(RiskFinding::passed(
            CheckId::ActivityConflict,
            format!("{} supports a {trade} trade.", activity.label),
        ));
    }

    let what = match activity.label {
        ActivityLabel::LongBuildup => "fresh longs are being added",
        ActivityLabel::ShortCovering => "shorts are covering",
        ActivityLabel::ShortBuildup => "fresh shorts are being added",
        ActivityLabel::LongUnwinding => "longs are unwinding",
        _ => "open interest points the other way",
    };

    Ok(RiskFinding::raised(
        CheckId::ActivityConflict,
        Severity::Caution,
        ACTIVITY_CONFLICT_RISK,
        format!("Trade against {}", activity.label),
        format!("A {trade} trade while {what} (strength {}/10).", activity.strength),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use oipulse_core::{MarketContext, OptionType, OrderRequest, TransactionType};
    use oipulse_signals::{classify, ActivityClassification, SentimentScorer};

    fn order(side: TransactionType, option_type: OptionType) -> OrderRequest {
        OrderRequest {
            tradingsymbol: "NIFTY24O1725000CE".to_string(),
            underlying: "NIFTY".to_string(),
            transaction_type: side,
            option_type: Some(option_type),
            strike: Some(25_000.0),
            quantity: 25,
        }
    }

    fn ctx(side: TransactionType, option_type: OptionType) -> RiskContext {
        RiskContext::new(
            order(side, option_type),
            NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(),
        )
    }

    fn bearish_sentiment() -> oipulse_signals::SentimentScore {
        // daily: 0.40*30 + 0.35*20 + 0.25*35 = 27.75; intraday pcr-only 35
        let context = MarketContext {
            vix: None,
            fii_net: Some(-900.0),
            dii_net: Some(100.0),
            technical_score: Some(20.0),
        };
        SentimentScorer::default().score(&context, 0.65, &[])
    }

    fn activity(label: ActivityLabel) -> ActivityClassification {
        ActivityClassification {
            label,
            strength: 7,
            ..classify_initial()
        }
    }

    fn classify_initial() -> ActivityClassification {
        let metrics = oipulse_signals::compute_metrics(
            &oipulse_core::OptionChainSnapshot {
                underlying: "NIFTY".to_string(),
                expiry: NaiveDate::from_ymd_opt(2024, 10, 17).unwrap(),
                spot: 25_000.0,
                legs: Vec::new(),
                captured_at: chrono::Utc::now(),
            },
            50.0,
        );
        classify(&metrics, None)
    }

    #[test]
    fn bullish_trade_against_both_timeframes() {
        let ctx = ctx(TransactionType::Buy, OptionType::Call).with_sentiment(bearish_sentiment());
        let finding = check_trend_conflict(&ctx, &RiskConfig::default()).unwrap();

        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.risk_score_contribution, 25);
    }

    #[test]
    fn bearish_trade_with_the_trend_passes() {
        let ctx = ctx(TransactionType::Buy, OptionType::Put).with_sentiment(bearish_sentiment());
        let finding = check_trend_conflict(&ctx, &RiskConfig::default()).unwrap();
        assert!(finding.is_passed());
    }

    #[test]
    fn one_timeframe_conflict_is_caution() {
        let mut sentiment = bearish_sentiment();
        sentiment.intraday_bias = Bias::Neutral;

        let ctx = ctx(TransactionType::Sell, OptionType::Put).with_sentiment(sentiment);
        let finding = check_trend_conflict(&ctx, &RiskConfig::default()).unwrap();

        assert_eq!(finding.severity, Severity::Caution);
        assert_eq!(finding.risk_score_contribution, 12);
        assert!(finding.detail.contains("daily"));
    }

    #[test]
    fn activity_conflict_follows_implied_bias() {
        let config = RiskConfig::default();

        let buying_calls_into_short_buildup = ctx(TransactionType::Buy, OptionType::Call)
            .with_activity(activity(ActivityLabel::ShortBuildup));
        let finding = check_activity_conflict(&buying_calls_into_short_buildup, &config).unwrap();
        assert_eq!(finding.risk_score_contribution, 12);

        let selling_puts_into_short_covering = ctx(TransactionType::Sell, OptionType::Put)
            .with_activity(activity(ActivityLabel::ShortCovering));
        assert!(check_activity_conflict(&selling_puts_into_short_covering, &config)
            .unwrap()
            .is_passed());
    }

    #[test]
    fn neutral_regimes_skip() {
        let config = RiskConfig::default();
        for label in [
            ActivityLabel::Consolidation,
            ActivityLabel::MixedSignals,
            ActivityLabel::Initializing,
        ] {
            let ctx = ctx(TransactionType::Buy, OptionType::Call).with_activity(activity(label));
            assert!(check_activity_conflict(&ctx, &config).unwrap().is_passed());
        }
    }

    #[test]
    fn missing_sentiment_is_an_error() {
        let ctx = ctx(TransactionType::Buy, OptionType::Call);
        assert_eq!(
            check_trend_conflict(&ctx, &RiskConfig::default()),
            Err(CheckError::MissingInput("sentiment"))
        );
    }
}
