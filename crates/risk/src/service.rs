//! Advisor service: fetches inputs through the collaborator traits and runs
//! the pure metrics, sentiment and risk pipeline over them.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use oipulse_core::{
    AppConfig, CandleInterval, ExpiryKind, MarketContext, MarketDataSource, OptionChainSnapshot,
    OrderRequest,
};
use oipulse_signals::{
    advance, classify, compute_metrics, strike_window, PreviousState, PulseUpdate,
    SentimentScore, SentimentScorer, StateKey, StateStore,
};
use tracing::{info, warn};

use crate::agent::RiskAgent;
use crate::types::{RiskContext, RiskVerdict};

pub struct AdvisorService<S, T> {
    source: S,
    store: T,
    config: AppConfig,
    scorer: SentimentScorer,
    agent: RiskAgent,
}

impl<S, T> AdvisorService<S, T>
where
    S: MarketDataSource,
    T: StateStore,
{
    #[must_use]
    pub fn new(source: S, store: T, config: AppConfig) -> Self {
        let scorer = SentimentScorer::from_config(&config.market);
        let agent = RiskAgent::new(config.risk.clone());
        Self {
            source,
            store,
            config,
            scorer,
            agent,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn store(&self) -> &T {
        &self.store
    }

    /// Today in the market timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.scorer.timezone()).date_naive()
    }

    fn windowed(&self, snapshot: &OptionChainSnapshot) -> (OptionChainSnapshot, f64) {
        let gap = self.config.market.strike_gap_for(&snapshot.underlying);
        (
            strike_window(snapshot, gap, self.config.market.strike_window),
            gap,
        )
    }

    async fn load_previous(&self, key: &StateKey) -> Option<PreviousState> {
        match self.store.load(key).await {
            Ok(state) => state,
            Err(e) => {
                warn!(%key, error = %e, "Failed to load previous state, starting fresh");
                None
            }
        }
    }

    /// Fetches the chain, runs one previous-state cycle and stores the result.
    ///
    /// # Errors
    /// Returns an error if the option chain cannot be fetched. A failed save
    /// is logged and does not fail the cycle.
    pub async fn refresh_metrics(
        &self,
        underlying: &str,
        expiry_kind: ExpiryKind,
    ) -> Result<PulseUpdate> {
        let key = StateKey::new(underlying, expiry_kind);
        let snapshot = self
            .source
            .option_chain(&key.underlying, expiry_kind)
            .await
            .with_context(|| format!("fetching option chain for {key}"))?;

        let (snapshot, gap) = self.windowed(&snapshot);
        let previous = self.load_previous(&key).await;
        let (update, next) = advance(&snapshot, gap, previous);

        if let Err(e) = self.store.save(&key, &next).await {
            warn!(%key, error = %e, "Failed to save previous state");
        }

        info!(
            %key,
            pcr = update.metrics.pcr,
            max_pain = update.metrics.max_pain_strike,
            activity = %update.activity.label,
            new_alerts = update.new_alerts.len(),
            "Metrics refreshed"
        );
        Ok(update)
    }

    /// Scores daily and intraday sentiment for an underlying.
    ///
    /// # Errors
    /// Returns an error if the option chain cannot be fetched. Missing
    /// candles or market context only degrade the score.
    pub async fn score_sentiment(
        &self,
        underlying: &str,
        expiry_kind: ExpiryKind,
    ) -> Result<SentimentScore> {
        let (chain, candles, context) = tokio::join!(
            self.source.option_chain(underlying, expiry_kind),
            self.source.candles(underlying, CandleInterval::FiveMinute),
            self.source.market_context(),
        );

        let chain = chain.with_context(|| format!("fetching option chain for {underlying}"))?;
        let (chain, gap) = self.windowed(&chain);
        let pcr = compute_metrics(&chain, gap).pcr;

        let candles = candles.unwrap_or_else(|e| {
            warn!(underlying, error = %e, "Candle fetch failed, scoring without indicators");
            Vec::new()
        });
        let context = context.unwrap_or_else(|e| {
            warn!(error = %e, "Market context fetch failed, scoring without flows");
            MarketContext::default()
        });

        Ok(self.scorer.score(&context, pcr, &candles))
    }

    /// Evaluates an order as of the current market date.
    pub async fn evaluate_order(
        &self,
        order: &OrderRequest,
        expiry_kind: ExpiryKind,
    ) -> RiskVerdict {
        self.evaluate_order_at(order, expiry_kind, self.today()).await
    }

    /// Evaluates an order. Every fetch is fail-open: whatever could not be
    /// fetched is left out and the checks that need it pass.
    ///
    /// Activity is classified against the stored previous state, which is
    /// read but not advanced.
    pub async fn evaluate_order_at(
        &self,
        order: &OrderRequest,
        expiry_kind: ExpiryKind,
        today: NaiveDate,
    ) -> RiskVerdict {
        let key = StateKey::new(&order.underlying, expiry_kind);
        let (portfolio, chain, candles, context, previous) = tokio::join!(
            self.source.portfolio(),
            self.source.option_chain(&key.underlying, expiry_kind),
            self.source.candles(&key.underlying, CandleInterval::FiveMinute),
            self.source.market_context(),
            self.load_previous(&key),
        );

        let mut ctx = RiskContext::new(order.clone(), today)
            .with_index(self.config.market.is_index(&order.underlying));

        match portfolio {
            Ok(portfolio) => ctx = ctx.with_portfolio(portfolio),
            Err(e) => warn!(error = %e, "Portfolio fetch failed, exposure checks skipped"),
        }

        let context = match context {
            Ok(context) => {
                ctx = ctx.with_market(context.clone());
                context
            }
            Err(e) => {
                warn!(error = %e, "Market context fetch failed");
                MarketContext::default()
            }
        };

        let candles = candles.unwrap_or_else(|e| {
            warn!(%key, error = %e, "Candle fetch failed, intraday sentiment from PCR only");
            Vec::new()
        });

        match chain {
            Ok(chain) => {
                let (chain, gap) = self.windowed(&chain);
                let metrics = compute_metrics(&chain, gap);
                let previous_metrics = previous
                    .and_then(|p| p.metrics)
                    .filter(|p| p.expiry == metrics.expiry);
                let activity = classify(&metrics, previous_metrics.as_ref());
                let sentiment = self.scorer.score(&context, metrics.pcr, &candles);

                ctx = ctx
                    .with_activity(activity)
                    .with_sentiment(sentiment)
                    .with_metrics(metrics);
            }
            Err(e) => warn!(
                %key,
                error = %e,
                "Option chain fetch failed, chain-based checks skipped"
            ),
        }

        self.agent.evaluate(&ctx)
    }
}
