pub mod decisions;

pub use decisions::*;

use std::sync::Arc;

use analysis_core::{
    AnalysisError, Classification, Decision, DecisionStore, FundamentalDataProvider,
    FundamentalReport, FundamentalSnapshot, Holding, HoldingsProvider, IndicatorSet,
    MarketContextProvider, PositionRecommendation, PriceHistoryProvider, PricePoint,
    SeriesAnalysis, SkippedInstrument, TimeHorizon, TimeSeriesSnapshot,
};
use chrono::Utc;
use fundamental_analysis::FundamentalScorer;
use position_classification::PositionClassifier;
use position_recommendation::{RecommendationEngine, RecommendationInputs};
use technical_analysis::IndicatorEngine;
use timeseries_analysis::{
    build_daily_series, build_monthly_series, build_weekly_series, TrendRiskAnalyzer,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Series window sizes per horizon, back-periods plus today
const DAILY_PERIODS: usize = 30;
const WEEKLY_PERIODS: usize = 12;
const MONTHLY_PERIODS: usize = 6;

/// Window used when evaluating a single instrument's lifecycle
const RECOMMENDATION_PERIODS: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct DecisionEngineConfig {
    /// Concurrent per-instrument pipelines during decision generation
    pub worker_limit: usize,
    /// Trading days of history requested from the price provider
    pub history_days: u32,
}

impl Default for DecisionEngineConfig {
    fn default() -> Self {
        Self {
            worker_limit: 8,
            history_days: 365,
        }
    }
}

/// Owns the collaborator handles and the stage engines; every entry point of
/// the analysis core hangs off this type.
pub struct DecisionEngine {
    prices: Arc<dyn PriceHistoryProvider>,
    fundamentals: Arc<dyn FundamentalDataProvider>,
    market: Arc<dyn MarketContextProvider>,
    holdings: Arc<dyn HoldingsProvider>,
    store: Arc<dyn DecisionStore>,
    indicator_engine: IndicatorEngine,
    fundamental_scorer: FundamentalScorer,
    classifier: PositionClassifier,
    trend_analyzer: TrendRiskAnalyzer,
    recommender: RecommendationEngine,
    config: DecisionEngineConfig,
}

impl DecisionEngine {
    pub fn new(
        prices: Arc<dyn PriceHistoryProvider>,
        fundamentals: Arc<dyn FundamentalDataProvider>,
        market: Arc<dyn MarketContextProvider>,
        holdings: Arc<dyn HoldingsProvider>,
        store: Arc<dyn DecisionStore>,
    ) -> Self {
        Self {
            prices,
            fundamentals,
            market,
            holdings,
            store,
            indicator_engine: IndicatorEngine::new(),
            fundamental_scorer: FundamentalScorer::new(),
            classifier: PositionClassifier::new(),
            trend_analyzer: TrendRiskAnalyzer::new(),
            recommender: RecommendationEngine::new(),
            config: DecisionEngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DecisionEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Price series to indicator snapshot
    pub fn compute_indicators(&self, prices: &[PricePoint]) -> Result<IndicatorSet, AnalysisError> {
        self.indicator_engine.compute(prices)
    }

    /// Fundamental snapshot to scored report
    pub fn compute_fundamental_report(
        &self,
        snapshot: &FundamentalSnapshot,
    ) -> Result<FundamentalReport, AnalysisError> {
        self.fundamental_scorer.score(snapshot)
    }

    /// Snapshot window to trend/risk verdict
    pub fn analyze_time_series(
        &self,
        snapshots: &[TimeSeriesSnapshot],
    ) -> Result<SeriesAnalysis, AnalysisError> {
        self.trend_analyzer.analyze(snapshots)
    }

    /// Classify one instrument at its current price
    pub async fn classify_position(
        &self,
        stock_code: &str,
        current_price: f64,
    ) -> Result<Classification, AnalysisError> {
        let history = self.prices.history(stock_code, self.config.history_days).await?;
        let indicators = self.indicator_engine.compute(&history)?;

        let snapshot = self
            .fundamentals
            .fundamentals(stock_code)
            .await?
            .ok_or_else(|| {
                AnalysisError::InsufficientData(format!(
                    "no fundamental snapshot for {}",
                    stock_code
                ))
            })?;
        let report = self.fundamental_scorer.score(&snapshot)?;
        let market_score = self.market.market_score(stock_code).await?;

        Ok(self
            .classifier
            .classify(&indicators, &report, market_score, current_price))
    }

    /// Full per-instrument pipeline: indicators, fundamentals, series window,
    /// holding state, lifecycle recommendation
    pub async fn recommend_position(
        &self,
        user_id: &str,
        stock_code: &str,
    ) -> Result<PositionRecommendation, AnalysisError> {
        let history = self.prices.history(stock_code, self.config.history_days).await?;
        let indicators = self.indicator_engine.compute(&history)?;

        let snapshot = self
            .fundamentals
            .fundamentals(stock_code)
            .await?
            .ok_or_else(|| {
                AnalysisError::InsufficientData(format!(
                    "no fundamental snapshot for {}",
                    stock_code
                ))
            })?;
        let report = self.fundamental_scorer.score(&snapshot)?;
        let market_score = self.market.market_score(stock_code).await?;
        let holding = self.holdings.position(user_id, stock_code).await?;

        let series =
            build_daily_series(&history, &report, market_score, RECOMMENDATION_PERIODS)?;

        let last = history
            .last()
            .ok_or_else(|| AnalysisError::InsufficientData("empty price history".into()))?;
        let stock_name = holding
            .as_ref()
            .map(|h| h.stock_name.clone())
            .unwrap_or_else(|| stock_code.to_string());

        Ok(self.recommender.recommend(&RecommendationInputs {
            stock_code,
            stock_name: &stock_name,
            current_price: last.close,
            indicators: &indicators,
            report: &report,
            series: &series,
            market_score,
            holding: holding.as_ref(),
            as_of: last.date,
        }))
    }

    /// Fan-in over the whole portfolio into one decision artifact. Instrument
    /// pipelines run concurrently under the worker limit; a failing
    /// instrument is recorded and excluded, never aborting the rest.
    pub async fn generate_decision(
        &self,
        user_id: &str,
        time_horizon: TimeHorizon,
    ) -> Result<Decision, AnalysisError> {
        let positions = self.holdings.positions(user_id).await?;
        if positions.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "user {} holds no positions",
                user_id
            )));
        }

        tracing::info!(
            user_id,
            positions = positions.len(),
            horizon = ?time_horizon,
            "generating portfolio decision"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.worker_limit.max(1)));
        let mut tasks = JoinSet::new();

        for holding in positions {
            let prices = Arc::clone(&self.prices);
            let fundamentals = Arc::clone(&self.fundamentals);
            let market = Arc::clone(&self.market);
            let semaphore = Arc::clone(&semaphore);
            let history_days = self.config.history_days;

            tasks.spawn(async move {
                let stock_code = holding.stock_code.clone();
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        stock_code,
                        Err(AnalysisError::DependencyUnavailable(
                            "worker pool closed".into(),
                        )),
                    );
                };
                let result = analyze_holding(
                    prices,
                    fundamentals,
                    market,
                    holding,
                    time_horizon,
                    history_days,
                )
                .await;
                (stock_code, result)
            });
        }

        let mut analyses = Vec::new();
        let mut skipped = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(analysis))) => analyses.push(analysis),
                Ok((stock_code, Err(error))) => {
                    tracing::warn!(%stock_code, %error, "instrument skipped in decision run");
                    skipped.push(SkippedInstrument {
                        stock_code,
                        reason: error.to_string(),
                    });
                }
                Err(error) => {
                    tracing::warn!(%error, "instrument analysis task failed");
                }
            }
        }

        // tasks complete in arbitrary order; a fixed order keeps repeated
        // runs over identical inputs byte-for-byte comparable
        analyses.sort_by(|a, b| a.holding.stock_code.cmp(&b.holding.stock_code));
        skipped.sort_by(|a, b| a.stock_code.cmp(&b.stock_code));

        let position_decisions: Vec<_> =
            analyses.iter().map(single_position_decision).collect();
        let adjustment = portfolio_adjustment(&position_decisions);
        let assessment = overall_assessment(&position_decisions, &analyses);
        let steps = next_steps(&position_decisions, &adjustment);

        let timestamp = Utc::now();
        let decision = Decision {
            decision_id: format!("decision-{}", timestamp.timestamp_millis()),
            user_id: user_id.to_string(),
            timestamp,
            time_horizon,
            overall_assessment: assessment,
            position_decisions,
            portfolio_adjustment: adjustment,
            next_steps: steps,
            skipped_instruments: skipped,
        };

        self.store.save(&decision).await?;
        tracing::info!(decision_id = %decision.decision_id, "decision generated");
        Ok(decision)
    }
}

/// Per-instrument pipeline used by the portfolio fan-out
async fn analyze_holding(
    prices: Arc<dyn PriceHistoryProvider>,
    fundamentals: Arc<dyn FundamentalDataProvider>,
    market: Arc<dyn MarketContextProvider>,
    holding: Holding,
    time_horizon: TimeHorizon,
    history_days: u32,
) -> Result<PositionAnalysis, AnalysisError> {
    let stock_code = holding.stock_code.clone();

    let history = prices.history(&stock_code, history_days).await?;
    let indicators = IndicatorEngine::new().compute(&history)?;

    let snapshot = fundamentals.fundamentals(&stock_code).await?.ok_or_else(|| {
        AnalysisError::InsufficientData(format!("no fundamental snapshot for {}", stock_code))
    })?;
    let report = FundamentalScorer::new().score(&snapshot)?;
    let market_score = market.market_score(&stock_code).await?;

    let series = match time_horizon {
        TimeHorizon::Daily => build_daily_series(&history, &report, market_score, DAILY_PERIODS)?,
        TimeHorizon::Weekly => {
            build_weekly_series(&history, &report, market_score, WEEKLY_PERIODS)?
        }
        TimeHorizon::Monthly => {
            build_monthly_series(&history, &report, market_score, MONTHLY_PERIODS)?
        }
    };
    let series_analysis = TrendRiskAnalyzer::new().analyze(&series)?;

    let classification = PositionClassifier::new().classify(
        &indicators,
        &report,
        market_score,
        holding.current_price,
    );

    Ok(PositionAnalysis {
        holding,
        classification,
        series: series_analysis,
    })
}
