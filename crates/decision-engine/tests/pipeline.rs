//! End-to-end pipeline tests over the deterministic in-memory providers.

use std::sync::Arc;

use analysis_core::stub::{
    FixedMarketContext, InMemoryDecisionStore, InMemoryHoldings, StaticFundamentalsProvider,
    StaticHistoryProvider,
};
use analysis_core::{
    AnalysisError, DecisionStore, FundamentalSnapshot, Holding, PositionAction, PositionCategory,
    PricePoint, RecommendedPosition, TimeHorizon,
};
use chrono::NaiveDate;
use decision_engine::{DecisionEngine, DecisionEngineConfig};

fn history(closes: impl Iterator<Item = f64>) -> Vec<PricePoint> {
    closes
        .enumerate()
        .map(|(i, close)| PricePoint {
            date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0,
            turnover: close * 1_000_000.0,
        })
        .collect()
}

fn flat_history(days: usize, price: f64) -> Vec<PricePoint> {
    let mut points = history(std::iter::repeat(price).take(days));
    for p in &mut points {
        p.high = price;
        p.low = price;
    }
    points
}

fn strong_snapshot() -> FundamentalSnapshot {
    FundamentalSnapshot {
        pe: 8.0,
        pb: 0.9,
        roe: 22.0,
        revenue: 100.0,
        net_profit: 18.0,
        total_assets: 100.0,
        total_liabilities: 15.0,
        gross_margin: 45.0,
        operating_margin: 25.0,
        current_ratio: 2.5,
        quick_ratio: 1.8,
        interest_coverage: 8.0,
        dividend_yield: 2.0,
        revenue_growth: 10.0,
        profit_growth: 10.0,
        asset_growth: 8.0,
        equity_growth: 9.0,
        market_cap: None,
    }
}

fn holding(code: &str, name: &str, price: f64) -> Holding {
    Holding {
        stock_code: code.to_string(),
        stock_name: name.to_string(),
        quantity: 1000.0,
        average_price: price * 0.9,
        current_price: price,
        category: Some(RecommendedPosition::Left),
    }
}

fn engine_with_portfolio() -> (DecisionEngine, Arc<InMemoryDecisionStore>) {
    let prices = StaticHistoryProvider::new()
        .with_history("600036", flat_history(400, 10.0))
        .with_history("600519", history((0..400).map(|i| 50.0 + i as f64 * 0.5)));
    // "000001" gets no history on purpose

    let fundamentals = StaticFundamentalsProvider::new()
        .with_snapshot("600036", strong_snapshot())
        .with_snapshot("600519", strong_snapshot())
        .with_snapshot("000001", strong_snapshot());

    let holdings = InMemoryHoldings::new()
        .with_position("u1", holding("600036", "Example Bank", 10.0))
        .with_position("u1", holding("600519", "Example Distillery", 249.5))
        .with_position("u1", holding("000001", "Missing History Co", 12.0));

    let store = Arc::new(InMemoryDecisionStore::new());
    let engine = DecisionEngine::new(
        Arc::new(prices),
        Arc::new(fundamentals),
        Arc::new(FixedMarketContext::new(70.0)),
        Arc::new(holdings),
        Arc::clone(&store) as Arc<dyn DecisionStore>,
    );
    (engine, store)
}

#[tokio::test]
async fn decision_covers_healthy_instruments_and_reports_skips() {
    let (engine, store) = engine_with_portfolio();

    let decision = engine.generate_decision("u1", TimeHorizon::Daily).await.unwrap();

    assert_eq!(decision.position_decisions.len(), 2);
    assert_eq!(decision.skipped_instruments.len(), 1);
    assert_eq!(decision.skipped_instruments[0].stock_code, "000001");
    assert!(decision.skipped_instruments[0].reason.contains("Insufficient"));

    // persisted through the store and loadable by id
    assert_eq!(store.len(), 1);
    let loaded = store.load(&decision.decision_id).await.unwrap();
    assert_eq!(loaded, decision);
}

#[tokio::test]
async fn repeated_generation_is_idempotent_up_to_ids() {
    let (engine, _store) = engine_with_portfolio();

    let first = engine.generate_decision("u1", TimeHorizon::Daily).await.unwrap();
    let second = engine.generate_decision("u1", TimeHorizon::Daily).await.unwrap();

    assert_eq!(first.overall_assessment, second.overall_assessment);
    assert_eq!(first.portfolio_adjustment, second.portfolio_adjustment);
    assert_eq!(first.position_decisions, second.position_decisions);
    assert_eq!(first.next_steps, second.next_steps);
}

#[tokio::test]
async fn decision_round_trips_through_serde() {
    let (engine, _store) = engine_with_portfolio();

    let decision = engine.generate_decision("u1", TimeHorizon::Weekly).await.unwrap();
    let json = serde_json::to_string(&decision).unwrap();
    let back: analysis_core::Decision = serde_json::from_str(&json).unwrap();
    assert_eq!(back, decision);

    // enumeration wire values stay lowercase
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["timeHorizon"], "weekly");
}

#[tokio::test]
async fn flat_instrument_classifies_left_for_staged_entry() {
    let (engine, _store) = engine_with_portfolio();

    let classification = engine.classify_position("600036", 10.0).await.unwrap();

    assert_eq!(classification.category, PositionCategory::Left);
    assert!(classification.reasoning.len() >= 2);
    assert!(!classification.recommendations.is_empty());

    let json = serde_json::to_string(&classification).unwrap();
    let back: analysis_core::Classification = serde_json::from_str(&json).unwrap();
    assert_eq!(back, classification);
}

#[tokio::test]
async fn recommendation_for_unheld_flat_instrument_waits() {
    let (engine, _store) = engine_with_portfolio();

    let recommendation = engine.recommend_position("nobody", "600036").await.unwrap();

    assert!(!recommendation.current_status.is_held);
    assert_eq!(recommendation.recommendation.action, PositionAction::Hold);
    assert_eq!(recommendation.recommended_position, RecommendedPosition::Exit);
    assert!(recommendation.time_nodes.build_left.is_empty());

    let json = serde_json::to_string(&recommendation).unwrap();
    let back: analysis_core::PositionRecommendation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, recommendation);
}

#[tokio::test]
async fn indicator_set_round_trips_through_serde() {
    let (engine, _store) = engine_with_portfolio();
    let prices = flat_history(300, 10.0);

    let set = engine.compute_indicators(&prices).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    let back: analysis_core::IndicatorSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
}

#[tokio::test]
async fn unknown_instrument_fails_classification_explicitly() {
    let (engine, _store) = engine_with_portfolio();

    let error = engine.classify_position("999999", 10.0).await.unwrap_err();
    assert!(matches!(error, AnalysisError::InsufficientData(_)));
}

#[tokio::test]
async fn empty_portfolio_is_an_explicit_error() {
    let (engine, _store) = engine_with_portfolio();

    let error = engine
        .generate_decision("no-such-user", TimeHorizon::Daily)
        .await
        .unwrap_err();
    assert!(matches!(error, AnalysisError::InsufficientData(_)));
}

#[tokio::test]
async fn worker_limit_of_one_still_covers_the_portfolio() {
    let (engine, _store) = engine_with_portfolio();
    let engine = engine.with_config(DecisionEngineConfig {
        worker_limit: 1,
        history_days: 365,
    });

    let decision = engine.generate_decision("u1", TimeHorizon::Daily).await.unwrap();
    assert_eq!(decision.position_decisions.len(), 2);
}
