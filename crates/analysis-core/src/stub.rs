//! Deterministic in-memory providers.
//!
//! These are the test doubles for the collaborator interfaces in
//! [`crate::traits`]; real integrations (market data feeds, databases) live
//! outside this workspace and implement the same traits.

use crate::{
    AnalysisError, Decision, DecisionStore, FundamentalDataProvider, FundamentalSnapshot, Holding,
    HoldingsProvider, MarketContextProvider, PriceHistoryProvider, PricePoint,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Price history served from a fixed per-instrument table
#[derive(Debug, Default)]
pub struct StaticHistoryProvider {
    histories: HashMap<String, Vec<PricePoint>>,
}

impl StaticHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, stock_code: &str, points: Vec<PricePoint>) -> Self {
        self.histories.insert(stock_code.to_string(), points);
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for StaticHistoryProvider {
    async fn history(&self, stock_code: &str, days: u32) -> Result<Vec<PricePoint>, AnalysisError> {
        let points = self.histories.get(stock_code).cloned().unwrap_or_default();
        let keep = days as usize;
        if points.len() > keep {
            Ok(points[points.len() - keep..].to_vec())
        } else {
            Ok(points)
        }
    }
}

/// Fundamental snapshots served from a fixed per-instrument table
#[derive(Debug, Default)]
pub struct StaticFundamentalsProvider {
    snapshots: HashMap<String, FundamentalSnapshot>,
}

impl StaticFundamentalsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, stock_code: &str, snapshot: FundamentalSnapshot) -> Self {
        self.snapshots.insert(stock_code.to_string(), snapshot);
        self
    }
}

#[async_trait]
impl FundamentalDataProvider for StaticFundamentalsProvider {
    async fn fundamentals(
        &self,
        stock_code: &str,
    ) -> Result<Option<FundamentalSnapshot>, AnalysisError> {
        Ok(self.snapshots.get(stock_code).cloned())
    }
}

/// Market context pinned to one score for every instrument
#[derive(Debug, Clone, Copy)]
pub struct FixedMarketContext {
    score: f64,
}

impl FixedMarketContext {
    pub fn new(score: f64) -> Self {
        Self {
            score: score.clamp(0.0, 100.0),
        }
    }
}

#[async_trait]
impl MarketContextProvider for FixedMarketContext {
    async fn market_score(&self, _stock_code: &str) -> Result<f64, AnalysisError> {
        Ok(self.score)
    }
}

/// Holdings served from a fixed per-user table
#[derive(Debug, Default)]
pub struct InMemoryHoldings {
    rows: HashMap<String, Vec<Holding>>,
}

impl InMemoryHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, user_id: &str, holding: Holding) -> Self {
        self.rows.entry(user_id.to_string()).or_default().push(holding);
        self
    }
}

#[async_trait]
impl HoldingsProvider for InMemoryHoldings {
    async fn position(
        &self,
        user_id: &str,
        stock_code: &str,
    ) -> Result<Option<Holding>, AnalysisError> {
        Ok(self
            .rows
            .get(user_id)
            .and_then(|rows| rows.iter().find(|h| h.stock_code == stock_code))
            .cloned())
    }

    async fn positions(&self, user_id: &str) -> Result<Vec<Holding>, AnalysisError> {
        Ok(self.rows.get(user_id).cloned().unwrap_or_default())
    }
}

/// Decision store backed by a mutex-guarded map
#[derive(Debug, Default)]
pub struct InMemoryDecisionStore {
    decisions: Mutex<HashMap<String, Decision>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.decisions.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DecisionStore for InMemoryDecisionStore {
    async fn save(&self, decision: &Decision) -> Result<(), AnalysisError> {
        let mut decisions = self
            .decisions
            .lock()
            .map_err(|_| AnalysisError::DependencyUnavailable("decision store poisoned".into()))?;
        decisions.insert(decision.decision_id.clone(), decision.clone());
        Ok(())
    }

    async fn load(&self, decision_id: &str) -> Result<Decision, AnalysisError> {
        let decisions = self
            .decisions
            .lock()
            .map_err(|_| AnalysisError::DependencyUnavailable("decision store poisoned".into()))?;
        decisions.get(decision_id).cloned().ok_or_else(|| {
            AnalysisError::DependencyUnavailable(format!("decision {} not found", decision_id))
        })
    }
}
