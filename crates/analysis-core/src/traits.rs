use crate::{AnalysisError, Decision, FundamentalSnapshot, Holding, PricePoint};
use async_trait::async_trait;

/// Price history source. May return fewer points than requested; the engines
/// decide whether what came back is enough.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn history(&self, stock_code: &str, days: u32) -> Result<Vec<PricePoint>, AnalysisError>;
}

/// Fundamental snapshot source
#[async_trait]
pub trait FundamentalDataProvider: Send + Sync {
    async fn fundamentals(
        &self,
        stock_code: &str,
    ) -> Result<Option<FundamentalSnapshot>, AnalysisError>;
}

/// Market context (sector strength, money flow) condensed to a 0-100 score
#[async_trait]
pub trait MarketContextProvider: Send + Sync {
    async fn market_score(&self, stock_code: &str) -> Result<f64, AnalysisError>;
}

/// Current holdings for a user
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    async fn position(
        &self,
        user_id: &str,
        stock_code: &str,
    ) -> Result<Option<Holding>, AnalysisError>;

    async fn positions(&self, user_id: &str) -> Result<Vec<Holding>, AnalysisError>;
}

/// Write-once store for generated decisions
#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn save(&self, decision: &Decision) -> Result<(), AnalysisError>;

    async fn load(&self, decision_id: &str) -> Result<Decision, AnalysisError>;
}
