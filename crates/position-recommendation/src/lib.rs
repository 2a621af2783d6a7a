pub mod assessment;
pub mod strategy;

pub use assessment::{Assessment, AssessmentWeights, OpportunityLevel, TrendPhase};
pub use strategy::{held_rules, not_held_rules, StrategyInput, StrategyRule, StrategyVerdict};

use analysis_core::{
    FundamentalReport, Holding, HoldingStatus, IndicatorSet, PositionRecommendation,
    TimeSeriesSnapshot,
};
use chrono::NaiveDate;

/// Everything the engine needs to evaluate one instrument
pub struct RecommendationInputs<'a> {
    pub stock_code: &'a str,
    pub stock_name: &'a str,
    pub current_price: f64,
    pub indicators: &'a IndicatorSet,
    pub report: &'a FundamentalReport,
    pub series: &'a [TimeSeriesSnapshot],
    pub market_score: f64,
    pub holding: Option<&'a Holding>,
    /// Evaluation date; all generated trigger dates are offsets from it
    pub as_of: NaiveDate,
}

/// Per-instrument state evaluator: assessment, lifecycle transition, sizing,
/// risk ladder, time-gated triggers, and a forward view
pub struct RecommendationEngine {
    weights: AssessmentWeights,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            weights: AssessmentWeights::default(),
        }
    }

    pub fn with_weights(weights: AssessmentWeights) -> Self {
        Self { weights }
    }

    pub fn recommend(&self, inputs: &RecommendationInputs) -> PositionRecommendation {
        let assessment = assessment::assess(
            inputs.indicators,
            inputs.report,
            inputs.series,
            inputs.market_score,
            self.weights,
        );

        let verdict = strategy::position_strategy(&assessment, inputs.holding);
        let time_nodes = strategy::time_nodes(
            &assessment,
            inputs.holding.is_some(),
            inputs.current_price,
            inputs.as_of,
        );
        let position_size = strategy::position_sizing(&assessment);
        let risk_control = strategy::risk_control(inputs.current_price);
        let prediction = strategy::prediction(inputs.indicators, inputs.report, inputs.as_of);

        PositionRecommendation {
            stock_code: inputs.stock_code.to_string(),
            stock_name: inputs.stock_name.to_string(),
            recommended_position: verdict.position,
            current_status: HoldingStatus {
                is_held: inputs.holding.is_some(),
                quantity: inputs.holding.map(|h| h.quantity),
                average_price: inputs.holding.map(|h| h.average_price),
                current_price: inputs.current_price,
            },
            recommendation: verdict.advice,
            time_nodes,
            position_size,
            risk_control,
            prediction,
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}
