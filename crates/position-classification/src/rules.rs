//! Category cascade as an ordered decision table. Rules are evaluated top to
//! bottom and the first match wins; the last rule matches everything, so the
//! cascade is exhaustive.

use analysis_core::{
    AdviceAction, PositionCategory, Rating, TradeAdvice, TrendDirection,
};

/// Inputs the cascade branches on
#[derive(Debug, Clone, Copy)]
pub struct RuleInput {
    pub overall: f64,
    pub trend: TrendDirection,
    pub rating: Rating,
    pub dividend_yield: f64,
    pub support: f64,
    pub resistance: f64,
}

/// One cascade branch's outcome
#[derive(Debug, Clone)]
pub struct CategoryVerdict {
    pub category: PositionCategory,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub recommendations: Vec<TradeAdvice>,
}

/// One branch of the cascade
pub struct CategoryRule {
    pub name: &'static str,
    pub matches: fn(&RuleInput) -> bool,
    pub build: fn(&RuleInput) -> CategoryVerdict,
}

/// The cascade, in evaluation order
pub fn category_rules() -> &'static [CategoryRule] {
    &RULES
}

static RULES: [CategoryRule; 4] = [
    CategoryRule {
        name: "right",
        matches: |input| {
            input.overall >= 80.0 && input.trend == TrendDirection::Up && input.rating == Rating::A
        },
        build: |input| CategoryVerdict {
            category: PositionCategory::Right,
            confidence: 90.0,
            reasoning: vec![
                "Strong technical picture with the trend pointing up".to_string(),
                "Excellent fundamentals at a reasonable valuation".to_string(),
                "Market action confirms the move".to_string(),
            ],
            recommendations: vec![TradeAdvice {
                action: AdviceAction::Buy,
                reason: "Technical breakout with fundamental support".to_string(),
                target_price: Some(input.resistance * 1.1),
                stop_loss: None,
            }],
        },
    },
    CategoryRule {
        name: "left",
        matches: |input| {
            input.overall >= 60.0
                && input.trend == TrendDirection::Sideways
                && input.rating.at_least(Rating::B)
        },
        build: |input| CategoryVerdict {
            category: PositionCategory::Left,
            confidence: 75.0,
            reasoning: vec![
                "Solid fundamentals at a reasonable valuation".to_string(),
                "Price consolidating, suited to staged accumulation".to_string(),
                "Long-term value case intact".to_string(),
            ],
            recommendations: vec![TradeAdvice {
                action: AdviceAction::Watch,
                reason: "Wait for the price to stabilize before committing".to_string(),
                target_price: Some(input.support * 0.95),
                stop_loss: None,
            }],
        },
    },
    CategoryRule {
        name: "defensive",
        matches: |input| {
            input.overall >= 50.0 && input.rating.at_least(Rating::B) && input.dividend_yield > 3.0
        },
        build: |_input| CategoryVerdict {
            category: PositionCategory::Defensive,
            confidence: 70.0,
            reasoning: vec![
                "High dividend yield with a stable payout".to_string(),
                "Valuation low, wide margin of safety".to_string(),
                "Suited to long holding periods".to_string(),
            ],
            recommendations: vec![TradeAdvice {
                action: AdviceAction::Hold,
                reason: "Defensive allocation for steady income".to_string(),
                target_price: None,
                stop_loss: None,
            }],
        },
    },
    CategoryRule {
        name: "observation",
        matches: |_input| true,
        build: |_input| observation_verdict(),
    },
];

/// Fallback branch; also the cascade's safety net should the table ever be
/// reconfigured without a catch-all
pub fn observation_verdict() -> CategoryVerdict {
    CategoryVerdict {
        category: PositionCategory::Observation,
        confidence: 60.0,
        reasoning: vec![
            "Fundamentals middling, improvement needed".to_string(),
            "Technical picture unclear".to_string(),
            "Better entries likely ahead".to_string(),
        ],
        recommendations: vec![TradeAdvice {
            action: AdviceAction::Watch,
            reason: "Keep watching, wait for a better setup".to_string(),
            target_price: None,
            stop_loss: None,
        }],
    }
}
