//! Per-position decision cascade and the portfolio-level aggregates.

use analysis_core::{
    AdjustmentAction, Classification, DecisionAction, Holding, NextSteps, OverallAssessment,
    PortfolioAdjustment, PositionCategory, PositionDecision, Priority, RebalancingAction,
    RiskLevel, SeriesAnalysis, TrendShift,
};

/// Everything the aggregator derived for one instrument
#[derive(Debug, Clone)]
pub struct PositionAnalysis {
    pub holding: Holding,
    pub classification: Classification,
    pub series: SeriesAnalysis,
}

/// Inputs the per-position cascade branches on
#[derive(Debug, Clone, Copy)]
pub struct DecisionRuleInput {
    pub action: AdjustmentAction,
    pub category: PositionCategory,
    pub direction: TrendShift,
    pub risk: RiskLevel,
    pub current_price: f64,
}

#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub action: DecisionAction,
    pub confidence: f64,
    pub reasoning: String,
    pub target_price: Option<f64>,
    pub stop_loss: Option<f64>,
}

/// One cascade branch; evaluated top to bottom, first match wins
pub struct DecisionRule {
    pub name: &'static str,
    pub matches: fn(&DecisionRuleInput) -> bool,
    pub build: fn(&DecisionRuleInput) -> DecisionOutcome,
}

pub fn decision_rules() -> &'static [DecisionRule] {
    &RULES
}

static RULES: [DecisionRule; 8] = [
    DecisionRule {
        name: "continue-right-improving",
        matches: |input| {
            input.action == AdjustmentAction::Continue
                && input.category == PositionCategory::Right
                && input.direction == TrendShift::Improving
        },
        build: |_| DecisionOutcome {
            action: DecisionAction::Continue,
            confidence: 0.9,
            reasoning: "Right-side holding trending well; keep holding".to_string(),
            target_price: None,
            stop_loss: None,
        },
    },
    DecisionRule {
        name: "continue-left-improving",
        matches: |input| {
            input.action == AdjustmentAction::Continue
                && input.category == PositionCategory::Left
                && input.direction == TrendShift::Improving
        },
        build: |input| DecisionOutcome {
            action: DecisionAction::Increase,
            confidence: 0.8,
            reasoning: "Left-side holding with improving fundamentals; add moderately".to_string(),
            target_price: Some(input.current_price * 1.1),
            stop_loss: None,
        },
    },
    DecisionRule {
        name: "continue-default",
        matches: |input| input.action == AdjustmentAction::Continue,
        build: |_| DecisionOutcome {
            action: DecisionAction::Continue,
            confidence: 0.6,
            reasoning: "Holding stable; keep watching".to_string(),
            target_price: None,
            stop_loss: None,
        },
    },
    DecisionRule {
        name: "adjust-high-risk",
        matches: |input| input.action == AdjustmentAction::Adjust && input.risk == RiskLevel::High,
        build: |input| DecisionOutcome {
            action: DecisionAction::Reduce,
            confidence: 0.8,
            reasoning: "Risk elevated; reduce to control exposure".to_string(),
            target_price: None,
            stop_loss: Some(input.current_price * 0.9),
        },
    },
    DecisionRule {
        name: "adjust-improving",
        matches: |input| {
            input.action == AdjustmentAction::Adjust && input.direction == TrendShift::Improving
        },
        build: |input| DecisionOutcome {
            action: DecisionAction::Increase,
            confidence: 0.7,
            reasoning: "Trend improving; add moderately".to_string(),
            target_price: Some(input.current_price * 1.15),
            stop_loss: None,
        },
    },
    DecisionRule {
        name: "adjust-default",
        matches: |input| input.action == AdjustmentAction::Adjust,
        build: |_| DecisionOutcome {
            action: DecisionAction::Reduce,
            confidence: 0.6,
            reasoning: "Trend unclear; reduce and wait".to_string(),
            target_price: None,
            stop_loss: None,
        },
    },
    DecisionRule {
        name: "replace",
        matches: |input| input.action == AdjustmentAction::Replace,
        build: |input| DecisionOutcome {
            action: DecisionAction::Sell,
            confidence: 0.8,
            reasoning: "Fundamentals and technicals deteriorating; sell".to_string(),
            target_price: None,
            stop_loss: Some(input.current_price * 0.95),
        },
    },
    DecisionRule {
        name: "default",
        matches: |_| true,
        build: |_| DecisionOutcome {
            action: DecisionAction::Continue,
            confidence: 0.5,
            reasoning: "Mixed picture; hold with caution".to_string(),
            target_price: None,
            stop_loss: None,
        },
    },
];

pub fn single_position_decision(analysis: &PositionAnalysis) -> PositionDecision {
    let input = DecisionRuleInput {
        action: analysis.series.recommendation.action,
        category: analysis.classification.category,
        direction: analysis.series.trend_analysis.direction,
        risk: analysis.series.risk_assessment.level,
        current_price: analysis.holding.current_price,
    };

    let outcome = decision_rules()
        .iter()
        .find(|rule| (rule.matches)(&input))
        .map(|rule| (rule.build)(&input))
        .expect("decision table has a catch-all rule");

    let quantity = analysis.holding.quantity;
    let position_size = match outcome.action {
        DecisionAction::Increase => (quantity * 1.2).min(quantity + 1000.0),
        DecisionAction::Reduce => (quantity * 0.8).max(quantity - 1000.0),
        _ => quantity,
    };

    PositionDecision {
        stock_code: analysis.holding.stock_code.clone(),
        stock_name: analysis.holding.stock_name.clone(),
        current_category: analysis.classification.category,
        recommended_action: outcome.action,
        confidence: outcome.confidence,
        reasoning: outcome.reasoning,
        target_price: outcome.target_price,
        stop_loss: outcome.stop_loss,
        position_size: Some(position_size),
    }
}

/// Category mix as rounded percentages, plus rebalancing actions when the
/// mix drifts outside the documented bands
pub fn portfolio_adjustment(decisions: &[PositionDecision]) -> PortfolioAdjustment {
    let total = decisions.len() as f64;
    let ratio = |category: PositionCategory| {
        if total == 0.0 {
            0.0
        } else {
            (decisions
                .iter()
                .filter(|d| d.current_category == category)
                .count() as f64
                / total
                * 100.0)
                .round()
        }
    };

    let left_side_ratio = ratio(PositionCategory::Left);
    let right_side_ratio = ratio(PositionCategory::Right);
    let defensive_ratio = ratio(PositionCategory::Defensive);
    let observation_ratio = ratio(PositionCategory::Observation);

    let mut rebalancing_actions = Vec::new();
    if right_side_ratio < 40.0 {
        rebalancing_actions.push(RebalancingAction {
            action: "Increase right-side exposure".to_string(),
            stock_code: "screen candidates".to_string(),
            reason: "Right-side share is light; look for quality names in confirmed uptrends"
                .to_string(),
            priority: Priority::High,
        });
    }
    if left_side_ratio > 50.0 {
        rebalancing_actions.push(RebalancingAction {
            action: "Reduce left-side exposure".to_string(),
            stock_code: "review holdings".to_string(),
            reason: "Left-side share is heavy; trim or convert to right-side".to_string(),
            priority: Priority::Medium,
        });
    }
    if defensive_ratio < 15.0 {
        rebalancing_actions.push(RebalancingAction {
            action: "Increase defensive allocation".to_string(),
            stock_code: "screen candidates".to_string(),
            reason: "Defensive share is light; look for high-yield, low-valuation names"
                .to_string(),
            priority: Priority::Medium,
        });
    }

    PortfolioAdjustment {
        left_side_ratio,
        right_side_ratio,
        defensive_ratio,
        observation_ratio,
        rebalancing_actions,
    }
}

pub fn overall_assessment(
    decisions: &[PositionDecision],
    analyses: &[PositionAnalysis],
) -> OverallAssessment {
    let mean_confidence = if decisions.is_empty() {
        0.0
    } else {
        decisions.iter().map(|d| d.confidence).sum::<f64>() / decisions.len() as f64
    };
    let portfolio_health = (mean_confidence * 100.0).round();

    let high_risk = analyses
        .iter()
        .filter(|a| a.series.risk_assessment.level == RiskLevel::High)
        .count();
    let risk_level = if high_risk * 2 > analyses.len() {
        RiskLevel::High
    } else if high_risk > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    OverallAssessment {
        portfolio_health,
        risk_level,
        expected_return: expected_return(decisions, analyses),
        confidence: portfolio_health,
    }
}

/// Mean latest period return scaled by the mean action multiplier
/// (buy/increase 1.2, sell/reduce 0.8, else 1.0), rounded to 2 decimals
fn expected_return(decisions: &[PositionDecision], analyses: &[PositionAnalysis]) -> f64 {
    if decisions.is_empty() || analyses.is_empty() {
        return 0.0;
    }

    let mean_return = analyses
        .iter()
        .filter_map(|a| a.series.data_points.last())
        .map(|p| p.performance.period_return)
        .sum::<f64>()
        / analyses.len() as f64;

    let mean_multiplier = decisions
        .iter()
        .map(|d| match d.recommended_action {
            DecisionAction::Buy | DecisionAction::Increase => 1.2,
            DecisionAction::Sell | DecisionAction::Reduce => 0.8,
            _ => 1.0,
        })
        .sum::<f64>()
        / decisions.len() as f64;

    (mean_return * mean_multiplier * 100.0).round() / 100.0
}

pub fn next_steps(
    decisions: &[PositionDecision],
    adjustment: &PortfolioAdjustment,
) -> NextSteps {
    let mut immediate_actions = Vec::new();
    let mut watch_list = Vec::new();
    let mut alerts = Vec::new();

    for decision in decisions {
        let label = format!("{} ({})", decision.stock_name, decision.stock_code);
        match decision.recommended_action {
            DecisionAction::Sell => {
                immediate_actions.push(format!("Sell {} - {}", label, decision.reasoning))
            }
            DecisionAction::Buy => {
                immediate_actions.push(format!("Buy {} - {}", label, decision.reasoning))
            }
            DecisionAction::Reduce => {
                immediate_actions.push(format!("Reduce {} - {}", label, decision.reasoning))
            }
            DecisionAction::Increase => {
                immediate_actions.push(format!("Add to {} - {}", label, decision.reasoning))
            }
            DecisionAction::Continue => {}
        }

        if let Some(target) = decision.target_price {
            watch_list.push(format!("{} target price: {:.2}", label, target));
        }
        if let Some(stop) = decision.stop_loss {
            watch_list.push(format!("{} stop loss: {:.2}", label, stop));
        }

        if decision.recommended_action == DecisionAction::Continue && decision.confidence < 0.7 {
            alerts.push(format!("Watch {} for technical changes", label));
        }
    }

    for action in &adjustment.rebalancing_actions {
        if action.priority == Priority::High {
            alerts.push(format!("High priority: {} - {}", action.action, action.reason));
        }
    }

    let urgent = decisions.iter().any(|d| {
        matches!(
            d.recommended_action,
            DecisionAction::Buy | DecisionAction::Sell
        )
    });
    let timeline = if urgent {
        "execute urgent actions within 1-3 days".to_string()
    } else {
        "complete adjustments within 1-2 weeks".to_string()
    };

    NextSteps {
        immediate_actions,
        watch_list,
        alerts,
        timeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        action: AdjustmentAction,
        category: PositionCategory,
        direction: TrendShift,
        risk: RiskLevel,
    ) -> DecisionRuleInput {
        DecisionRuleInput {
            action,
            category,
            direction,
            risk,
            current_price: 10.0,
        }
    }

    fn outcome_for(i: &DecisionRuleInput) -> DecisionOutcome {
        decision_rules()
            .iter()
            .find(|rule| (rule.matches)(i))
            .map(|rule| (rule.build)(i))
            .unwrap()
    }

    #[test]
    fn cascade_reproduces_all_documented_cells() {
        use AdjustmentAction as A;
        use DecisionAction as D;
        use PositionCategory as C;
        use RiskLevel as R;
        use TrendShift as T;

        let o = outcome_for(&input(A::Continue, C::Right, T::Improving, R::Low));
        assert_eq!((o.action, o.confidence), (D::Continue, 0.9));

        let o = outcome_for(&input(A::Continue, C::Left, T::Improving, R::Low));
        assert_eq!((o.action, o.confidence), (D::Increase, 0.8));
        assert!((o.target_price.unwrap() - 11.0).abs() < 1e-9);

        let o = outcome_for(&input(A::Continue, C::Left, T::Stable, R::Low));
        assert_eq!((o.action, o.confidence), (D::Continue, 0.6));

        let o = outcome_for(&input(A::Adjust, C::Right, T::Stable, R::High));
        assert_eq!((o.action, o.confidence), (D::Reduce, 0.8));
        assert!((o.stop_loss.unwrap() - 9.0).abs() < 1e-9);

        let o = outcome_for(&input(A::Adjust, C::Right, T::Improving, R::Medium));
        assert_eq!((o.action, o.confidence), (D::Increase, 0.7));
        assert!((o.target_price.unwrap() - 11.5).abs() < 1e-9);

        let o = outcome_for(&input(A::Adjust, C::Right, T::Stable, R::Low));
        assert_eq!((o.action, o.confidence), (D::Reduce, 0.6));

        let o = outcome_for(&input(A::Replace, C::Observation, T::Deteriorating, R::High));
        assert_eq!((o.action, o.confidence), (D::Sell, 0.8));
        assert!((o.stop_loss.unwrap() - 9.5).abs() < 1e-9);

        let o = outcome_for(&input(A::Rebalance, C::Left, T::Stable, R::Low));
        assert_eq!((o.action, o.confidence), (D::Continue, 0.5));
    }

    #[test]
    fn high_risk_adjust_wins_over_improving() {
        let o = outcome_for(&input(
            AdjustmentAction::Adjust,
            PositionCategory::Left,
            TrendShift::Improving,
            RiskLevel::High,
        ));
        assert_eq!(o.action, DecisionAction::Reduce);
    }

    fn decision(
        code: &str,
        category: PositionCategory,
        action: DecisionAction,
        confidence: f64,
    ) -> PositionDecision {
        PositionDecision {
            stock_code: code.to_string(),
            stock_name: format!("Stock {}", code),
            current_category: category,
            recommended_action: action,
            confidence,
            reasoning: "test".to_string(),
            target_price: None,
            stop_loss: None,
            position_size: Some(1000.0),
        }
    }

    #[test]
    fn adjustment_ratios_and_actions() {
        let decisions = vec![
            decision("1", PositionCategory::Left, DecisionAction::Continue, 0.8),
            decision("2", PositionCategory::Left, DecisionAction::Continue, 0.8),
            decision("3", PositionCategory::Left, DecisionAction::Continue, 0.8),
            decision("4", PositionCategory::Right, DecisionAction::Continue, 0.8),
        ];
        let adjustment = portfolio_adjustment(&decisions);

        assert_eq!(adjustment.left_side_ratio, 75.0);
        assert_eq!(adjustment.right_side_ratio, 25.0);
        assert_eq!(adjustment.defensive_ratio, 0.0);

        let actions: Vec<&str> = adjustment
            .rebalancing_actions
            .iter()
            .map(|a| a.action.as_str())
            .collect();
        assert!(actions.contains(&"Increase right-side exposure"));
        assert!(actions.contains(&"Reduce left-side exposure"));
        assert!(actions.contains(&"Increase defensive allocation"));
    }

    #[test]
    fn balanced_portfolio_needs_no_rebalancing() {
        let decisions = vec![
            decision("1", PositionCategory::Right, DecisionAction::Continue, 0.8),
            decision("2", PositionCategory::Right, DecisionAction::Continue, 0.8),
            decision("3", PositionCategory::Left, DecisionAction::Continue, 0.8),
            decision("4", PositionCategory::Defensive, DecisionAction::Continue, 0.8),
        ];
        let adjustment = portfolio_adjustment(&decisions);
        assert!(adjustment.rebalancing_actions.is_empty());
    }

    #[test]
    fn timeline_tightens_on_urgent_actions() {
        let calm = vec![decision("1", PositionCategory::Left, DecisionAction::Continue, 0.8)];
        let adjustment = portfolio_adjustment(&calm);
        assert!(next_steps(&calm, &adjustment).timeline.contains("1-2 weeks"));

        let urgent = vec![decision("1", PositionCategory::Left, DecisionAction::Sell, 0.8)];
        let adjustment = portfolio_adjustment(&urgent);
        assert!(next_steps(&urgent, &adjustment).timeline.contains("1-3 days"));
    }

    #[test]
    fn low_confidence_continues_raise_alerts() {
        let decisions = vec![decision("1", PositionCategory::Right, DecisionAction::Continue, 0.6)];
        let adjustment = PortfolioAdjustment {
            left_side_ratio: 0.0,
            right_side_ratio: 100.0,
            defensive_ratio: 15.0,
            observation_ratio: 0.0,
            rebalancing_actions: vec![],
        };
        let steps = next_steps(&decisions, &adjustment);
        assert_eq!(steps.alerts.len(), 1);
        assert!(steps.alerts[0].contains("Watch"));
    }
}
