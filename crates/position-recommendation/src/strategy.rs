//! Lifecycle transition tables, sizing bands, the risk-control ladder,
//! time-gated trigger nodes, and the forward view.

use analysis_core::{
    ActionAdvice, FundamentalReport, Holding, IndicatorSet, KeyNode, LadderRung, PositionAction,
    PositionSizing, Prediction, Priority, RecommendedPosition, RiskControl, TimeNode, TimeNodes,
    TrendDirection, TrendForecast, Urgency,
};
use chrono::{Duration, NaiveDate};

use crate::assessment::{Assessment, OpportunityLevel, TrendPhase};

/// Inputs the transition tables branch on
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput {
    pub overall: f64,
    pub phase: TrendPhase,
    pub opportunity: OpportunityLevel,
    /// Category of the existing position, defaulting to left when unset
    pub current_category: RecommendedPosition,
}

#[derive(Debug, Clone)]
pub struct StrategyVerdict {
    pub position: RecommendedPosition,
    pub advice: ActionAdvice,
}

/// One transition; evaluated top to bottom, first match wins
pub struct StrategyRule {
    pub name: &'static str,
    pub matches: fn(&StrategyInput) -> bool,
    pub build: fn(&StrategyInput) -> StrategyVerdict,
}

/// Transition table for instruments already held
pub fn held_rules() -> &'static [StrategyRule] {
    &HELD_RULES
}

/// Transition table for instruments not held
pub fn not_held_rules() -> &'static [StrategyRule] {
    &NOT_HELD_RULES
}

static HELD_RULES: [StrategyRule; 5] = [
    StrategyRule {
        name: "upgrade-right",
        matches: |input| input.overall >= 75.0 && input.phase == TrendPhase::Breakout,
        build: |_| StrategyVerdict {
            position: RecommendedPosition::Right,
            advice: ActionAdvice {
                action: PositionAction::Upgrade,
                confidence: 85.0,
                reasoning: vec![
                    "Technical breakout with the trend pointing up; upgrade toward a right-side or mainline position".to_string(),
                ],
                urgency: Urgency::High,
            },
        },
    },
    StrategyRule {
        name: "add-mainline",
        matches: |input| input.overall >= 70.0 && input.phase == TrendPhase::UptrendContinuation,
        build: |_| StrategyVerdict {
            position: RecommendedPosition::Mainline,
            advice: ActionAdvice {
                action: PositionAction::Add,
                confidence: 80.0,
                reasoning: vec![
                    "Trend continuing; add toward a mainline allocation".to_string(),
                ],
                urgency: Urgency::Medium,
            },
        },
    },
    StrategyRule {
        name: "reduce-left",
        matches: |input| input.overall < 50.0 && input.phase == TrendPhase::Consolidation,
        build: |_| StrategyVerdict {
            position: RecommendedPosition::Left,
            advice: ActionAdvice {
                action: PositionAction::Reduce,
                confidence: 70.0,
                reasoning: vec![
                    "Fundamentals softening; reduce and wait".to_string(),
                ],
                urgency: Urgency::Medium,
            },
        },
    },
    StrategyRule {
        name: "exit",
        matches: |input| input.overall < 40.0,
        build: |_| StrategyVerdict {
            position: RecommendedPosition::Exit,
            advice: ActionAdvice {
                action: PositionAction::Exit,
                confidence: 75.0,
                reasoning: vec![
                    "Fundamentals deteriorating; close out the position".to_string(),
                ],
                urgency: Urgency::High,
            },
        },
    },
    StrategyRule {
        name: "hold",
        matches: |_| true,
        build: |input| StrategyVerdict {
            position: input.current_category,
            advice: ActionAdvice {
                action: PositionAction::Hold,
                confidence: 60.0,
                reasoning: vec![
                    "Situation stable; keep holding and watch".to_string(),
                ],
                urgency: Urgency::Low,
            },
        },
    },
];

static NOT_HELD_RULES: [StrategyRule; 3] = [
    StrategyRule {
        name: "build-left",
        matches: |input| {
            input.overall >= 70.0
                && input.phase == TrendPhase::BottomBuilding
                && input.opportunity != OpportunityLevel::VeryLow
        },
        build: |_| StrategyVerdict {
            position: RecommendedPosition::Left,
            advice: ActionAdvice {
                action: PositionAction::Build,
                confidence: 75.0,
                reasoning: vec![
                    "Fundamentals sound and the chart basing; open a left-side position".to_string(),
                    "Valuation reasonable at current levels, suited to a long-horizon entry".to_string(),
                ],
                urgency: Urgency::Medium,
            },
        },
    },
    StrategyRule {
        name: "build-right",
        matches: |input| input.overall >= 80.0 && input.phase == TrendPhase::Breakout,
        build: |_| StrategyVerdict {
            position: RecommendedPosition::Right,
            advice: ActionAdvice {
                action: PositionAction::Build,
                confidence: 85.0,
                reasoning: vec![
                    "Technical breakout with the trend pointing up; open a right-side position directly".to_string(),
                    "Market action strong, timing favorable".to_string(),
                ],
                urgency: Urgency::High,
            },
        },
    },
    StrategyRule {
        name: "wait",
        matches: |_| true,
        build: |_| StrategyVerdict {
            position: RecommendedPosition::Exit,
            advice: ActionAdvice {
                action: PositionAction::Hold,
                confidence: 50.0,
                reasoning: vec![
                    "No clear opportunity yet; stay on the sidelines".to_string(),
                ],
                urgency: Urgency::Low,
            },
        },
    },
];

pub fn position_strategy(assessment: &Assessment, holding: Option<&Holding>) -> StrategyVerdict {
    let input = StrategyInput {
        overall: assessment.overall_score,
        phase: assessment.trend_phase,
        opportunity: assessment.opportunity,
        current_category: holding
            .and_then(|h| h.category)
            .unwrap_or(RecommendedPosition::Left),
    };

    let table = if holding.is_some() {
        held_rules()
    } else {
        not_held_rules()
    };

    // the last rule of each table matches everything
    table
        .iter()
        .find(|rule| (rule.matches)(&input))
        .map(|rule| (rule.build)(&input))
        .expect("transition table has a catch-all rule")
}

/// Trigger nodes are generated only when their guard holds; an absent
/// trigger type stays an empty list
pub fn time_nodes(
    assessment: &Assessment,
    is_held: bool,
    current_price: f64,
    as_of: NaiveDate,
) -> TimeNodes {
    let mut nodes = TimeNodes::default();
    let overall = assessment.overall_score;
    let phase = assessment.trend_phase;

    if !is_held && overall >= 70.0 {
        nodes.build_left.push(TimeNode {
            date: as_of,
            price: current_price,
            condition: "Fundamentals sound and the chart stabilizing".to_string(),
            confidence: 75.0,
            action: "Open a left-side position of 10-20%".to_string(),
            priority: Priority::Medium,
        });
    }

    if is_held && phase == TrendPhase::Breakout && overall >= 75.0 {
        nodes.upgrade_to_right.push(TimeNode {
            date: as_of + Duration::days(7),
            price: current_price,
            condition: "Breakout above resistance on expanding volume".to_string(),
            confidence: 80.0,
            action: "Upgrade from left to right, lift total position to 30-40%".to_string(),
            priority: Priority::High,
        });
    }

    if is_held && phase == TrendPhase::UptrendContinuation && overall >= 80.0 {
        nodes.upgrade_to_mainline.push(TimeNode {
            date: as_of + Duration::days(30),
            price: current_price,
            condition: "Trend persisting with fundamentals improving".to_string(),
            confidence: 85.0,
            action: "Upgrade to a mainline allocation of 50-60%".to_string(),
            priority: Priority::High,
        });
    }

    if is_held && overall < 50.0 {
        nodes.reduce_position.push(TimeNode {
            date: as_of,
            price: current_price,
            condition: "Fundamentals softening, risk rising".to_string(),
            confidence: 70.0,
            action: "Cut the position by half".to_string(),
            priority: Priority::Medium,
        });
    }

    if is_held && overall < 40.0 {
        nodes.exit.push(TimeNode {
            date: as_of,
            price: current_price,
            condition: "Fundamentals deteriorating".to_string(),
            confidence: 75.0,
            action: "Close out the entire position".to_string(),
            priority: Priority::High,
        });
    }

    nodes
}

/// Score- and phase-gated sizing bands: left 10-30%, right 30-50%,
/// mainline 50-70%; max exposure is the widest active band
pub fn position_sizing(assessment: &Assessment) -> PositionSizing {
    let overall = assessment.overall_score;
    let phase = assessment.trend_phase;

    let left = if overall >= 70.0 && phase == TrendPhase::BottomBuilding {
        20.0
    } else if overall >= 60.0 {
        15.0
    } else if overall >= 50.0 {
        10.0
    } else {
        0.0
    };

    let right = if overall >= 80.0 && phase == TrendPhase::Breakout {
        40.0
    } else if overall >= 75.0 {
        35.0
    } else if overall >= 70.0 {
        30.0
    } else {
        0.0
    };

    let mainline = if overall >= 85.0 && phase == TrendPhase::UptrendContinuation {
        60.0
    } else if overall >= 80.0 {
        55.0
    } else if overall >= 75.0 {
        50.0
    } else {
        0.0
    };

    PositionSizing {
        recommended_left_position: left,
        recommended_right_position: right,
        recommended_mainline_position: mainline,
        max_position: left.max(right).max(mainline),
    }
}

/// Stop at -8%, target at +25%, and a four-rung accumulation ladder
pub fn risk_control(current_price: f64) -> RiskControl {
    RiskControl {
        stop_loss: current_price * 0.92,
        target_price: current_price * 1.25,
        position_ladder: vec![
            LadderRung {
                price: current_price * 0.95,
                position_ratio: 10.0,
                description: "5% dip: scale in to 10% of the portfolio".to_string(),
            },
            LadderRung {
                price: current_price * 1.10,
                position_ratio: 20.0,
                description: "10% advance confirms the left side, add to 20%".to_string(),
            },
            LadderRung {
                price: current_price * 1.20,
                position_ratio: 35.0,
                description: "Break of the prior high confirms the right side, add to 35%".to_string(),
            },
            LadderRung {
                price: current_price * 1.35,
                position_ratio: 50.0,
                description: "Trend established, upgrade to mainline at 50%".to_string(),
            },
        ],
    }
}

pub fn prediction(
    indicators: &IndicatorSet,
    report: &FundamentalReport,
    as_of: NaiveDate,
) -> Prediction {
    let quality = report.quality.score;

    let entry_signal = if indicators.trend == TrendDirection::Up && quality >= 70.0 {
        "Technical breakout with excellent fundamentals, start building".to_string()
    } else if quality >= 80.0 && indicators.trend == TrendDirection::Sideways {
        "Excellent fundamentals with a basing chart, suited to left-side entry".to_string()
    } else if indicators.trend == TrendDirection::Up {
        "Technicals turning up, worth watching".to_string()
    } else {
        "Wait for a better window".to_string()
    };

    let exit_signal = if indicators.trend == TrendDirection::Down && quality < 50.0 {
        "Technical breakdown with deteriorating fundamentals, close out".to_string()
    } else if quality < 40.0 {
        "Fundamentals deteriorating, reduce or close".to_string()
    } else if indicators.trend == TrendDirection::Down && indicators.strength < 30.0 {
        "Technicals weakening, reduce".to_string()
    } else {
        "No exit signal yet".to_string()
    };

    let key_nodes = vec![
        KeyNode {
            date: as_of + Duration::days(7),
            event: "Key technical level test".to_string(),
            impact: Priority::High,
            action: "Watch the breakout direction".to_string(),
        },
        KeyNode {
            date: as_of + Duration::days(30),
            event: "Next fundamental data release".to_string(),
            impact: Priority::Medium,
            action: "Watch for changes in the financials".to_string(),
        },
    ];

    let (direction, probability) = if indicators.trend == TrendDirection::Up
        && indicators.strength > 70.0
    {
        (TrendDirection::Up, 75.0)
    } else if indicators.trend == TrendDirection::Down && indicators.strength > 70.0 {
        (TrendDirection::Down, 70.0)
    } else {
        (TrendDirection::Sideways, 50.0)
    };

    Prediction {
        entry_signal,
        exit_signal,
        key_nodes,
        trend_forecast: TrendForecast {
            direction,
            probability,
            timeframe: "1-3 months".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(overall: f64, phase: TrendPhase, opportunity: OpportunityLevel) -> Assessment {
        Assessment {
            technical_score: overall,
            fundamental_score: overall,
            trend_score: overall,
            market_score: overall,
            overall_score: overall,
            trend_phase: phase,
            opportunity,
        }
    }

    fn held() -> Holding {
        Holding {
            stock_code: "000001".to_string(),
            stock_name: "Example Bank".to_string(),
            quantity: 1000.0,
            average_price: 10.0,
            current_price: 10.5,
            category: Some(RecommendedPosition::Left),
        }
    }

    #[test]
    fn held_table_follows_the_documented_transitions() {
        let h = held();
        let cases = [
            (82.0, TrendPhase::Breakout, PositionAction::Upgrade, RecommendedPosition::Right, 85.0, Urgency::High),
            (72.0, TrendPhase::UptrendContinuation, PositionAction::Add, RecommendedPosition::Mainline, 80.0, Urgency::Medium),
            (45.0, TrendPhase::Consolidation, PositionAction::Reduce, RecommendedPosition::Left, 70.0, Urgency::Medium),
            (35.0, TrendPhase::Pullback, PositionAction::Exit, RecommendedPosition::Exit, 75.0, Urgency::High),
            (60.0, TrendPhase::Pullback, PositionAction::Hold, RecommendedPosition::Left, 60.0, Urgency::Low),
        ];
        for (overall, phase, action, position, confidence, urgency) in cases {
            let verdict = position_strategy(
                &assessment(overall, phase, OpportunityLevel::Medium),
                Some(&h),
            );
            assert_eq!(verdict.advice.action, action, "overall {}", overall);
            assert_eq!(verdict.position, position, "overall {}", overall);
            assert_eq!(verdict.advice.confidence, confidence);
            assert_eq!(verdict.advice.urgency, urgency);
            assert!(!verdict.advice.reasoning.is_empty());
        }
    }

    #[test]
    fn hold_keeps_the_current_category() {
        let mut h = held();
        h.category = Some(RecommendedPosition::Defensive);
        let verdict = position_strategy(
            &assessment(60.0, TrendPhase::Pullback, OpportunityLevel::Medium),
            Some(&h),
        );
        assert_eq!(verdict.position, RecommendedPosition::Defensive);
    }

    #[test]
    fn not_held_table_builds_or_waits() {
        let left = position_strategy(
            &assessment(72.0, TrendPhase::BottomBuilding, OpportunityLevel::MediumHigh),
            None,
        );
        assert_eq!(left.advice.action, PositionAction::Build);
        assert_eq!(left.position, RecommendedPosition::Left);
        assert_eq!(left.advice.confidence, 75.0);

        let right = position_strategy(
            &assessment(84.0, TrendPhase::Breakout, OpportunityLevel::High),
            None,
        );
        assert_eq!(right.advice.action, PositionAction::Build);
        assert_eq!(right.position, RecommendedPosition::Right);
        assert_eq!(right.advice.urgency, Urgency::High);

        let wait = position_strategy(
            &assessment(55.0, TrendPhase::Consolidation, OpportunityLevel::Low),
            None,
        );
        assert_eq!(wait.advice.action, PositionAction::Hold);
        assert_eq!(wait.position, RecommendedPosition::Exit);
        assert_eq!(wait.advice.confidence, 50.0);
    }

    #[test]
    fn very_low_opportunity_blocks_left_side_entry() {
        let verdict = position_strategy(
            &assessment(72.0, TrendPhase::BottomBuilding, OpportunityLevel::VeryLow),
            None,
        );
        assert_eq!(verdict.advice.action, PositionAction::Hold);
    }

    #[test]
    fn sizing_bands_step_with_score() {
        let strong = position_sizing(&assessment(86.0, TrendPhase::Breakout, OpportunityLevel::High));
        assert_eq!(strong.recommended_right_position, 40.0);
        assert_eq!(strong.recommended_mainline_position, 55.0);
        assert_eq!(strong.max_position, 55.0);

        let base = position_sizing(&assessment(72.0, TrendPhase::BottomBuilding, OpportunityLevel::MediumHigh));
        assert_eq!(base.recommended_left_position, 20.0);
        assert_eq!(base.recommended_right_position, 30.0);
        assert_eq!(base.recommended_mainline_position, 0.0);
        assert_eq!(base.max_position, 30.0);

        let weak = position_sizing(&assessment(45.0, TrendPhase::Pullback, OpportunityLevel::Low));
        assert_eq!(weak.max_position, 0.0);
    }

    #[test]
    fn sizing_never_exceeds_band_caps() {
        let phases = [
            TrendPhase::BottomBuilding,
            TrendPhase::Breakout,
            TrendPhase::UptrendContinuation,
            TrendPhase::Consolidation,
            TrendPhase::Pullback,
            TrendPhase::Uncertain,
        ];
        for overall in (0..=100).step_by(5) {
            for phase in phases {
                let sizing = position_sizing(&assessment(
                    overall as f64,
                    phase,
                    OpportunityLevel::Medium,
                ));
                assert!(sizing.recommended_left_position <= 30.0);
                assert!(sizing.recommended_right_position <= 50.0);
                assert!(sizing.recommended_mainline_position <= 70.0);
                let expected = sizing
                    .recommended_left_position
                    .max(sizing.recommended_right_position)
                    .max(sizing.recommended_mainline_position);
                assert_eq!(sizing.max_position, expected);
            }
        }
    }

    #[test]
    fn unheld_low_score_generates_no_nodes() {
        let nodes = time_nodes(
            &assessment(55.0, TrendPhase::Consolidation, OpportunityLevel::Low),
            false,
            10.0,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        assert_eq!(nodes, TimeNodes::default());
    }

    #[test]
    fn collapsing_score_generates_reduce_and_exit_nodes() {
        let nodes = time_nodes(
            &assessment(35.0, TrendPhase::Pullback, OpportunityLevel::VeryLow),
            true,
            10.0,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        assert_eq!(nodes.reduce_position.len(), 1);
        assert_eq!(nodes.exit.len(), 1);
        assert!(nodes.build_left.is_empty());
    }
}
