//! Trend direction, momentum, risk factors, and the adjustment action over a
//! snapshot window.

use analysis_core::{
    AdjustmentAction, AnalysisError, RiskAssessment, RiskLevel, SeriesAdvice, SeriesAnalysis,
    TimeHorizon, TimeSeriesSnapshot, TrendAnalysis, TrendDirection, TrendShift,
};
use technical_analysis::indicators::slope;

const VOLATILITY_RISK_BOUND: f64 = 0.3;
const DRAWDOWN_RISK_BOUND: f64 = 0.2;
const FUNDAMENTAL_RISK_BOUND: f64 = 60.0;
const STRENGTH_RISK_BOUND: f64 = 40.0;

/// One cell of the action decision table
pub struct AdjustmentRule {
    pub name: &'static str,
    pub matches: fn(TrendShift, RiskLevel) -> bool,
    pub advice: fn() -> SeriesAdvice,
}

/// The action decision table, in evaluation order; the last cell matches
/// everything
pub fn adjustment_rules() -> &'static [AdjustmentRule] {
    &RULES
}

static RULES: [AdjustmentRule; 5] = [
    AdjustmentRule {
        name: "improving-low",
        matches: |direction, risk| direction == TrendShift::Improving && risk == RiskLevel::Low,
        advice: || SeriesAdvice {
            action: AdjustmentAction::Continue,
            confidence: 0.9,
            reasoning: "Technicals firming and fundamentals improving with risk contained; keep holding".to_string(),
            timeline: "1-3 months".to_string(),
        },
    },
    AdjustmentRule {
        name: "improving-medium",
        matches: |direction, risk| direction == TrendShift::Improving && risk == RiskLevel::Medium,
        advice: || SeriesAdvice {
            action: AdjustmentAction::Adjust,
            confidence: 0.7,
            reasoning: "Trend is favorable but carries some risk; resize the position moderately".to_string(),
            timeline: "2-4 weeks".to_string(),
        },
    },
    AdjustmentRule {
        name: "deteriorating-high",
        matches: |direction, risk| direction == TrendShift::Deteriorating && risk == RiskLevel::High,
        advice: || SeriesAdvice {
            action: AdjustmentAction::Replace,
            confidence: 0.8,
            reasoning: "Trend weakening with elevated risk; consider replacing the holding".to_string(),
            timeline: "1-2 weeks".to_string(),
        },
    },
    AdjustmentRule {
        name: "stable",
        matches: |direction, _risk| direction == TrendShift::Stable,
        advice: || SeriesAdvice {
            action: AdjustmentAction::Rebalance,
            confidence: 0.6,
            reasoning: "Trend is flat; rebalance the position structure".to_string(),
            timeline: "3-6 weeks".to_string(),
        },
    },
    AdjustmentRule {
        name: "mixed",
        matches: |_direction, _risk| true,
        advice: || SeriesAdvice {
            action: AdjustmentAction::Adjust,
            confidence: 0.5,
            reasoning: "Mixed picture; adjust with caution".to_string(),
            timeline: "1-2 weeks".to_string(),
        },
    },
];

/// Derives momentum, risk level, and an adjustment action from a sliding
/// window of per-period snapshots
pub struct TrendRiskAnalyzer;

impl TrendRiskAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        snapshots: &[TimeSeriesSnapshot],
    ) -> Result<SeriesAnalysis, AnalysisError> {
        if snapshots.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 snapshots, got {}",
                snapshots.len()
            )));
        }

        let trend_analysis = trend_analysis(snapshots);
        let risk_assessment = risk_assessment(snapshots);

        let recommendation = adjustment_rules()
            .iter()
            .find(|rule| (rule.matches)(trend_analysis.direction, risk_assessment.level))
            .map(|rule| (rule.advice)())
            .unwrap_or_else(|| (RULES[RULES.len() - 1].advice)());

        Ok(SeriesAnalysis {
            time_horizon: time_horizon(snapshots.len()),
            data_points: snapshots.to_vec(),
            trend_analysis,
            risk_assessment,
            recommendation,
        })
    }
}

impl Default for TrendRiskAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Horizon label from the window length: 7 monthly points, 13 weekly, 31 daily
fn time_horizon(window: usize) -> TimeHorizon {
    if window <= 7 {
        TimeHorizon::Monthly
    } else if window <= 13 {
        TimeHorizon::Weekly
    } else {
        TimeHorizon::Daily
    }
}

fn trend_analysis(snapshots: &[TimeSeriesSnapshot]) -> TrendAnalysis {
    let n = snapshots.len() as f64;
    let frac_up = snapshots
        .iter()
        .filter(|s| s.technical.trend == TrendDirection::Up)
        .count() as f64
        / n;
    let frac_down = snapshots
        .iter()
        .filter(|s| s.technical.trend == TrendDirection::Down)
        .count() as f64
        / n;

    let fundamental_scores: Vec<f64> = snapshots.iter().map(|s| s.fundamental.score).collect();
    let returns: Vec<f64> = snapshots.iter().map(|s| s.performance.period_return).collect();
    let fundamental_slope = slope(&fundamental_scores);
    let return_slope = slope(&returns);

    let direction = if frac_up > 0.6 && fundamental_slope > 0.0 && return_slope > 0.0 {
        TrendShift::Improving
    } else if frac_down > 0.6 && fundamental_slope < 0.0 && return_slope < 0.0 {
        TrendShift::Deteriorating
    } else {
        TrendShift::Stable
    };

    let momentum = (frac_up - frac_down) * 0.4
        + sign(fundamental_slope) * 0.3
        + sign(return_slope) * 0.3;

    let confidence = (momentum.abs() * 0.7 + (snapshots.len() as f64 / 10.0).min(1.0) * 0.3).min(1.0);

    TrendAnalysis {
        direction,
        momentum,
        confidence,
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Risk factors accumulate independently; the level follows the count
fn risk_assessment(snapshots: &[TimeSeriesSnapshot]) -> RiskAssessment {
    let mut factors = Vec::new();
    let mut mitigation = Vec::new();

    let avg_volatility = snapshots
        .iter()
        .map(|s| s.performance.volatility)
        .sum::<f64>()
        / snapshots.len() as f64;
    if avg_volatility > VOLATILITY_RISK_BOUND {
        factors.push("high volatility".to_string());
        mitigation.push("consider trimming or hedging".to_string());
    }

    let max_drawdown = snapshots
        .iter()
        .map(|s| s.performance.max_drawdown)
        .fold(f64::NEG_INFINITY, f64::max);
    if max_drawdown > DRAWDOWN_RISK_BOUND {
        factors.push("drawdown risk".to_string());
        mitigation.push("set a stop loss".to_string());
    }

    let latest = &snapshots[snapshots.len() - 1];
    if latest.fundamental.score < FUNDAMENTAL_RISK_BOUND {
        factors.push("fundamentals weakening".to_string());
        mitigation.push("watch the next reporting period".to_string());
    }
    if latest.technical.strength < STRENGTH_RISK_BOUND {
        factors.push("technicals weakening".to_string());
        mitigation.push("watch for confirming signals".to_string());
    }

    let level = if factors.is_empty() {
        RiskLevel::Low
    } else if factors.len() <= 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    RiskAssessment {
        level,
        factors,
        mitigation,
    }
}
