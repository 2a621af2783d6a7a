//! Multi-dimension assessment feeding the transition tables: technical,
//! fundamental, trend, and market scores, the trend phase, and the
//! opportunity level.

use analysis_core::{
    FundamentalReport, IndicatorSet, IndicatorValues, Signal, SignalGrade, SignalKind,
    TimeSeriesSnapshot, TrendDirection,
};

/// Blend weights for the overall assessment score
#[derive(Debug, Clone, Copy)]
pub struct AssessmentWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub trend: f64,
    pub market: f64,
}

impl Default for AssessmentWeights {
    fn default() -> Self {
        Self {
            technical: 0.30,
            fundamental: 0.25,
            trend: 0.25,
            market: 0.20,
        }
    }
}

/// Qualitative chart phase, derived from trend and strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPhase {
    BottomBuilding,
    Breakout,
    UptrendContinuation,
    Consolidation,
    Pullback,
    Uncertain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpportunityLevel {
    High,
    MediumHigh,
    Medium,
    Low,
    VeryLow,
}

#[derive(Debug, Clone, Copy)]
pub struct Assessment {
    pub technical_score: f64,
    pub fundamental_score: f64,
    pub trend_score: f64,
    pub market_score: f64,
    pub overall_score: f64,
    pub trend_phase: TrendPhase,
    pub opportunity: OpportunityLevel,
}

pub fn assess(
    indicators: &IndicatorSet,
    report: &FundamentalReport,
    series: &[TimeSeriesSnapshot],
    market_score: f64,
    weights: AssessmentWeights,
) -> Assessment {
    let technical_score = assess_technical(indicators);
    let fundamental_score = report.quality.score.clamp(0.0, 100.0);
    let trend_score = assess_trend(series);
    let market_score = market_score.clamp(0.0, 100.0);

    let overall_score = (technical_score * weights.technical
        + fundamental_score * weights.fundamental
        + trend_score * weights.trend
        + market_score * weights.market)
        .clamp(0.0, 100.0);

    let trend_phase = determine_trend_phase(indicators);
    let opportunity =
        opportunity_level(technical_score, fundamental_score, trend_score, trend_phase);

    Assessment {
        technical_score,
        fundamental_score,
        trend_score,
        market_score,
        overall_score,
        trend_phase,
        opportunity,
    }
}

/// 30% trend term, 25% moving-average system, 25% oscillators, 20% signal
/// balance
pub fn assess_technical(indicators: &IndicatorSet) -> f64 {
    let trend_term = match indicators.trend {
        TrendDirection::Up => 30.0 * (indicators.strength / 100.0),
        TrendDirection::Down => 30.0 * (1.0 - indicators.strength / 100.0),
        TrendDirection::Sideways => 15.0,
    };

    let ma_term = ma_system_score(&indicators.indicators) * 0.25;
    let oscillator_term = oscillator_score(&indicators.indicators) * 0.25;
    let signal_term = signal_score(&indicators.signals) * 0.20;

    (trend_term + ma_term + oscillator_term + signal_term).clamp(0.0, 100.0)
}

fn ma_system_score(v: &IndicatorValues) -> f64 {
    if v.ma5 > v.ma10 && v.ma10 > v.ma20 && v.ma20 > v.ma60 {
        100.0
    } else if v.ma5 > v.ma10 && v.ma10 > v.ma20 {
        75.0
    } else if (v.ma5 - v.ma10).abs() < v.ma10.abs() * 0.02 {
        50.0
    } else {
        25.0
    }
}

fn oscillator_score(v: &IndicatorValues) -> f64 {
    let mut score = 0.0;

    if v.macd.value > v.macd.signal && v.macd.histogram > 0.0 {
        score += 35.0;
    } else if v.macd.value < v.macd.signal {
        score += 15.0;
    } else {
        score += 25.0;
    }

    if v.rsi < 30.0 {
        score += 35.0;
    } else if v.rsi > 70.0 {
        score += 15.0;
    } else if v.rsi > 50.0 {
        score += 30.0;
    } else {
        score += 20.0;
    }

    if v.kdj.k > v.kdj.d && v.kdj.j > v.kdj.k {
        score += 30.0;
    } else if v.kdj.k < v.kdj.d {
        score += 10.0;
    } else {
        score += 20.0;
    }

    score
}

/// 50 is balance; each point of net buy strength moves the needle 20
fn signal_score(signals: &[Signal]) -> f64 {
    if signals.is_empty() {
        return 50.0;
    }

    let weight = |grade: SignalGrade| match grade {
        SignalGrade::Strong => 2.0,
        SignalGrade::Medium => 1.0,
        SignalGrade::Weak => 0.5,
    };

    let buy_strength: f64 = signals
        .iter()
        .filter(|s| s.kind == SignalKind::Buy)
        .map(|s| weight(s.strength))
        .sum();
    let sell_strength: f64 = signals
        .iter()
        .filter(|s| s.kind == SignalKind::Sell)
        .map(|s| weight(s.strength))
        .sum();

    (50.0 + (buy_strength - sell_strength) * 20.0).clamp(0.0, 100.0)
}

/// Recent performance window: positive average return rewards, volatility
/// penalizes. Fewer than 2 snapshots reads neutral.
pub fn assess_trend(series: &[TimeSeriesSnapshot]) -> f64 {
    if series.len() < 2 {
        return 50.0;
    }

    let recent = &series[series.len().saturating_sub(10)..];
    let avg_return = recent
        .iter()
        .map(|s| s.performance.period_return)
        .sum::<f64>()
        / recent.len() as f64;
    let avg_volatility = recent
        .iter()
        .map(|s| s.performance.volatility)
        .sum::<f64>()
        / recent.len() as f64;

    let mut score = 50.0;
    score += if avg_return > 0.0 { 25.0 } else { -15.0 };
    score -= avg_volatility * 50.0;

    score.clamp(0.0, 100.0)
}

/// Phase mapping from trend and strength; evaluation order matters for the
/// down-trend bands
pub fn determine_trend_phase(indicators: &IndicatorSet) -> TrendPhase {
    match indicators.trend {
        TrendDirection::Down if indicators.strength < 30.0 => TrendPhase::BottomBuilding,
        TrendDirection::Up if indicators.strength > 70.0 => TrendPhase::Breakout,
        TrendDirection::Up if indicators.strength > 50.0 => TrendPhase::UptrendContinuation,
        TrendDirection::Sideways => TrendPhase::Consolidation,
        TrendDirection::Down if indicators.strength < 50.0 => TrendPhase::Pullback,
        _ => TrendPhase::Uncertain,
    }
}

pub fn opportunity_level(
    technical_score: f64,
    fundamental_score: f64,
    trend_score: f64,
    trend_phase: TrendPhase,
) -> OpportunityLevel {
    let avg = (technical_score + fundamental_score + trend_score) / 3.0;

    if avg >= 75.0 && trend_phase == TrendPhase::Breakout {
        OpportunityLevel::High
    } else if fundamental_score >= 70.0
        && technical_score >= 50.0
        && trend_phase == TrendPhase::BottomBuilding
    {
        OpportunityLevel::MediumHigh
    } else if avg >= 60.0 {
        OpportunityLevel::Medium
    } else if avg >= 40.0 {
        OpportunityLevel::Low
    } else {
        OpportunityLevel::VeryLow
    }
}
