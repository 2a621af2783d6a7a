//! Technical-side scoring for the classifier: trend term, moving-average
//! alignment, and oscillator readings blended 40/30/30.

use analysis_core::{BollingerValue, IndicatorSet, IndicatorValues, TrendDirection};

/// Technical score in [0,100] for one indicator snapshot
pub fn technical_score(indicators: &IndicatorSet, current_price: f64) -> f64 {
    let trend_term = match indicators.trend {
        TrendDirection::Up => 40.0 * (indicators.strength / 100.0),
        TrendDirection::Down => 40.0 * (1.0 - indicators.strength / 100.0),
        TrendDirection::Sideways => 20.0,
    };

    let ma_term = ma_alignment_score(&indicators.indicators, current_price) * 0.3;
    let oscillator_term = oscillator_score(&indicators.indicators, current_price) * 0.3;

    (trend_term + ma_term + oscillator_term).clamp(0.0, 100.0)
}

fn ma_alignment_score(v: &IndicatorValues, current_price: f64) -> f64 {
    if current_price > v.ma5 && v.ma5 > v.ma10 && v.ma10 > v.ma20 && v.ma20 > v.ma60 {
        100.0
    } else if current_price < v.ma5 && v.ma5 < v.ma10 && v.ma10 < v.ma20 && v.ma20 < v.ma60 {
        0.0
    } else if current_price > v.ma5 && v.ma5 > v.ma10 {
        70.0
    } else if current_price < v.ma5 && v.ma5 < v.ma10 {
        30.0
    } else {
        50.0
    }
}

fn oscillator_score(v: &IndicatorValues, current_price: f64) -> f64 {
    let mut score = 0.0;

    if v.macd.value > v.macd.signal && v.macd.histogram > 0.0 {
        score += 25.0;
    } else if v.macd.value < v.macd.signal && v.macd.histogram < 0.0 {
        score += 0.0;
    } else {
        score += 12.5;
    }

    if v.rsi < 30.0 {
        score += 25.0;
    } else if v.rsi > 70.0 {
        score += 0.0;
    } else if v.rsi > 50.0 {
        score += 20.0;
    } else {
        score += 10.0;
    }

    if v.kdj.k > v.kdj.d && v.kdj.j > v.kdj.k {
        score += 25.0;
    } else if v.kdj.k < v.kdj.d && v.kdj.j < v.kdj.k {
        score += 0.0;
    } else {
        score += 12.5;
    }

    score += bollinger_position(&v.boll, current_price) / 100.0 * 25.0;

    score.min(100.0)
}

/// Where the price sits in the band, as a 0-100 reading: touching the upper
/// band is exhausted (0), touching the lower band is a rebound setup (100)
fn bollinger_position(boll: &BollingerValue, current_price: f64) -> f64 {
    if current_price >= boll.upper {
        0.0
    } else if current_price <= boll.lower {
        100.0
    } else if current_price > boll.middle {
        75.0
    } else {
        25.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{KdjValue, MacdValue};

    fn values(ma5: f64, ma10: f64, ma20: f64, ma60: f64) -> IndicatorValues {
        IndicatorValues {
            ma5,
            ma10,
            ma20,
            ma60,
            ma120: ma60,
            ma250: ma60,
            macd: MacdValue {
                value: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
            rsi: 50.0,
            kdj: KdjValue {
                k: 50.0,
                d: 50.0,
                j: 50.0,
            },
            boll: BollingerValue {
                upper: 11.0,
                middle: 10.0,
                lower: 9.0,
            },
        }
    }

    #[test]
    fn bull_stack_scores_full_alignment() {
        let v = values(10.4, 10.2, 10.0, 9.8);
        assert_eq!(ma_alignment_score(&v, 10.6), 100.0);
    }

    #[test]
    fn bear_stack_scores_zero_alignment() {
        let v = values(9.6, 9.8, 10.0, 10.2);
        assert_eq!(ma_alignment_score(&v, 9.4), 0.0);
    }

    #[test]
    fn flat_stack_scores_neutral_alignment() {
        let v = values(10.0, 10.0, 10.0, 10.0);
        assert_eq!(ma_alignment_score(&v, 10.0), 50.0);
    }

    #[test]
    fn band_position_maps_to_quarters() {
        let boll = BollingerValue {
            upper: 11.0,
            middle: 10.0,
            lower: 9.0,
        };
        assert_eq!(bollinger_position(&boll, 11.5), 0.0);
        assert_eq!(bollinger_position(&boll, 8.5), 100.0);
        assert_eq!(bollinger_position(&boll, 10.5), 75.0);
        assert_eq!(bollinger_position(&boll, 9.5), 25.0);
    }

    #[test]
    fn technical_score_stays_in_range() {
        use analysis_core::IndicatorSet;
        for (trend, strength) in [
            (TrendDirection::Up, 0.0),
            (TrendDirection::Up, 100.0),
            (TrendDirection::Down, 0.0),
            (TrendDirection::Down, 100.0),
            (TrendDirection::Sideways, 50.0),
        ] {
            let set = IndicatorSet {
                trend,
                strength,
                support: 9.5,
                resistance: 10.5,
                indicators: values(10.4, 10.2, 10.0, 9.8),
                signals: vec![],
            };
            let score = technical_score(&set, 10.6);
            assert!((0.0..=100.0).contains(&score));
        }
    }
}
