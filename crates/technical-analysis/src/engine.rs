use analysis_core::{
    AnalysisError, IndicatorSet, IndicatorValues, KdjValue, MacdValue, PricePoint, Signal,
    SignalGrade, SignalKind, TrendDirection,
};

use crate::indicators::*;

/// Computes the full [`IndicatorSet`] for one instrument from its ordered
/// price history. Pure; every call returns a fresh value.
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, prices: &[PricePoint]) -> Result<IndicatorSet, AnalysisError> {
        if prices.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 price points, got {}",
                prices.len()
            )));
        }
        for point in prices {
            if !(point.close.is_finite() && point.high.is_finite() && point.low.is_finite()) {
                return Err(AnalysisError::InvalidInput(format!(
                    "non-finite price on {}",
                    point.date
                )));
            }
        }

        let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
        let current_price = closes[closes.len() - 1];

        let ma5 = trailing_mean(&closes, 5);
        let ma10 = trailing_mean(&closes, 10);
        let ma20 = trailing_mean(&closes, 20);
        let ma60 = trailing_mean(&closes, 60);
        let ma120 = trailing_mean(&closes, 120);
        let ma250 = trailing_mean(&closes, 250);

        let macd_latest = macd(&closes)
            .last()
            .copied()
            .unwrap_or(MacdValue { value: 0.0, signal: 0.0, histogram: 0.0 });

        // Short histories read neutral rather than failing; a full window is
        // needed for a meaningful oscillator reading.
        let rsi_latest = rsi(&closes, 14).last().copied().unwrap_or(50.0);
        let kdj_latest = kdj(prices, 9.min(prices.len()))
            .last()
            .copied()
            .unwrap_or(KdjValue { k: 50.0, d: 50.0, j: 50.0 });
        let boll_latest = bollinger(&closes, 20.min(closes.len()), 2.0)
            .last()
            .copied()
            .ok_or_else(|| AnalysisError::InsufficientData("empty bollinger window".into()))?;

        let trend = determine_trend(current_price, ma5, ma10, ma20);
        let strength = trend_strength(&closes, trend);

        let window60 = &closes[closes.len().saturating_sub(60)..];
        let support = window60.iter().copied().fold(f64::INFINITY, f64::min) * 0.95;
        let resistance = window60.iter().copied().fold(f64::NEG_INFINITY, f64::max) * 1.05;

        let signals = generate_signals(current_price, ma5, ma10, ma20, macd_latest, rsi_latest);

        Ok(IndicatorSet {
            trend,
            strength,
            support,
            resistance,
            indicators: IndicatorValues {
                ma5,
                ma10,
                ma20,
                ma60,
                ma120,
                ma250,
                macd: macd_latest,
                rsi: rsi_latest,
                kdj: kdj_latest,
                boll: boll_latest,
            },
            signals,
        })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of the last `period` values, falling back to the whole series when
/// the history is shorter than the window
fn trailing_mean(data: &[f64], period: usize) -> f64 {
    let window = &data[data.len().saturating_sub(period)..];
    window.iter().sum::<f64>() / window.len() as f64
}

fn determine_trend(current_price: f64, ma5: f64, ma10: f64, ma20: f64) -> TrendDirection {
    if current_price > ma5 && ma5 > ma10 && ma10 > ma20 {
        TrendDirection::Up
    } else if current_price < ma5 && ma5 < ma10 && ma10 < ma20 {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    }
}

/// |regression slope over the last 20 closes| x 100, boosted 1.2x when the
/// slope agrees with the trend direction, clamped to 100
fn trend_strength(closes: &[f64], trend: TrendDirection) -> f64 {
    let window = &closes[closes.len().saturating_sub(20)..];
    let s = slope(window);

    let mut strength = s.abs() * 100.0;
    if (trend == TrendDirection::Up && s > 0.0) || (trend == TrendDirection::Down && s < 0.0) {
        strength *= 1.2;
    }
    strength.min(100.0)
}

/// Independent signal rules; a period can emit zero, one, or several signals
/// of possibly conflicting type
fn generate_signals(
    current_price: f64,
    ma5: f64,
    ma10: f64,
    ma20: f64,
    macd: MacdValue,
    rsi: f64,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    if macd.value > macd.signal && macd.histogram > 0.0 {
        signals.push(Signal {
            kind: SignalKind::Buy,
            strength: SignalGrade::Medium,
            description: "MACD golden cross, momentum building".to_string(),
        });
    } else if macd.value < macd.signal && macd.histogram < 0.0 {
        signals.push(Signal {
            kind: SignalKind::Sell,
            strength: SignalGrade::Medium,
            description: "MACD dead cross, momentum fading".to_string(),
        });
    }

    if rsi < 30.0 {
        signals.push(Signal {
            kind: SignalKind::Buy,
            strength: SignalGrade::Strong,
            description: "RSI oversold, rebound likely".to_string(),
        });
    } else if rsi > 70.0 {
        signals.push(Signal {
            kind: SignalKind::Sell,
            strength: SignalGrade::Strong,
            description: "RSI overbought, pullback risk".to_string(),
        });
    }

    if current_price > ma5 && ma5 > ma10 && ma10 > ma20 {
        signals.push(Signal {
            kind: SignalKind::Buy,
            strength: SignalGrade::Strong,
            description: "Bullish moving-average alignment".to_string(),
        });
    } else if current_price < ma5 && ma5 < ma10 && ma10 < ma20 {
        signals.push(Signal {
            kind: SignalKind::Sell,
            strength: SignalGrade::Strong,
            description: "Bearish moving-average alignment".to_string(),
        });
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(day: u32, close: f64) -> PricePoint {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day as i64);
        PricePoint {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000_000.0,
            turnover: close * 1_000_000.0,
        }
    }

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| point(i as u32, c))
            .collect()
    }

    #[test]
    fn empty_history_is_an_error() {
        let engine = IndicatorEngine::new();
        assert!(matches!(
            engine.compute(&[]),
            Err(AnalysisError::InsufficientData(_))
        ));
        assert!(matches!(
            engine.compute(&[point(0, 10.0)]),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let mut prices = series(&[10.0; 30]);
        prices[5].close = f64::NAN;
        let engine = IndicatorEngine::new();
        assert!(matches!(
            engine.compute(&prices),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn flat_series_reads_neutral() {
        let prices = series(&[10.0; 300]);
        let set = IndicatorEngine::new().compute(&prices).unwrap();

        assert_eq!(set.trend, TrendDirection::Sideways);
        assert!(set.strength.abs() < 1e-9);
        assert!((set.support - 9.5).abs() < 1e-9);
        assert!((set.resistance - 10.5).abs() < 1e-9);
        assert!((set.indicators.rsi - 50.0).abs() < 1e-9);
        assert!(set.signals.is_empty());
        assert!((set.indicators.ma250 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn steady_uptrend_reads_up_with_buy_alignment() {
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + i as f64 * 0.5).collect();
        let set = IndicatorEngine::new().compute(&series(&closes)).unwrap();

        assert_eq!(set.trend, TrendDirection::Up);
        assert!(set.strength > 0.0);
        assert!(set
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::Buy && s.strength == SignalGrade::Strong));
        // a persistent uptrend pins RSI at the top
        assert!(set.indicators.rsi > 70.0);
    }

    #[test]
    fn long_series_outputs_are_finite() {
        // oscillating but deterministic series, 300 points
        let closes: Vec<f64> = (0..300)
            .map(|i| 100.0 + 10.0 * ((i as f64) * 0.37).sin() + i as f64 * 0.01)
            .collect();
        let set = IndicatorEngine::new().compute(&series(&closes)).unwrap();

        let v = &set.indicators;
        for value in [
            v.ma5, v.ma10, v.ma20, v.ma60, v.ma120, v.ma250, v.macd.value, v.macd.signal,
            v.macd.histogram, v.rsi, v.kdj.k, v.kdj.d, v.kdj.j, v.boll.upper, v.boll.middle,
            v.boll.lower, set.strength, set.support, set.resistance,
        ] {
            assert!(value.is_finite());
        }
        assert!((0.0..=100.0).contains(&v.rsi));
    }

    #[test]
    fn downtrend_emits_bearish_alignment() {
        let closes: Vec<f64> = (0..120).map(|i| 200.0 - i as f64 * 0.8).collect();
        let set = IndicatorEngine::new().compute(&series(&closes)).unwrap();

        assert_eq!(set.trend, TrendDirection::Down);
        assert!(set
            .signals
            .iter()
            .any(|s| s.kind == SignalKind::Sell && s.strength == SignalGrade::Strong));
    }
}
