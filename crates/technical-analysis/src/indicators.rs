use analysis_core::{BollingerValue, KdjValue, MacdValue, PricePoint};

/// Simple Moving Average over trailing windows
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average seeded with the first price.
/// multiplier = 2/(period+1); ema[i] = price[i]*k + ema[i-1]*(1-k)
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push(data[i] * multiplier + prev * (1.0 - multiplier));
    }

    result
}

/// MACD(12,26,9): value = EMA12 - EMA26, signal = EMA9 of the value series,
/// histogram = value - signal. Full-length output, aligned with the input.
pub fn macd(data: &[f64]) -> Vec<MacdValue> {
    let ema12 = ema(data, 12);
    let ema26 = ema(data, 26);

    let values: Vec<f64> = ema12
        .iter()
        .zip(ema26.iter())
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = ema(&values, 9);

    values
        .iter()
        .zip(signal_line.iter())
        .map(|(&value, &signal)| MacdValue {
            value,
            signal,
            histogram: value - signal,
        })
        .collect()
}

/// RSI over trailing window-mean gains/losses.
/// A window with no movement at all reads neutral (50); a window with gains
/// but no losses reads 100.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);
    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut result = Vec::with_capacity(gains.len() - period + 1);
    for i in period - 1..gains.len() {
        let avg_gain: f64 = gains[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
        let avg_loss: f64 = losses[i + 1 - period..=i].iter().sum::<f64>() / period as f64;

        let value = if avg_gain == 0.0 && avg_loss == 0.0 {
            50.0
        } else if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
        result.push(value);
    }

    result
}

/// KDJ(9) from true window extremes:
/// RSV = (close - lowestLow)/(highestHigh - lowestLow) * 100, K and D
/// smoothed 2:1, J = 3K - 2D. A flat window reads RSV 50.
pub fn kdj(points: &[PricePoint], period: usize) -> Vec<KdjValue> {
    if period == 0 || points.len() < period {
        return vec![];
    }

    let mut result: Vec<KdjValue> = Vec::with_capacity(points.len() - period + 1);
    for i in period - 1..points.len() {
        let window = &points[i + 1 - period..=i];
        let highest = window.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);

        let rsv = if highest == lowest {
            50.0
        } else {
            (points[i].close - lowest) / (highest - lowest) * 100.0
        };

        let (k, d) = match result.last() {
            Some(prev) => {
                let k = (2.0 * prev.k + rsv) / 3.0;
                let d = (2.0 * prev.d + k) / 3.0;
                (k, d)
            }
            None => (rsv, rsv),
        };
        result.push(KdjValue {
            k,
            d,
            j: 3.0 * k - 2.0 * d,
        });
    }

    result
}

/// Bollinger Bands: middle = SMA(period), bands at +/- std_dev population
/// standard deviations of the window
pub fn bollinger(data: &[f64], period: usize, std_dev: f64) -> Vec<BollingerValue> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let middle = sma(data, period);
    let mut result = Vec::with_capacity(middle.len());
    for i in period - 1..data.len() {
        let window = &data[i + 1 - period..=i];
        let mean = middle[i + 1 - period];
        let variance: f64 =
            window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        result.push(BollingerValue {
            upper: mean + std_dev * std,
            middle: mean,
            lower: mean - std_dev * std,
        });
    }

    result
}

/// Least-squares slope of a series against its index
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let sum_x: f64 = (0..n).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_xx: f64 = (0..n).map(|i| (i * i) as f64).sum();

    let denominator = nf * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (nf * sum_xy - sum_x * sum_y) / denominator
}
