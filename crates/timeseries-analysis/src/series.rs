//! Builds the per-period snapshot window the trend/risk analyzer consumes
//! from a price history, a fundamental report, and a market score.

use analysis_core::{
    AnalysisError, FundamentalReport, FundamentalSample, MarketSample, PerformanceSample,
    PricePoint, Sentiment, TechnicalSample, TimeSeriesSnapshot,
};
use technical_analysis::IndicatorEngine;

const TRADING_DAYS_PER_YEAR: f64 = 250.0;
const VOLATILITY_WINDOW: usize = 20;
const DRAWDOWN_WINDOW: usize = 60;

/// Daily window: `periods` back-periods plus today
pub fn build_daily_series(
    prices: &[PricePoint],
    report: &FundamentalReport,
    market_score: f64,
    periods: usize,
) -> Result<Vec<TimeSeriesSnapshot>, AnalysisError> {
    build_series(prices, report, market_score, periods, 1)
}

/// Weekly window, sampled every 5 trading days
pub fn build_weekly_series(
    prices: &[PricePoint],
    report: &FundamentalReport,
    market_score: f64,
    periods: usize,
) -> Result<Vec<TimeSeriesSnapshot>, AnalysisError> {
    build_series(prices, report, market_score, periods, 5)
}

/// Monthly window, sampled every 21 trading days
pub fn build_monthly_series(
    prices: &[PricePoint],
    report: &FundamentalReport,
    market_score: f64,
    periods: usize,
) -> Result<Vec<TimeSeriesSnapshot>, AnalysisError> {
    build_series(prices, report, market_score, periods, 21)
}

/// One snapshot per sampled day, each computed over the history prefix up to
/// that day. The most recent point is always included.
pub fn build_series(
    prices: &[PricePoint],
    report: &FundamentalReport,
    market_score: f64,
    periods: usize,
    stride: usize,
) -> Result<Vec<TimeSeriesSnapshot>, AnalysisError> {
    if stride == 0 {
        return Err(AnalysisError::InvalidInput("stride must be positive".into()));
    }
    if prices.len() < 3 {
        return Err(AnalysisError::InsufficientData(format!(
            "need at least 3 price points for a series window, got {}",
            prices.len()
        )));
    }

    let engine = IndicatorEngine::new();
    let end = prices.len() - 1;

    // sample indices back from today; prefixes shorter than 2 points are
    // dropped, so short histories yield a shorter window
    let indices: Vec<usize> = (0..=periods)
        .rev()
        .filter_map(|k| end.checked_sub(k * stride))
        .filter(|&i| i >= 1)
        .collect();
    if indices.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "history of {} points supports only {} sample(s) at stride {}",
            prices.len(),
            indices.len(),
            stride
        )));
    }

    let sentiment = if market_score >= 50.0 {
        Sentiment::Positive
    } else {
        Sentiment::Negative
    };

    let mut snapshots = Vec::with_capacity(indices.len());
    for (pos, &i) in indices.iter().enumerate() {
        let prefix = &prices[..=i];
        let indicators = engine.compute(prefix)?;

        let prev_index = if pos > 0 { indices[pos - 1] } else { i - 1 };
        let prev_close = prices[prev_index].close;
        let period_return = if prev_close != 0.0 {
            (prices[i].close - prev_close) / prev_close
        } else {
            0.0
        };

        snapshots.push(TimeSeriesSnapshot {
            date: prices[i].date,
            technical: TechnicalSample {
                trend: indicators.trend,
                strength: indicators.strength,
                signals: indicators.signals,
            },
            fundamental: FundamentalSample {
                score: report.quality.score,
                rating: report.quality.rating,
                highlights: report.quality.strengths.clone(),
            },
            market: MarketSample {
                sentiment,
                money_flow: market_score - 50.0,
            },
            performance: PerformanceSample {
                period_return,
                volatility: annualized_volatility(prefix),
                max_drawdown: max_drawdown(prefix),
            },
        });
    }

    Ok(snapshots)
}

/// Population stddev of the trailing daily returns, annualized
fn annualized_volatility(prices: &[PricePoint]) -> f64 {
    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    let returns: Vec<f64> = closes
        .windows(2)
        .filter_map(|w| {
            if w[0] != 0.0 {
                Some((w[1] - w[0]) / w[0])
            } else {
                None
            }
        })
        .collect();
    if returns.is_empty() {
        return 0.0;
    }

    let window = &returns[returns.len().saturating_sub(VOLATILITY_WINDOW)..];
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let variance = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / window.len() as f64;
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Largest peak-to-trough decline over the trailing window, as a fraction
fn max_drawdown(prices: &[PricePoint]) -> f64 {
    let window = &prices[prices.len().saturating_sub(DRAWDOWN_WINDOW)..];
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for point in window {
        peak = peak.max(point.close);
        if peak > 0.0 {
            worst = worst.max((peak - point.close) / peak);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{
        FinancialMetrics, GrowthMetrics, ProfitabilityMetrics, Quality, Rating, TrendDirection,
        ValuationMetrics,
    };
    use chrono::NaiveDate;

    fn report() -> FundamentalReport {
        FundamentalReport {
            valuation: ValuationMetrics {
                pe: 10.0,
                pb: 1.0,
                ps: 0.0,
                peg: 0.0,
                dividend_yield: 2.0,
            },
            profitability: ProfitabilityMetrics {
                roe: 18.0,
                roa: 9.0,
                gross_margin: 40.0,
                net_margin: 15.0,
                operating_margin: 20.0,
            },
            growth: GrowthMetrics {
                revenue_growth: 10.0,
                profit_growth: 10.0,
                asset_growth: 5.0,
                equity_growth: 5.0,
            },
            financial: FinancialMetrics {
                debt_ratio: 30.0,
                current_ratio: 2.0,
                quick_ratio: 1.5,
                interest_coverage: 5.0,
            },
            quality: Quality {
                score: 82.0,
                rating: Rating::A,
                strengths: vec!["ROE excellent".to_string()],
                weaknesses: vec![],
            },
        }
    }

    fn flat_prices(days: usize) -> Vec<PricePoint> {
        (0..days)
            .map(|i| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: 10.0,
                high: 10.0,
                low: 10.0,
                close: 10.0,
                volume: 1_000_000.0,
                turnover: 10_000_000.0,
            })
            .collect()
    }

    #[test]
    fn daily_window_has_periods_plus_one_points() {
        let prices = flat_prices(120);
        let series = build_daily_series(&prices, &report(), 60.0, 30).unwrap();
        assert_eq!(series.len(), 31);
    }

    #[test]
    fn flat_series_reads_calm() {
        let prices = flat_prices(120);
        let series = build_daily_series(&prices, &report(), 60.0, 30).unwrap();
        let last = series.last().unwrap();

        assert_eq!(last.technical.trend, TrendDirection::Sideways);
        assert!(last.performance.period_return.abs() < 1e-12);
        assert!(last.performance.volatility.abs() < 1e-12);
        assert!(last.performance.max_drawdown.abs() < 1e-12);
        assert_eq!(last.market.sentiment, Sentiment::Positive);
        assert!((last.market.money_flow - 10.0).abs() < 1e-9);
        assert!((last.fundamental.score - 82.0).abs() < 1e-9);
    }

    #[test]
    fn weekly_stride_samples_every_fifth_day() {
        let prices = flat_prices(120);
        let series = build_weekly_series(&prices, &report(), 40.0, 12).unwrap();
        assert_eq!(series.len(), 13);
        let gap = series[12].date - series[11].date;
        assert_eq!(gap.num_days(), 5);
        assert_eq!(series[0].market.sentiment, Sentiment::Negative);
    }

    #[test]
    fn short_history_is_rejected() {
        let prices = flat_prices(2);
        assert!(matches!(
            build_daily_series(&prices, &report(), 60.0, 30),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn short_history_truncates_the_window() {
        let prices = flat_prices(12);
        let series = build_daily_series(&prices, &report(), 60.0, 30).unwrap();
        assert!(series.len() >= 2);
        assert!(series.len() <= 12);
    }

    #[test]
    fn drawdown_captures_peak_to_trough() {
        let mut prices = flat_prices(80);
        for (i, point) in prices.iter_mut().enumerate() {
            let close = if i < 40 { 10.0 } else { 7.0 };
            point.close = close;
            point.high = close;
            point.low = close;
        }
        let series = build_daily_series(&prices, &report(), 60.0, 10).unwrap();
        let last = series.last().unwrap();
        assert!((last.performance.max_drawdown - 0.3).abs() < 1e-9);
    }
}
