pub mod thresholds;

pub use thresholds::{QualityWeights, ScoringThresholds, StepRule, StepTable};

use analysis_core::{
    AnalysisError, FinancialMetrics, FundamentalReport, FundamentalSnapshot, GrowthMetrics,
    ProfitabilityMetrics, Quality, Rating, ValuationMetrics,
};

/// Scores one fundamental snapshot into sub-scores and a composite quality
/// rating. Pure; thresholds are injected configuration.
pub struct FundamentalScorer {
    thresholds: ScoringThresholds,
}

impl FundamentalScorer {
    pub fn new() -> Self {
        Self {
            thresholds: ScoringThresholds::default(),
        }
    }

    pub fn with_thresholds(thresholds: ScoringThresholds) -> Self {
        Self { thresholds }
    }

    pub fn score(&self, snapshot: &FundamentalSnapshot) -> Result<FundamentalReport, AnalysisError> {
        validate(snapshot)?;

        let valuation = self.valuation_metrics(snapshot);
        let profitability = self.profitability_metrics(snapshot);
        let growth = self.growth_metrics(snapshot);
        let financial = self.financial_metrics(snapshot);
        let quality = self.quality(&valuation, &profitability, &growth, &financial);

        Ok(FundamentalReport {
            valuation,
            profitability,
            growth,
            financial,
            quality,
        })
    }

    fn valuation_metrics(&self, snapshot: &FundamentalSnapshot) -> ValuationMetrics {
        let ps = match snapshot.market_cap {
            Some(cap) if snapshot.revenue > 0.0 => cap / snapshot.revenue,
            _ => 0.0,
        };
        let peg = if snapshot.profit_growth > 0.0 {
            snapshot.pe / snapshot.profit_growth
        } else {
            0.0
        };

        ValuationMetrics {
            pe: snapshot.pe,
            pb: snapshot.pb,
            ps,
            peg,
            dividend_yield: snapshot.dividend_yield,
        }
    }

    fn profitability_metrics(&self, snapshot: &FundamentalSnapshot) -> ProfitabilityMetrics {
        let roa = if snapshot.total_assets > 0.0 {
            snapshot.net_profit / snapshot.total_assets * 100.0
        } else {
            0.0
        };
        let net_margin = if snapshot.revenue > 0.0 {
            snapshot.net_profit / snapshot.revenue * 100.0
        } else {
            0.0
        };

        ProfitabilityMetrics {
            roe: snapshot.roe,
            roa,
            gross_margin: snapshot.gross_margin,
            net_margin,
            operating_margin: snapshot.operating_margin,
        }
    }

    fn growth_metrics(&self, snapshot: &FundamentalSnapshot) -> GrowthMetrics {
        GrowthMetrics {
            revenue_growth: snapshot.revenue_growth,
            profit_growth: snapshot.profit_growth,
            asset_growth: snapshot.asset_growth,
            equity_growth: snapshot.equity_growth,
        }
    }

    fn financial_metrics(&self, snapshot: &FundamentalSnapshot) -> FinancialMetrics {
        let debt_ratio = if snapshot.total_assets > 0.0 {
            snapshot.total_liabilities / snapshot.total_assets * 100.0
        } else {
            0.0
        };

        FinancialMetrics {
            debt_ratio,
            current_ratio: snapshot.current_ratio,
            quick_ratio: snapshot.quick_ratio,
            interest_coverage: snapshot.interest_coverage,
        }
    }

    fn quality(
        &self,
        valuation: &ValuationMetrics,
        profitability: &ProfitabilityMetrics,
        growth: &GrowthMetrics,
        financial: &FinancialMetrics,
    ) -> Quality {
        let t = &self.thresholds;

        let pe_score = if valuation.pe > 0.0 { t.pe.score(valuation.pe) } else { 0.0 };
        let pb_score = if valuation.pb > 0.0 { t.pb.score(valuation.pb) } else { 0.0 };
        let valuation_score = (pe_score + pb_score) / 2.0;

        let roe_score = t.roe.score(profitability.roe);
        let margin_score = t.net_margin.score(profitability.net_margin);
        let profitability_score = (roe_score + margin_score) / 2.0;

        let avg_growth = (growth.revenue_growth + growth.profit_growth) / 2.0;
        let growth_score = t.growth.score(avg_growth);

        let debt_score = t.debt.score(financial.debt_ratio);
        let liquidity_score = t.liquidity.score(financial.current_ratio);
        let financial_score = (debt_score + liquidity_score) / 2.0;

        let score = (valuation_score * t.weights.valuation
            + profitability_score * t.weights.profitability
            + growth_score * t.weights.growth
            + financial_score * t.weights.financial)
            .clamp(0.0, 100.0)
            .round();

        let rating = if score >= 80.0 {
            Rating::A
        } else if score >= 60.0 {
            Rating::B
        } else if score >= 40.0 {
            Rating::C
        } else {
            Rating::D
        };

        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        if valuation.pe > 0.0 && valuation.pe < t.pe_reasonable {
            strengths.push("valuation reasonable".to_string());
        } else if valuation.pe > t.pe_stretched {
            weaknesses.push("valuation stretched".to_string());
        }

        if profitability.roe > t.roe_excellent {
            strengths.push("ROE excellent".to_string());
        } else if profitability.roe < t.roe_weak {
            weaknesses.push("ROE weak".to_string());
        }

        if growth.revenue_growth > t.growth_strong {
            strengths.push("revenue growth strong".to_string());
        } else if growth.revenue_growth < 0.0 {
            weaknesses.push("revenue contracting".to_string());
        }

        if financial.debt_ratio < t.debt_low {
            strengths.push("low leverage".to_string());
        } else if financial.debt_ratio > t.debt_high {
            weaknesses.push("high leverage".to_string());
        }

        Quality {
            score,
            rating,
            strengths,
            weaknesses,
        }
    }
}

impl Default for FundamentalScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(snapshot: &FundamentalSnapshot) -> Result<(), AnalysisError> {
    let fields = [
        ("pe", snapshot.pe),
        ("pb", snapshot.pb),
        ("roe", snapshot.roe),
        ("revenue", snapshot.revenue),
        ("netProfit", snapshot.net_profit),
        ("totalAssets", snapshot.total_assets),
        ("totalLiabilities", snapshot.total_liabilities),
        ("grossMargin", snapshot.gross_margin),
        ("operatingMargin", snapshot.operating_margin),
        ("currentRatio", snapshot.current_ratio),
        ("quickRatio", snapshot.quick_ratio),
        ("interestCoverage", snapshot.interest_coverage),
        ("dividendYield", snapshot.dividend_yield),
        ("revenueGrowth", snapshot.revenue_growth),
        ("profitGrowth", snapshot.profit_growth),
        ("assetGrowth", snapshot.asset_growth),
        ("equityGrowth", snapshot.equity_growth),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "non-finite fundamental field {}",
                name
            )));
        }
    }
    if let Some(cap) = snapshot.market_cap {
        if !cap.is_finite() {
            return Err(AnalysisError::InvalidInput(
                "non-finite fundamental field marketCap".to_string(),
            ));
        }
    }
    Ok(())
}
