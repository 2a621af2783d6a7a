pub mod rules;
pub mod scoring;

pub use rules::{category_rules, CategoryRule, CategoryVerdict, RuleInput};
pub use scoring::technical_score;

use analysis_core::{Classification, FundamentalReport, IndicatorSet, ScoreVector};

/// Blend weights for the overall classifier score
#[derive(Debug, Clone, Copy)]
pub struct ClassifierWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub market: f64,
}

impl Default for ClassifierWeights {
    fn default() -> Self {
        Self {
            technical: 0.4,
            fundamental: 0.3,
            market: 0.3,
        }
    }
}

/// Assigns a position category from indicator, fundamental, and market
/// scores via an ordered rule cascade
pub struct PositionClassifier {
    weights: ClassifierWeights,
}

impl PositionClassifier {
    pub fn new() -> Self {
        Self {
            weights: ClassifierWeights::default(),
        }
    }

    pub fn with_weights(weights: ClassifierWeights) -> Self {
        Self { weights }
    }

    pub fn classify(
        &self,
        indicators: &IndicatorSet,
        report: &FundamentalReport,
        market_score: f64,
        current_price: f64,
    ) -> Classification {
        let technical = technical_score(indicators, current_price);
        let fundamental = report.quality.score.clamp(0.0, 100.0);
        let market = market_score.clamp(0.0, 100.0);
        let overall = (technical * self.weights.technical
            + fundamental * self.weights.fundamental
            + market * self.weights.market)
            .clamp(0.0, 100.0);

        let input = RuleInput {
            overall,
            trend: indicators.trend,
            rating: report.quality.rating,
            dividend_yield: report.valuation.dividend_yield,
            support: indicators.support,
            resistance: indicators.resistance,
        };

        // first matching rule wins; the final rule matches everything
        let verdict = category_rules()
            .iter()
            .find(|rule| (rule.matches)(&input))
            .map(|rule| (rule.build)(&input))
            .unwrap_or_else(rules::observation_verdict);

        Classification {
            category: verdict.category,
            confidence: verdict.confidence,
            reasoning: verdict.reasoning,
            score: ScoreVector {
                technical,
                fundamental,
                market,
                overall,
            },
            recommendations: verdict.recommendations,
        }
    }
}

impl Default for PositionClassifier {
    fn default() -> Self {
        Self::new()
    }
}
