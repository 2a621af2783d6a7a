//! Scoring threshold tables.
//!
//! Every sub-score is a piecewise step function over its metric; the bands
//! live here as data so they can be tuned and tested independently of the
//! scorer.

/// One band of a step table
#[derive(Debug, Clone, Copy)]
pub struct StepRule {
    pub bound: f64,
    pub score: f64,
}

/// Piecewise step function, bands evaluated top to bottom
#[derive(Debug, Clone)]
pub enum StepTable {
    /// First band with `metric <= bound` wins (bounds ascending)
    AtMost { rows: Vec<StepRule>, default: f64 },
    /// First band with `metric >= bound` wins (bounds descending)
    AtLeast { rows: Vec<StepRule>, default: f64 },
}

impl StepTable {
    pub fn at_most(rows: &[(f64, f64)], default: f64) -> Self {
        StepTable::AtMost {
            rows: rows.iter().map(|&(bound, score)| StepRule { bound, score }).collect(),
            default,
        }
    }

    pub fn at_least(rows: &[(f64, f64)], default: f64) -> Self {
        StepTable::AtLeast {
            rows: rows.iter().map(|&(bound, score)| StepRule { bound, score }).collect(),
            default,
        }
    }

    pub fn score(&self, metric: f64) -> f64 {
        match self {
            StepTable::AtMost { rows, default } => rows
                .iter()
                .find(|r| metric <= r.bound)
                .map(|r| r.score)
                .unwrap_or(*default),
            StepTable::AtLeast { rows, default } => rows
                .iter()
                .find(|r| metric >= r.bound)
                .map(|r| r.score)
                .unwrap_or(*default),
        }
    }
}

/// Blend weights for the composite quality score
#[derive(Debug, Clone, Copy)]
pub struct QualityWeights {
    pub valuation: f64,
    pub profitability: f64,
    pub growth: f64,
    pub financial: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            valuation: 0.25,
            profitability: 0.30,
            growth: 0.25,
            financial: 0.20,
        }
    }
}

/// Full threshold configuration for the fundamental scorer.
///
/// The highlight bounds reuse band edges from the tables above them, so the
/// qualitative explanation can never disagree with the numeric score.
#[derive(Debug, Clone)]
pub struct ScoringThresholds {
    pub pe: StepTable,
    pub pb: StepTable,
    pub roe: StepTable,
    pub net_margin: StepTable,
    pub growth: StepTable,
    pub debt: StepTable,
    pub liquidity: StepTable,
    pub weights: QualityWeights,

    pub pe_reasonable: f64,
    pub pe_stretched: f64,
    pub roe_excellent: f64,
    pub roe_weak: f64,
    pub growth_strong: f64,
    pub debt_low: f64,
    pub debt_high: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            pe: StepTable::at_most(
                &[(10.0, 100.0), (15.0, 90.0), (20.0, 80.0), (30.0, 60.0)],
                40.0,
            ),
            pb: StepTable::at_most(
                &[(1.0, 100.0), (2.0, 90.0), (3.0, 80.0), (5.0, 60.0)],
                40.0,
            ),
            roe: StepTable::at_least(
                &[(20.0, 100.0), (15.0, 90.0), (10.0, 80.0), (5.0, 60.0)],
                40.0,
            ),
            net_margin: StepTable::at_least(
                &[(20.0, 100.0), (15.0, 90.0), (10.0, 80.0), (5.0, 60.0)],
                40.0,
            ),
            growth: StepTable::at_least(
                &[(30.0, 100.0), (20.0, 90.0), (10.0, 80.0), (0.0, 60.0)],
                40.0,
            ),
            debt: StepTable::at_most(
                &[(20.0, 100.0), (40.0, 90.0), (60.0, 80.0), (80.0, 60.0)],
                40.0,
            ),
            liquidity: StepTable::at_least(
                &[(3.0, 100.0), (2.0, 90.0), (1.5, 80.0), (1.0, 60.0)],
                40.0,
            ),
            weights: QualityWeights::default(),
            pe_reasonable: 15.0,
            pe_stretched: 30.0,
            roe_excellent: 15.0,
            roe_weak: 5.0,
            growth_strong: 20.0,
            debt_low: 30.0,
            debt_high: 70.0,
        }
    }
}
