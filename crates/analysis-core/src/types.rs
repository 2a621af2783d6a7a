use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar with turnover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub turnover: f64,
}

/// Price trend over the evaluation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalGrade {
    Weak,
    Medium,
    Strong,
}

/// Discrete trading signal emitted by the indicator engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub strength: SignalGrade,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdjValue {
    pub k: f64,
    pub d: f64,
    pub j: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Latest value of each tracked indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValues {
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub ma120: f64,
    pub ma250: f64,
    pub macd: MacdValue,
    pub rsi: f64,
    pub kdj: KdjValue,
    pub boll: BollingerValue,
}

/// Per-instrument, per-evaluation-date technical snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub trend: TrendDirection,
    /// Trend strength, 0-100
    pub strength: f64,
    pub support: f64,
    pub resistance: f64,
    pub indicators: IndicatorValues,
    pub signals: Vec<Signal>,
}

/// Raw fundamental fields for one instrument.
///
/// Ratios the surrounding application estimates externally (dividend yield,
/// margins, liquidity, growth rates) arrive as inputs here; the scorer only
/// derives what follows arithmetically from the statement fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalSnapshot {
    pub pe: f64,
    pub pb: f64,
    pub roe: f64,
    pub revenue: f64,
    pub net_profit: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub gross_margin: f64,
    pub operating_margin: f64,
    pub current_ratio: f64,
    pub quick_ratio: f64,
    pub interest_coverage: f64,
    pub dividend_yield: f64,
    pub revenue_growth: f64,
    pub profit_growth: f64,
    pub asset_growth: f64,
    pub equity_growth: f64,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationMetrics {
    pub pe: f64,
    pub pb: f64,
    pub ps: f64,
    pub peg: f64,
    pub dividend_yield: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityMetrics {
    pub roe: f64,
    pub roa: f64,
    pub gross_margin: f64,
    pub net_margin: f64,
    pub operating_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthMetrics {
    pub revenue_growth: f64,
    pub profit_growth: f64,
    pub asset_growth: f64,
    pub equity_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub debt_ratio: f64,
    pub current_ratio: f64,
    pub quick_ratio: f64,
    pub interest_coverage: f64,
}

/// Letter rating for composite fundamental quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    A,
    B,
    C,
    D,
}

impl Rating {
    /// Numeric rank, higher is better
    pub fn rank(&self) -> u8 {
        match self {
            Rating::A => 3,
            Rating::B => 2,
            Rating::C => 1,
            Rating::D => 0,
        }
    }

    pub fn at_least(&self, other: Rating) -> bool {
        self.rank() >= other.rank()
    }
}

/// Composite fundamental quality: score, letter rating, and the qualitative
/// explanation derived from the same thresholds as the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    pub score: f64,
    pub rating: Rating,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Full fundamental scorer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalReport {
    pub valuation: ValuationMetrics,
    pub profitability: ProfitabilityMetrics,
    pub growth: GrowthMetrics,
    pub financial: FinancialMetrics,
    pub quality: Quality,
}

/// Per-dimension scores plus the weighted overall, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub technical: f64,
    pub fundamental: f64,
    pub market: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionCategory {
    Left,
    Right,
    Defensive,
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceAction {
    Buy,
    Sell,
    Hold,
    Watch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeAdvice {
    pub action: AdviceAction,
    pub reason: String,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
}

/// Classifier verdict for one instrument at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: PositionCategory,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub score: ScoreVector,
    pub recommendations: Vec<TradeAdvice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSample {
    pub trend: TrendDirection,
    pub strength: f64,
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSample {
    pub score: f64,
    pub rating: Rating,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSample {
    pub sentiment: Sentiment,
    pub money_flow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    #[serde(rename = "return")]
    pub period_return: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
}

/// One period's technical/fundamental/market/performance tuple; a window of
/// these is the unit the trend/risk analyzer consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSnapshot {
    pub date: NaiveDate,
    pub technical: TechnicalSample,
    pub fundamental: FundamentalSample,
    pub market: MarketSample,
    pub performance: PerformanceSample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendShift {
    Improving,
    Deteriorating,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub direction: TrendShift,
    pub momentum: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub mitigation: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentAction {
    Continue,
    Adjust,
    Rebalance,
    Replace,
}

/// Window-level adjustment advice from the trend/risk analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAdvice {
    pub action: AdjustmentAction,
    pub confidence: f64,
    pub reasoning: String,
    pub timeline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAnalysis {
    pub time_horizon: TimeHorizon,
    pub data_points: Vec<TimeSeriesSnapshot>,
    pub trend_analysis: TrendAnalysis,
    pub risk_assessment: RiskAssessment,
    pub recommendation: SeriesAdvice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedPosition {
    Left,
    Right,
    Mainline,
    Defensive,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionAction {
    Build,
    Add,
    Hold,
    Reduce,
    Exit,
    Upgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Conditional future trigger at which a position-size action becomes
/// recommended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeNode {
    pub date: NaiveDate,
    pub price: f64,
    pub condition: String,
    pub confidence: f64,
    pub action: String,
    pub priority: Priority,
}

/// Per-trigger-type time nodes; a missing trigger type is an empty list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeNodes {
    #[serde(default)]
    pub build_left: Vec<TimeNode>,
    #[serde(default)]
    pub upgrade_to_right: Vec<TimeNode>,
    #[serde(default)]
    pub upgrade_to_mainline: Vec<TimeNode>,
    #[serde(default)]
    pub add_position: Vec<TimeNode>,
    #[serde(default)]
    pub reduce_position: Vec<TimeNode>,
    #[serde(default)]
    pub exit: Vec<TimeNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizing {
    pub recommended_left_position: f64,
    pub recommended_right_position: f64,
    pub recommended_mainline_position: f64,
    pub max_position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderRung {
    pub price: f64,
    pub position_ratio: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskControl {
    pub stop_loss: f64,
    pub target_price: f64,
    pub position_ladder: Vec<LadderRung>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyNode {
    pub date: NaiveDate,
    pub event: String,
    pub impact: Priority,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendForecast {
    pub direction: TrendDirection,
    pub probability: f64,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub entry_signal: String,
    pub exit_signal: String,
    pub key_nodes: Vec<KeyNode>,
    pub trend_forecast: TrendForecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingStatus {
    pub is_held: bool,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub average_price: Option<f64>,
    pub current_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionAdvice {
    pub action: PositionAction,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub urgency: Urgency,
}

/// Full position-lifecycle recommendation for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecommendation {
    pub stock_code: String,
    pub stock_name: String,
    pub recommended_position: RecommendedPosition,
    pub current_status: HoldingStatus,
    pub recommendation: ActionAdvice,
    pub time_nodes: TimeNodes,
    pub position_size: PositionSizing,
    pub risk_control: RiskControl,
    pub prediction: Prediction,
}

/// Holdings-provider record for one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub stock_code: String,
    pub stock_name: String,
    pub quantity: f64,
    pub average_price: f64,
    pub current_price: f64,
    #[serde(default)]
    pub category: Option<RecommendedPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Continue,
    Buy,
    Sell,
    Reduce,
    Increase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDecision {
    pub stock_code: String,
    pub stock_name: String,
    pub current_category: PositionCategory,
    pub recommended_action: DecisionAction,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub position_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingAction {
    pub action: String,
    pub stock_code: String,
    pub reason: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAdjustment {
    pub left_side_ratio: f64,
    pub right_side_ratio: f64,
    pub defensive_ratio: f64,
    pub observation_ratio: f64,
    pub rebalancing_actions: Vec<RebalancingAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAssessment {
    pub portfolio_health: f64,
    pub risk_level: RiskLevel,
    pub expected_return: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSteps {
    pub immediate_actions: Vec<String>,
    pub watch_list: Vec<String>,
    pub alerts: Vec<String>,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedInstrument {
    pub stock_code: String,
    pub reason: String,
}

/// Portfolio-level decision artifact. Created once per generation call and
/// never mutated; a newer decision supersedes it under a fresh id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub decision_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub time_horizon: TimeHorizon,
    pub overall_assessment: OverallAssessment,
    pub position_decisions: Vec<PositionDecision>,
    pub portfolio_adjustment: PortfolioAdjustment,
    pub next_steps: NextSteps,
    #[serde(default)]
    pub skipped_instruments: Vec<SkippedInstrument>,
}
