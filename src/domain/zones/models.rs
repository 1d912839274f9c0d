use crate::domain::market::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a zone by the sign/state of its detection column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Bull,
    Bear,
}

impl ZoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Bull => "bull",
            ZoneKind::Bear => "bear",
        }
    }

    pub fn opposite(&self) -> ZoneKind {
        match self {
            ZoneKind::Bull => ZoneKind::Bear,
            ZoneKind::Bear => ZoneKind::Bull,
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contiguous segment of the series classified by indicator sign/state.
///
/// Indices are inclusive positions into the source series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub id: String,
    pub kind: ZoneKind,
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_bars: usize,
    pub features: Option<ZoneFeatures>,
}

impl ZoneInfo {
    pub fn new(
        seq: usize,
        kind: ZoneKind,
        start_index: usize,
        end_index: usize,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("{}-{}", seq, kind),
            kind,
            start_index,
            end_index,
            start_time,
            end_time,
            duration_bars: end_index - start_index + 1,
            features: None,
        }
    }

    /// Signed close-to-close return of the zone, if features were extracted.
    pub fn price_return(&self) -> Option<f64> {
        self.features.as_ref().map(|f| f.price_return)
    }
}

/// Swing points located within a zone by the active swing strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwingPoints {
    /// Bar offsets (zone-relative) of confirmed local highs
    pub peaks: Vec<usize>,
    /// Bar offsets (zone-relative) of confirmed local lows
    pub troughs: Vec<usize>,
}

impl SwingPoints {
    pub fn count(&self) -> usize {
        self.peaks.len() + self.troughs.len()
    }
}

/// Per-zone metrics extracted by the features analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneFeatures {
    pub duration_bars: usize,
    /// Close-to-close return over the zone, as a fraction
    pub price_return: f64,
    pub abs_return: f64,
    /// Largest trough-to-peak advance inside the zone, as a fraction
    pub max_rally_pct: f64,
    /// Largest peak-to-trough decline inside the zone, as a fraction
    pub max_drawdown_pct: f64,
    /// Max minus min of the detection column inside the zone
    pub hist_amplitude: f64,
    /// Detection-column value of largest magnitude inside the zone
    pub hist_peak: f64,
    /// Pearson correlation between close and the detection column.
    /// None when either side has no variance.
    pub price_hist_corr: Option<f64>,
    pub swing_count: usize,
    pub avg_rally_pct: Option<f64>,
    pub avg_drop_pct: Option<f64>,
    pub largest_swing_pct: Option<f64>,
    pub divergence_count: usize,
    /// Zone return volatility relative to the whole series; None for
    /// one-bar zones or a flat baseline
    pub volatility_score: Option<f64>,
    /// Mean zone volume over mean series volume; None when volume is absent
    pub volume_ratio: Option<f64>,
}

/// Aggregate statistics for one zone kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindStats {
    pub count: usize,
    pub mean_duration: f64,
    pub median_duration: f64,
    pub mean_return: f64,
    pub median_return: f64,
    /// Share of zones whose return has the sign the kind predicts
    pub win_rate: f64,
}

/// Aggregate statistics over all detected zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneStatistics {
    pub total_zones: usize,
    pub bull: KindStats,
    pub bear: KindStats,
}

impl ZoneStatistics {
    pub fn from_zones(zones: &[ZoneInfo]) -> Self {
        Self {
            total_zones: zones.len(),
            bull: Self::kind_stats(zones, ZoneKind::Bull),
            bear: Self::kind_stats(zones, ZoneKind::Bear),
        }
    }

    fn kind_stats(zones: &[ZoneInfo], kind: ZoneKind) -> KindStats {
        let durations: Vec<f64> = zones
            .iter()
            .filter(|z| z.kind == kind)
            .map(|z| z.duration_bars as f64)
            .collect();
        let returns: Vec<f64> = zones
            .iter()
            .filter(|z| z.kind == kind)
            .filter_map(|z| z.price_return())
            .collect();

        let wins = returns
            .iter()
            .filter(|r| match kind {
                ZoneKind::Bull => **r > 0.0,
                ZoneKind::Bear => **r < 0.0,
            })
            .count();
        let win_rate = if returns.is_empty() {
            0.0
        } else {
            wins as f64 / returns.len() as f64
        };

        KindStats {
            count: durations.len(),
            mean_duration: mean(&durations),
            median_duration: median(&durations),
            mean_return: mean(&returns),
            median_return: median(&returns),
            win_rate,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// One entry of the hypothesis-test battery.
///
/// `statistic`/`p_value` are None when the test was skipped on a
/// degenerate sample; `conclusion` says why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisTestResult {
    pub name: String,
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub adjusted_p: Option<f64>,
    pub significant: bool,
    pub sample_sizes: Vec<usize>,
    pub conclusion: String,
}

/// Bootstrap confidence interval for a mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapInterval {
    pub label: String,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence: f64,
    pub iterations: usize,
}

/// Full output of the hypothesis suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisReport {
    pub alpha: f64,
    pub results: Vec<HypothesisTestResult>,
    pub bootstrap: Vec<BootstrapInterval>,
}

/// OLS fit of zone return on zone shape features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSummary {
    pub intercept: f64,
    pub coefficients: Vec<(String, f64)>,
    pub r_squared: f64,
    pub n_samples: usize,
}

/// K-means clustering of zones by shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneClusteringResult {
    pub k: usize,
    /// Cluster label per zone, in zone order
    pub labels: Vec<usize>,
    pub cluster_sizes: Vec<usize>,
    pub mean_return_per_cluster: Vec<f64>,
}

/// Transition structure of the zone sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub bull_to_bull: usize,
    pub bull_to_bear: usize,
    pub bear_to_bull: usize,
    pub bear_to_bear: usize,
    /// P(next zone is same kind), over all transitions
    pub continuation_prob: Option<f64>,
    pub longest_bull_streak: usize,
    pub longest_bear_streak: usize,
}

/// Input provenance carried on every result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bar_count: usize,
    pub indicators: Vec<String>,
    pub detection: String,
    pub min_duration: usize,
    pub created_at: DateTime<Utc>,
}

/// The complete output of one zone-analysis run, fully serializable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneAnalysisResult {
    pub metadata: AnalysisMetadata,
    pub zones: Vec<ZoneInfo>,
    pub statistics: ZoneStatistics,
    pub sequence: SequenceSummary,
    pub hypothesis: Option<HypothesisReport>,
    pub clustering: Option<ZoneClusteringResult>,
    pub regression: Option<RegressionSummary>,
}
