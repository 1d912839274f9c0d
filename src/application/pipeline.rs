use crate::application::indicators::{IndicatorRegistry, IndicatorSpec};
use crate::application::statistics::HypothesisTestSuite;
use crate::application::statistics::regression::fit_return_model;
use crate::application::zones::{
    DetectionRule, SwingStrategyKind, ZoneDetector, ZoneFeaturesAnalyzer, clustering, sequence,
};
use crate::domain::errors::{AnalysisError, PipelineError};
use crate::domain::market::OhlcvSeries;
use crate::domain::zones::models::AnalysisMetadata;
use crate::domain::zones::{ZoneAnalysisResult, ZoneStatistics};
use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Entry point of the builder-style analysis pipeline:
///
/// ```no_run
/// # use bquant::analyze_zones;
/// # use bquant::application::indicators::IndicatorSpec;
/// # use bquant::application::zones::DetectionRule;
/// # let series = bquant::infrastructure::samples::load("synthetic_trend").unwrap();
/// let result = analyze_zones(series)
///     .with_indicator(IndicatorSpec::macd(12, 26, 9))
///     .detect_zones(DetectionRule::sign_of("macd_hist"))
///     .with_hypothesis_tests(0.05)
///     .build()
///     .unwrap();
/// ```
pub fn analyze_zones(series: OhlcvSeries) -> ZoneAnalysisBuilder {
    ZoneAnalysisBuilder::new(series)
}

pub struct ZoneAnalysisBuilder {
    series: OhlcvSeries,
    indicators: Vec<IndicatorSpec>,
    rule: Option<DetectionRule>,
    swing: SwingStrategyKind,
    min_duration: usize,
    hypothesis_alpha: Option<f64>,
    bootstrap_iterations: usize,
    seed: u64,
    clustering_k: Option<usize>,
    regression: bool,
}

impl ZoneAnalysisBuilder {
    fn new(series: OhlcvSeries) -> Self {
        Self {
            series,
            indicators: Vec::new(),
            rule: None,
            swing: SwingStrategyKind::default(),
            min_duration: 2,
            hypothesis_alpha: None,
            bootstrap_iterations: 1000,
            seed: 42,
            clustering_k: None,
            regression: false,
        }
    }

    /// Adds an indicator to compute before detection. Repeatable; later
    /// indicators may read columns attached by earlier ones.
    pub fn with_indicator(mut self, spec: IndicatorSpec) -> Self {
        self.indicators.push(spec);
        self
    }

    pub fn detect_zones(mut self, rule: DetectionRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn with_swing_strategy(mut self, kind: SwingStrategyKind) -> Self {
        self.swing = kind;
        self
    }

    pub fn min_duration(mut self, bars: usize) -> Self {
        self.min_duration = bars;
        self
    }

    pub fn with_hypothesis_tests(mut self, alpha: f64) -> Self {
        self.hypothesis_alpha = Some(alpha);
        self
    }

    pub fn with_bootstrap(mut self, iterations: usize, seed: u64) -> Self {
        self.bootstrap_iterations = iterations;
        self.seed = seed;
        self
    }

    pub fn with_clustering(mut self, k: usize) -> Self {
        self.clustering_k = Some(k);
        self
    }

    pub fn with_regression(mut self) -> Self {
        self.regression = true;
        self
    }

    /// Runs the pipeline: indicators in declaration order, detection,
    /// feature extraction, then the optional statistical stages.
    pub fn build(mut self) -> Result<ZoneAnalysisResult, PipelineError> {
        let registry = IndicatorRegistry::with_defaults();
        let mut indicator_names = Vec::new();

        for spec in &self.indicators {
            let indicator = registry.create(spec)?;
            let output = indicator.compute(&self.series)?;
            for (name, values) in output.columns {
                self.series.insert_column(name, values)?;
            }
            indicator_names.push(spec.to_string());
        }

        let rule = match self.rule.take() {
            Some(rule) => rule,
            None if self.series.has_column("macd_hist") => DetectionRule::sign_of("macd_hist"),
            None => return Err(AnalysisError::NoDetectionRule.into()),
        };

        let detector = ZoneDetector::new(rule.clone(), self.min_duration);
        let detection = detector.detection_values(&self.series)?;
        let mut zones = detector.detect(&self.series)?;

        let analyzer = ZoneFeaturesAnalyzer::new(&self.swing);
        analyzer.compute_all(&self.series, &detection, &mut zones)?;

        let statistics = ZoneStatistics::from_zones(&zones);
        let seq = sequence::summarize(&zones);

        let hypothesis = self.hypothesis_alpha.map(|alpha| {
            HypothesisTestSuite::new(alpha, self.bootstrap_iterations, self.seed).run(&zones)
        });

        let cluster_result = match self.clustering_k {
            Some(k) => Some(clustering::cluster_zones(&zones, k)?),
            None => None,
        };

        let regression_result = if self.regression {
            Some(fit_return_model(&zones)?)
        } else {
            None
        };

        info!(
            "Zone analysis of {} finished: {} bars, {} zones",
            self.series.symbol,
            self.series.len(),
            zones.len()
        );

        Ok(ZoneAnalysisResult {
            metadata: AnalysisMetadata {
                symbol: self.series.symbol.clone(),
                timeframe: self.series.timeframe,
                bar_count: self.series.len(),
                indicators: indicator_names,
                detection: rule.to_string(),
                min_duration: self.min_duration,
                created_at: Utc::now(),
            },
            zones,
            statistics,
            sequence: seq,
            hypothesis,
            clustering: cluster_result,
            regression: regression_result,
        })
    }
}

/// A full analysis run described in TOML, as executed by the CLI.
///
/// ```toml
/// min_duration = 2
/// regression = true
///
/// [[indicators]]
/// name = "macd"
/// fast = 12
/// slow = 26
/// signal = 9
///
/// [detection]
/// rule = "sign_of"
/// column = "macd_hist"
///
/// [swing]
/// strategy = "zigzag"
/// reversal_pct = 0.02
///
/// [hypothesis]
/// alpha = 0.05
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub indicators: Vec<IndicatorSpec>,
    #[serde(default)]
    pub detection: Option<DetectionRule>,
    #[serde(default)]
    pub swing: Option<SwingStrategyKind>,
    #[serde(default = "default_min_duration")]
    pub min_duration: usize,
    #[serde(default)]
    pub hypothesis: Option<HypothesisConfig>,
    #[serde(default)]
    pub clustering_k: Option<usize>,
    #[serde(default)]
    pub regression: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_bootstrap_iterations")]
    pub bootstrap_iterations: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_min_duration() -> usize {
    2
}

fn default_alpha() -> f64 {
    0.05
}

fn default_bootstrap_iterations() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

/// Loads a `RunConfig` from a TOML file.
pub fn load_run_config(path: &Path) -> anyhow::Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read run config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid run config {}", path.display()))
}

/// Loads a TOML run config and executes it against a loaded series.
pub fn run_from_toml(series: OhlcvSeries, path: &Path) -> anyhow::Result<ZoneAnalysisResult> {
    let config = load_run_config(path)?;
    Ok(run_with_config(series, &config)?)
}

/// Executes a TOML-described run against a loaded series.
pub fn run_with_config(
    series: OhlcvSeries,
    config: &RunConfig,
) -> Result<ZoneAnalysisResult, PipelineError> {
    let mut builder = analyze_zones(series).min_duration(config.min_duration);

    for spec in &config.indicators {
        builder = builder.with_indicator(spec.clone());
    }
    if let Some(rule) = &config.detection {
        builder = builder.detect_zones(rule.clone());
    }
    if let Some(swing) = &config.swing {
        builder = builder.with_swing_strategy(swing.clone());
    }
    if let Some(h) = &config.hypothesis {
        builder = builder
            .with_hypothesis_tests(h.alpha)
            .with_bootstrap(h.bootstrap_iterations, h.seed);
    }
    if let Some(k) = config.clustering_k {
        builder = builder.with_clustering(k);
    }
    if config.regression {
        builder = builder.with_regression();
    }

    builder.build()
}
