use crate::domain::errors::AnalysisError;
use crate::domain::market::OhlcvSeries;
use crate::domain::zones::{ZoneInfo, ZoneKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// How bars are classified into bull/bear state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DetectionRule {
    /// Sign of a single column: positive = bull, negative = bear
    SignOf { column: String },
    /// One column above/below another (e.g. macd vs macd_signal)
    Crossover { fast: String, slow: String },
}

impl DetectionRule {
    pub fn sign_of(column: impl Into<String>) -> Self {
        DetectionRule::SignOf {
            column: column.into(),
        }
    }

    pub fn crossover(fast: impl Into<String>, slow: impl Into<String>) -> Self {
        DetectionRule::Crossover {
            fast: fast.into(),
            slow: slow.into(),
        }
    }
}

impl fmt::Display for DetectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionRule::SignOf { column } => write!(f, "sign_of({})", column),
            DetectionRule::Crossover { fast, slow } => write!(f, "crossover({},{})", fast, slow),
        }
    }
}

/// Detects contiguous bull/bear runs of the detection rule's state.
pub struct ZoneDetector {
    rule: DetectionRule,
    min_duration: usize,
}

impl ZoneDetector {
    pub fn new(rule: DetectionRule, min_duration: usize) -> Self {
        Self {
            rule,
            min_duration: min_duration.max(1),
        }
    }

    pub fn rule(&self) -> &DetectionRule {
        &self.rule
    }

    /// The per-bar value series the rule is judged on. For crossover rules
    /// this is the fast-slow spread, so downstream features (amplitude,
    /// divergence) have a single column to work with either way.
    pub fn detection_values(&self, series: &OhlcvSeries) -> Result<Vec<f64>, AnalysisError> {
        match &self.rule {
            DetectionRule::SignOf { column } => {
                series
                    .values_of(column)
                    .ok_or_else(|| AnalysisError::MissingDetectionColumn {
                        column: column.clone(),
                    })
            }
            DetectionRule::Crossover { fast, slow } => {
                let f = series
                    .values_of(fast)
                    .ok_or_else(|| AnalysisError::MissingDetectionColumn {
                        column: fast.clone(),
                    })?;
                let s = series
                    .values_of(slow)
                    .ok_or_else(|| AnalysisError::MissingDetectionColumn {
                        column: slow.clone(),
                    })?;
                Ok(f.iter().zip(s.iter()).map(|(a, b)| a - b).collect())
            }
        }
    }

    /// Walks the series once, emitting maximal runs of constant state.
    ///
    /// Zero/NaN bars carry no state: they close the current run and join
    /// no zone. Runs shorter than `min_duration` are discarded.
    pub fn detect(&self, series: &OhlcvSeries) -> Result<Vec<ZoneInfo>, AnalysisError> {
        let values = self.detection_values(series)?;

        let mut zones = Vec::new();
        let mut current: Option<(ZoneKind, usize)> = None;
        let mut seq = 0usize;

        for (i, v) in values.iter().enumerate() {
            let state = classify(*v);

            match (current, state) {
                (Some((kind, _)), Some(s)) if kind == s => {} // run continues
                (Some((kind, start)), _) => {
                    self.push_zone(series, &mut zones, &mut seq, kind, start, i - 1);
                    current = state.map(|s| (s, i));
                }
                (None, Some(s)) => {
                    current = Some((s, i));
                }
                (None, None) => {}
            }
        }

        if let Some((kind, start)) = current {
            self.push_zone(series, &mut zones, &mut seq, kind, start, values.len() - 1);
        }

        debug!(
            "Detected {} zones on {} with {}",
            zones.len(),
            series.symbol,
            self.rule
        );
        Ok(zones)
    }

    fn push_zone(
        &self,
        series: &OhlcvSeries,
        zones: &mut Vec<ZoneInfo>,
        seq: &mut usize,
        kind: ZoneKind,
        start: usize,
        end: usize,
    ) {
        let duration = end - start + 1;
        if duration < self.min_duration {
            debug!(
                "Discarding {} run of {} bar(s) at {} (< min_duration {})",
                kind, duration, start, self.min_duration
            );
            return;
        }

        // time_at is infallible here: start/end come from enumerate()
        let start_time = series.time_at(start).unwrap_or_default();
        let end_time = series.time_at(end).unwrap_or_default();

        zones.push(ZoneInfo::new(*seq, kind, start, end, start_time, end_time));
        *seq += 1;
    }
}

fn classify(value: f64) -> Option<ZoneKind> {
    if value.is_nan() {
        None
    } else if value > 0.0 {
        Some(ZoneKind::Bull)
    } else if value < 0.0 {
        Some(ZoneKind::Bear)
    } else {
        None
    }
}
