use crate::domain::errors::DataError;
use crate::domain::market::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single OHLCV bar.
///
/// Prices are f64: everything downstream (indicators, hypothesis tests,
/// regression) operates at the f64 boundary of the statistical libraries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High-low range of the bar
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// An ordered OHLCV series with named f64 columns attached alongside the bars.
///
/// Columns hold indicator output (or extra input columns picked up by the
/// loader) aligned one value per bar, NaN where a value is not defined yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcvSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bars: Vec<OhlcvBar>,
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl OhlcvSeries {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, bars: Vec<OhlcvBar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
            columns: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// True if any bar carries a non-zero volume.
    pub fn has_volume(&self) -> bool {
        self.bars.iter().any(|b| b.volume > 0.0)
    }

    pub fn time_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.bars.get(index).map(|b| b.timestamp)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    /// Attaches a named column. Length must match the bar count.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), DataError> {
        let name = name.into();
        if values.len() != self.bars.len() {
            return Err(DataError::ColumnLengthMismatch {
                column: name,
                expected: self.bars.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Copies a sub-series over an inclusive bar range, columns included.
    pub fn slice(&self, start: usize, end: usize) -> Option<OhlcvSeries> {
        if start > end || end >= self.bars.len() {
            return None;
        }
        let mut out = OhlcvSeries::new(
            self.symbol.clone(),
            self.timeframe,
            self.bars[start..=end].to_vec(),
        );
        for (name, values) in &self.columns {
            out.columns.insert(name.clone(), values[start..=end].to_vec());
        }
        Some(out)
    }

    /// Resolves a value source by name: a base OHLCV field or an attached column.
    pub fn values_of(&self, source: &str) -> Option<Vec<f64>> {
        match source.to_lowercase().as_str() {
            "open" => Some(self.opens()),
            "high" => Some(self.highs()),
            "low" => Some(self.lows()),
            "close" => Some(self.closes()),
            "volume" => Some(self.volumes()),
            _ => self.columns.get(source).cloned(),
        }
    }
}
