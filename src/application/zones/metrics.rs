//! Divergence, volatility and volume metric strategies applied per zone.

use crate::domain::zones::{SwingPoints, ZoneKind};

/// Counts classic price/indicator divergences on the zone's swing points.
///
/// Bull zones are scanned for bearish divergence (higher price high,
/// lower indicator high); bear zones for the mirror case.
#[derive(Debug, Clone, Default)]
pub struct DivergenceStrategy;

impl DivergenceStrategy {
    pub fn count(
        &self,
        kind: ZoneKind,
        highs: &[f64],
        lows: &[f64],
        hist: &[f64],
        swings: &SwingPoints,
    ) -> usize {
        match kind {
            ZoneKind::Bull => swings
                .peaks
                .windows(2)
                .filter(|pair| {
                    let (a, b) = (pair[0], pair[1]);
                    b < highs.len() && b < hist.len() && highs[b] > highs[a] && hist[b] < hist[a]
                })
                .count(),
            ZoneKind::Bear => swings
                .troughs
                .windows(2)
                .filter(|pair| {
                    let (a, b) = (pair[0], pair[1]);
                    b < lows.len() && b < hist.len() && lows[b] < lows[a] && hist[b] > hist[a]
                })
                .count(),
        }
    }
}

/// Zone return volatility relative to a whole-series baseline.
#[derive(Debug, Clone, Default)]
pub struct VolatilityStrategy;

impl VolatilityStrategy {
    pub fn score(&self, zone_closes: &[f64], baseline_return_std: f64) -> Option<f64> {
        if zone_closes.len() < 3 || baseline_return_std <= f64::EPSILON {
            return None;
        }
        let returns = bar_returns(zone_closes);
        let std = sample_std(&returns)?;
        Some(std / baseline_return_std)
    }
}

/// Mean zone volume over mean series volume.
#[derive(Debug, Clone, Default)]
pub struct VolumeStrategy;

impl VolumeStrategy {
    pub fn ratio(&self, zone_volumes: &[f64], series_mean_volume: f64) -> Option<f64> {
        if zone_volumes.is_empty() || series_mean_volume <= f64::EPSILON {
            return None;
        }
        let mean = zone_volumes.iter().sum::<f64>() / zone_volumes.len() as f64;
        Some(mean / series_mean_volume)
    }
}

/// Simple close-to-close fractional returns.
pub fn bar_returns(closes: &[f64]) -> Vec<f64> {
    let mut returns = Vec::new();
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev > 0.0 {
            returns.push((closes[i] - prev) / prev);
        }
    }
    returns
}

/// Sample standard deviation (n-1); None for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}
