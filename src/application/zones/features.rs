use super::metrics::{DivergenceStrategy, VolatilityStrategy, VolumeStrategy, bar_returns, sample_std};
use super::swings::{SwingStrategy, SwingStrategyKind};
use crate::domain::errors::AnalysisError;
use crate::domain::market::OhlcvSeries;
use crate::domain::zones::{SwingPoints, ZoneFeatures, ZoneInfo};
use crate::application::statistics::descriptive::pearson;
use rayon::prelude::*;
use tracing::debug;

/// Whole-series reference values shared by every zone computation.
struct Baseline {
    return_std: f64,
    mean_volume: f64,
    has_volume: bool,
}

/// Extracts `ZoneFeatures` for each detected zone.
///
/// Swing detection is pluggable; divergence/volatility/volume metrics are
/// computed on top of the chosen strategy's output.
pub struct ZoneFeaturesAnalyzer {
    swing: Box<dyn SwingStrategy>,
    divergence: DivergenceStrategy,
    volatility: VolatilityStrategy,
    volume: VolumeStrategy,
}

impl ZoneFeaturesAnalyzer {
    pub fn new(swing_kind: &SwingStrategyKind) -> Self {
        Self {
            swing: swing_kind.build(),
            divergence: DivergenceStrategy,
            volatility: VolatilityStrategy,
            volume: VolumeStrategy,
        }
    }

    /// Computes and attaches features for every zone, in parallel.
    ///
    /// `detection` is the per-bar value series the zones were detected on
    /// (same length as the series).
    pub fn compute_all(
        &self,
        series: &OhlcvSeries,
        detection: &[f64],
        zones: &mut [ZoneInfo],
    ) -> Result<(), AnalysisError> {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let baseline = Baseline {
            return_std: sample_std(&bar_returns(&closes)).unwrap_or(0.0),
            mean_volume: if volumes.is_empty() {
                0.0
            } else {
                volumes.iter().sum::<f64>() / volumes.len() as f64
            },
            has_volume: series.has_volume(),
        };

        zones.par_iter_mut().for_each(|zone| {
            let range = zone.start_index..=zone.end_index;
            let features = self.compute_zone(
                zone,
                &closes[range.clone()],
                &highs[range.clone()],
                &lows[range.clone()],
                &volumes[range.clone()],
                &detection[range],
                &baseline,
            );
            zone.features = Some(features);
        });

        debug!("Extracted features for {} zones ({})", zones.len(), self.swing.name());
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn compute_zone(
        &self,
        zone: &ZoneInfo,
        closes: &[f64],
        highs: &[f64],
        lows: &[f64],
        volumes: &[f64],
        hist: &[f64],
        baseline: &Baseline,
    ) -> ZoneFeatures {
        let first = closes.first().copied().unwrap_or(0.0);
        let last = closes.last().copied().unwrap_or(0.0);
        let price_return = if first > 0.0 { (last - first) / first } else { 0.0 };

        let (max_rally_pct, max_drawdown_pct) = rally_and_drawdown(closes);

        let hist_max = hist.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let hist_min = hist.iter().copied().fold(f64::INFINITY, f64::min);
        let hist_amplitude = if hist_max.is_finite() && hist_min.is_finite() {
            hist_max - hist_min
        } else {
            0.0
        };
        let hist_peak = hist
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });

        let swings = self.swing.find_swings(highs, lows);
        let (avg_rally_pct, avg_drop_pct, largest_swing_pct) = swing_legs(&swings, highs, lows);

        ZoneFeatures {
            duration_bars: zone.duration_bars,
            price_return,
            abs_return: price_return.abs(),
            max_rally_pct,
            max_drawdown_pct,
            hist_amplitude,
            hist_peak,
            price_hist_corr: pearson(closes, hist),
            swing_count: swings.count(),
            avg_rally_pct,
            avg_drop_pct,
            largest_swing_pct,
            divergence_count: self.divergence.count(zone.kind, highs, lows, hist, &swings),
            volatility_score: self.volatility.score(closes, baseline.return_std),
            volume_ratio: if baseline.has_volume {
                self.volume.ratio(volumes, baseline.mean_volume)
            } else {
                None
            },
        }
    }
}

/// Largest trough-to-peak advance and peak-to-trough decline over a
/// close path, both as positive fractions.
fn rally_and_drawdown(closes: &[f64]) -> (f64, f64) {
    let mut peak = f64::NEG_INFINITY;
    let mut trough = f64::INFINITY;
    let mut max_rally = 0.0f64;
    let mut max_dd = 0.0f64;

    for &c in closes {
        if c > peak {
            peak = c;
        }
        if c < trough {
            trough = c;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - c) / peak);
        }
        if trough > 0.0 {
            max_rally = max_rally.max((c - trough) / trough);
        }
    }

    (max_rally, max_dd)
}

/// Average rally/drop leg sizes between alternating swing points.
fn swing_legs(
    swings: &SwingPoints,
    highs: &[f64],
    lows: &[f64],
) -> (Option<f64>, Option<f64>, Option<f64>) {
    // Merge pivots into index order: (offset, is_peak)
    let mut pivots: Vec<(usize, bool)> = swings
        .peaks
        .iter()
        .map(|i| (*i, true))
        .chain(swings.troughs.iter().map(|i| (*i, false)))
        .collect();
    pivots.sort_by_key(|(i, _)| *i);

    let mut rallies = Vec::new();
    let mut drops = Vec::new();

    for pair in pivots.windows(2) {
        let ((a, a_peak), (b, b_peak)) = (pair[0], pair[1]);
        match (a_peak, b_peak) {
            (false, true) if lows[a] > 0.0 => rallies.push((highs[b] - lows[a]) / lows[a]),
            (true, false) if highs[a] > 0.0 => drops.push((highs[a] - lows[b]) / highs[a]),
            _ => {} // same-kind neighbors carry no leg
        }
    }

    let avg = |v: &Vec<f64>| {
        if v.is_empty() {
            None
        } else {
            Some(v.iter().sum::<f64>() / v.len() as f64)
        }
    };

    let largest = rallies
        .iter()
        .chain(drops.iter())
        .copied()
        .fold(f64::NAN, f64::max);

    (
        avg(&rallies),
        avg(&drops),
        if largest.is_nan() { None } else { Some(largest) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::zones::detector::{DetectionRule, ZoneDetector};
    use crate::domain::market::{OhlcvBar, Timeframe};
    use crate::domain::zones::ZoneKind;
    use chrono::{TimeZone, Utc};

    fn series_from_closes(closes: &[f64], hist: Vec<f64>) -> OhlcvSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                OhlcvBar::new(
                    Utc.timestamp_opt(i as i64 * 3600, 0).unwrap(),
                    *c,
                    c + 0.5,
                    c - 0.5,
                    *c,
                    25.0,
                )
            })
            .collect();
        let mut s = OhlcvSeries::new("TEST", Timeframe::OneHour, bars);
        s.insert_column("macd_hist", hist).unwrap();
        s
    }

    #[test]
    fn test_features_attached_to_every_zone() {
        let closes = vec![100.0, 101.0, 102.0, 103.0, 102.0, 101.0, 100.0, 99.0];
        let hist = vec![0.1, 0.2, 0.3, 0.2, -0.1, -0.2, -0.3, -0.2];
        let series = series_from_closes(&closes, hist);

        let detector = ZoneDetector::new(DetectionRule::sign_of("macd_hist"), 2);
        let detection = detector.detection_values(&series).unwrap();
        let mut zones = detector.detect(&series).unwrap();
        assert_eq!(zones.len(), 2);

        let analyzer = ZoneFeaturesAnalyzer::new(&SwingStrategyKind::default());
        analyzer.compute_all(&series, &detection, &mut zones).unwrap();

        for z in &zones {
            let f = z.features.as_ref().unwrap();
            assert_eq!(f.duration_bars, z.duration_bars);
            assert!(f.volume_ratio.is_some());
        }

        let bull = zones.iter().find(|z| z.kind == ZoneKind::Bull).unwrap();
        let f = bull.features.as_ref().unwrap();
        assert!(f.price_return > 0.0);
        assert!((f.hist_amplitude - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_rally_and_drawdown() {
        let closes = vec![100.0, 110.0, 99.0, 104.5];
        let (rally, dd) = rally_and_drawdown(&closes);
        assert!((rally - 0.1).abs() < 1e-9); // 100 -> 110
        assert!((dd - 0.1).abs() < 1e-9); // 110 -> 99
    }

    #[test]
    fn test_constant_price_corr_is_none() {
        let closes = vec![100.0; 6];
        let hist = vec![0.1, 0.2, 0.3, 0.2, 0.1, 0.4];
        let series = series_from_closes(&closes, hist);

        let detector = ZoneDetector::new(DetectionRule::sign_of("macd_hist"), 2);
        let detection = detector.detection_values(&series).unwrap();
        let mut zones = detector.detect(&series).unwrap();

        let analyzer = ZoneFeaturesAnalyzer::new(&SwingStrategyKind::default());
        analyzer.compute_all(&series, &detection, &mut zones).unwrap();

        let f = zones[0].features.as_ref().unwrap();
        assert!(f.price_hist_corr.is_none());
    }
}
