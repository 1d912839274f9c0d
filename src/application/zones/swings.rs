use crate::domain::zones::SwingPoints;
use serde::{Deserialize, Serialize};

/// A pluggable algorithm for locating local extrema within a zone.
///
/// Implementations receive the zone's high/low slices and return
/// zone-relative offsets of confirmed peaks and troughs.
pub trait SwingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn find_swings(&self, highs: &[f64], lows: &[f64]) -> SwingPoints;
}

/// Serializable strategy selection for configs and the builder API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SwingStrategyKind {
    ZigZag {
        reversal_pct: f64,
    },
    FindPeaks {
        min_distance: usize,
        min_prominence_pct: f64,
    },
    PivotPoints {
        left: usize,
        right: usize,
    },
}

impl Default for SwingStrategyKind {
    fn default() -> Self {
        SwingStrategyKind::ZigZag { reversal_pct: 0.02 }
    }
}

impl SwingStrategyKind {
    pub fn build(&self) -> Box<dyn SwingStrategy> {
        match self {
            SwingStrategyKind::ZigZag { reversal_pct } => Box::new(ZigZag {
                reversal_pct: *reversal_pct,
            }),
            SwingStrategyKind::FindPeaks {
                min_distance,
                min_prominence_pct,
            } => Box::new(FindPeaks {
                min_distance: (*min_distance).max(1),
                min_prominence_pct: *min_prominence_pct,
            }),
            SwingStrategyKind::PivotPoints { left, right } => Box::new(PivotPoints {
                left: (*left).max(1),
                right: (*right).max(1),
            }),
        }
    }
}

/// Classic ZigZag: a swing is confirmed once price reverses from the
/// running extreme by at least `reversal_pct`.
pub struct ZigZag {
    pub reversal_pct: f64,
}

impl SwingStrategy for ZigZag {
    fn name(&self) -> &'static str {
        "zigzag"
    }

    fn find_swings(&self, highs: &[f64], lows: &[f64]) -> SwingPoints {
        let n = highs.len().min(lows.len());
        let mut points = SwingPoints::default();
        if n < 2 {
            return points;
        }

        let up = 1.0 + self.reversal_pct;
        let down = 1.0 - self.reversal_pct;

        // direction: None until the first reversal fixes it
        let mut direction: Option<bool> = None;
        let mut ext_high = highs[0];
        let mut ext_high_i = 0usize;
        let mut ext_low = lows[0];
        let mut ext_low_i = 0usize;

        for i in 1..n {
            match direction {
                None => {
                    if highs[i] > ext_high {
                        ext_high = highs[i];
                        ext_high_i = i;
                    }
                    if lows[i] < ext_low {
                        ext_low = lows[i];
                        ext_low_i = i;
                    }
                    if highs[i] >= ext_low * up {
                        points.troughs.push(ext_low_i);
                        direction = Some(true);
                        ext_high = highs[i];
                        ext_high_i = i;
                    } else if lows[i] <= ext_high * down {
                        points.peaks.push(ext_high_i);
                        direction = Some(false);
                        ext_low = lows[i];
                        ext_low_i = i;
                    }
                }
                Some(true) => {
                    if highs[i] > ext_high {
                        ext_high = highs[i];
                        ext_high_i = i;
                    } else if lows[i] <= ext_high * down {
                        points.peaks.push(ext_high_i);
                        direction = Some(false);
                        ext_low = lows[i];
                        ext_low_i = i;
                    }
                }
                Some(false) => {
                    if lows[i] < ext_low {
                        ext_low = lows[i];
                        ext_low_i = i;
                    } else if highs[i] >= ext_low * up {
                        points.troughs.push(ext_low_i);
                        direction = Some(true);
                        ext_high = highs[i];
                        ext_high_i = i;
                    }
                }
            }
        }

        points
    }
}

/// Window-maximum peak scan with a prominence floor, scipy-style.
pub struct FindPeaks {
    pub min_distance: usize,
    pub min_prominence_pct: f64,
}

impl SwingStrategy for FindPeaks {
    fn name(&self) -> &'static str {
        "find_peaks"
    }

    fn find_swings(&self, highs: &[f64], lows: &[f64]) -> SwingPoints {
        let n = highs.len().min(lows.len());
        let d = self.min_distance;
        let mut points = SwingPoints::default();
        if n < 2 * d + 1 {
            return points;
        }

        for i in d..n - d {
            let lo = i - d;
            let hi = i + d;

            let is_window_max = (lo..=hi).all(|j| j == i || highs[j] < highs[i]);
            if is_window_max {
                let window_floor = (lo..=hi).map(|j| lows[j]).fold(f64::INFINITY, f64::min);
                if highs[i] > 0.0 && (highs[i] - window_floor) / highs[i] >= self.min_prominence_pct
                {
                    points.peaks.push(i);
                }
            }

            let is_window_min = (lo..=hi).all(|j| j == i || lows[j] > lows[i]);
            if is_window_min {
                let window_cap = (lo..=hi).map(|j| highs[j]).fold(f64::NEG_INFINITY, f64::max);
                if window_cap > 0.0 && (window_cap - lows[i]) / window_cap >= self.min_prominence_pct
                {
                    points.troughs.push(i);
                }
            }
        }

        points
    }
}

/// Strict pivot: a bar whose high tops every bar `left` back and `right`
/// forward (mirrored for troughs).
pub struct PivotPoints {
    pub left: usize,
    pub right: usize,
}

impl SwingStrategy for PivotPoints {
    fn name(&self) -> &'static str {
        "pivot_points"
    }

    fn find_swings(&self, highs: &[f64], lows: &[f64]) -> SwingPoints {
        let n = highs.len().min(lows.len());
        let mut points = SwingPoints::default();
        if n < self.left + self.right + 1 {
            return points;
        }

        for i in self.left..n - self.right {
            let left_ok = (i - self.left..i).all(|j| highs[j] < highs[i]);
            let right_ok = (i + 1..=i + self.right).all(|j| highs[j] < highs[i]);
            if left_ok && right_ok {
                points.peaks.push(i);
            }

            let left_ok = (i - self.left..i).all(|j| lows[j] > lows[i]);
            let right_ok = (i + 1..=i + self.right).all(|j| lows[j] > lows[i]);
            if left_ok && right_ok {
                points.troughs.push(i);
            }
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One clean swing up to index 3, down to 6, up again
    fn wave() -> (Vec<f64>, Vec<f64>) {
        let closes = [100.0, 103.0, 106.0, 110.0, 105.0, 101.0, 97.0, 101.0, 105.0];
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.5).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.5).collect();
        (highs, lows)
    }

    #[test]
    fn test_zigzag_finds_peak_and_trough() {
        let (highs, lows) = wave();
        let points = ZigZag { reversal_pct: 0.03 }.find_swings(&highs, &lows);

        assert_eq!(points.peaks, vec![3]);
        assert_eq!(points.troughs, vec![0, 6]);
    }

    #[test]
    fn test_zigzag_ignores_small_wiggles() {
        let highs = vec![100.0, 100.4, 100.1, 100.5, 100.2, 100.6];
        let lows: Vec<f64> = highs.iter().map(|h| h - 0.3).collect();
        let points = ZigZag { reversal_pct: 0.05 }.find_swings(&highs, &lows);
        assert_eq!(points.count(), 0);
    }

    #[test]
    fn test_find_peaks_window_max() {
        let (highs, lows) = wave();
        let points = FindPeaks {
            min_distance: 2,
            min_prominence_pct: 0.01,
        }
        .find_swings(&highs, &lows);

        assert_eq!(points.peaks, vec![3]);
        assert_eq!(points.troughs, vec![6]);
    }

    #[test]
    fn test_pivot_points() {
        let (highs, lows) = wave();
        let points = PivotPoints { left: 2, right: 2 }.find_swings(&highs, &lows);

        assert_eq!(points.peaks, vec![3]);
        assert_eq!(points.troughs, vec![6]);
    }

    #[test]
    fn test_short_input_is_empty() {
        let points = ZigZag { reversal_pct: 0.02 }.find_swings(&[100.0], &[99.0]);
        assert_eq!(points.count(), 0);
    }

    #[test]
    fn test_kind_builds_named_strategy() {
        let kind = SwingStrategyKind::default();
        assert_eq!(kind.build().name(), "zigzag");
    }
}
