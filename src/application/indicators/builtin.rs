use super::{Indicator, IndicatorOutput};
use crate::domain::errors::IndicatorError;
use crate::domain::market::OhlcvSeries;

/// Simple moving average over closes. NaN until the window is full.
pub struct SmaIndicator {
    period: usize,
}

impl SmaIndicator {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameters {
                indicator: "sma".to_string(),
                reason: "period must be > 0".to_string(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for SmaIndicator {
    fn name(&self) -> String {
        format!("sma_{}", self.period)
    }

    fn output_columns(&self) -> Vec<String> {
        vec![self.name()]
    }

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError> {
        if series.len() < self.period {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name(),
                need: self.period,
                have: series.len(),
            });
        }

        let closes = series.closes();
        let mut out = vec![f64::NAN; closes.len()];
        let mut window_sum = 0.0;

        for (i, close) in closes.iter().enumerate() {
            window_sum += close;
            if i >= self.period {
                window_sum -= closes[i - self.period];
            }
            if i >= self.period - 1 {
                out[i] = window_sum / self.period as f64;
            }
        }

        Ok(IndicatorOutput {
            columns: vec![(self.name(), out)],
        })
    }
}

/// Exponential moving average over closes, seeded with the SMA of the
/// first window.
pub struct EmaIndicator {
    period: usize,
}

impl EmaIndicator {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameters {
                indicator: "ema".to_string(),
                reason: "period must be > 0".to_string(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for EmaIndicator {
    fn name(&self) -> String {
        format!("ema_{}", self.period)
    }

    fn output_columns(&self) -> Vec<String> {
        vec![self.name()]
    }

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError> {
        if series.len() < self.period {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name(),
                need: self.period,
                have: series.len(),
            });
        }

        let closes = series.closes();
        let mut out = vec![f64::NAN; closes.len()];
        let alpha = 2.0 / (self.period as f64 + 1.0);

        let seed: f64 = closes[..self.period].iter().sum::<f64>() / self.period as f64;
        out[self.period - 1] = seed;

        let mut prev = seed;
        for i in self.period..closes.len() {
            prev = alpha * closes[i] + (1.0 - alpha) * prev;
            out[i] = prev;
        }

        Ok(IndicatorOutput {
            columns: vec![(self.name(), out)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{OhlcvBar, Timeframe};
    use chrono::{TimeZone, Utc};

    fn series(closes: &[f64]) -> OhlcvSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                OhlcvBar::new(
                    Utc.timestamp_opt(i as i64 * 3600, 0).unwrap(),
                    *c,
                    c + 1.0,
                    c - 1.0,
                    *c,
                    10.0,
                )
            })
            .collect();
        OhlcvSeries::new("TEST", Timeframe::OneHour, bars)
    }

    #[test]
    fn test_sma_known_values() {
        let s = series(&[2.0, 4.0, 6.0, 8.0]);
        let out = SmaIndicator::new(2).unwrap().compute(&s).unwrap();
        let (_, values) = &out.columns[0];

        assert!(values[0].is_nan());
        assert_eq!(values[1], 3.0);
        assert_eq!(values[2], 5.0);
        assert_eq!(values[3], 7.0);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let s = series(&[1.0, 2.0]);
        let err = SmaIndicator::new(5).unwrap().compute(&s).unwrap_err();
        assert!(err.to_string().contains("need 5"));
    }

    #[test]
    fn test_ema_seeds_with_sma() {
        let s = series(&[2.0, 4.0, 6.0, 8.0]);
        let out = EmaIndicator::new(3).unwrap().compute(&s).unwrap();
        let (_, values) = &out.columns[0];

        assert!(values[0].is_nan());
        assert!(values[1].is_nan());
        assert!((values[2] - 4.0).abs() < 1e-12);
        // alpha = 0.5: 0.5*8 + 0.5*4 = 6
        assert!((values[3] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(SmaIndicator::new(0).is_err());
        assert!(EmaIndicator::new(0).is_err());
    }
}
