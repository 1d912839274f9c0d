//! Indicators backed by the `ta` crate, streamed bar by bar.

use super::{Indicator, IndicatorOutput};
use crate::domain::errors::IndicatorError;
use crate::domain::market::OhlcvSeries;
use ta::indicators::{
    AverageTrueRange, BollingerBands, MovingAverageConvergenceDivergence, RelativeStrengthIndex,
};
use ta::{DataItem, Next};

fn invalid(indicator: &str, reason: impl ToString) -> IndicatorError {
    IndicatorError::InvalidParameters {
        indicator: indicator.to_string(),
        reason: reason.to_string(),
    }
}

/// Relative Strength Index over closes.
pub struct RsiIndicator {
    period: usize,
}

impl RsiIndicator {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        // Construct once up front so bad parameters fail at build time
        RelativeStrengthIndex::new(period).map_err(|e| invalid("rsi", e))?;
        Ok(Self { period })
    }
}

impl Indicator for RsiIndicator {
    fn name(&self) -> String {
        "rsi".to_string()
    }

    fn output_columns(&self) -> Vec<String> {
        vec!["rsi".to_string()]
    }

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError> {
        let warm_up = self.period;
        if series.len() <= warm_up {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name(),
                need: warm_up + 1,
                have: series.len(),
            });
        }

        let mut rsi = RelativeStrengthIndex::new(self.period).map_err(|e| invalid("rsi", e))?;
        let mut out = vec![f64::NAN; series.len()];
        for (i, bar) in series.bars.iter().enumerate() {
            let value = rsi.next(bar.close);
            if i >= warm_up {
                out[i] = value;
            }
        }

        Ok(IndicatorOutput {
            columns: vec![("rsi".to_string(), out)],
        })
    }
}

/// MACD over closes: `macd`, `macd_signal` and `macd_hist` columns.
pub struct MacdIndicator {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        if fast >= slow {
            return Err(invalid(
                "macd",
                format!("fast period {} must be < slow period {}", fast, slow),
            ));
        }
        MovingAverageConvergenceDivergence::new(fast, slow, signal)
            .map_err(|e| invalid("macd", e))?;
        Ok(Self { fast, slow, signal })
    }

    fn warm_up(&self) -> usize {
        self.slow + self.signal - 2
    }
}

impl Indicator for MacdIndicator {
    fn name(&self) -> String {
        format!("macd({},{},{})", self.fast, self.slow, self.signal)
    }

    fn output_columns(&self) -> Vec<String> {
        vec![
            "macd".to_string(),
            "macd_signal".to_string(),
            "macd_hist".to_string(),
        ]
    }

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError> {
        let warm_up = self.warm_up();
        if series.len() <= warm_up {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name(),
                need: warm_up + 1,
                have: series.len(),
            });
        }

        let mut macd = MovingAverageConvergenceDivergence::new(self.fast, self.slow, self.signal)
            .map_err(|e| invalid("macd", e))?;

        let n = series.len();
        let mut line = vec![f64::NAN; n];
        let mut signal = vec![f64::NAN; n];
        let mut hist = vec![f64::NAN; n];

        for (i, bar) in series.bars.iter().enumerate() {
            let value = macd.next(bar.close);
            if i >= warm_up {
                line[i] = value.macd;
                signal[i] = value.signal;
                hist[i] = value.histogram;
            }
        }

        Ok(IndicatorOutput {
            columns: vec![
                ("macd".to_string(), line),
                ("macd_signal".to_string(), signal),
                ("macd_hist".to_string(), hist),
            ],
        })
    }
}

/// Bollinger Bands over closes: `bb_upper`, `bb_middle`, `bb_lower`.
pub struct BollingerIndicator {
    period: usize,
    k: f64,
}

impl BollingerIndicator {
    pub fn new(period: usize, k: f64) -> Result<Self, IndicatorError> {
        if k <= 0.0 {
            return Err(invalid("bollinger", "std dev multiplier must be > 0"));
        }
        BollingerBands::new(period, k).map_err(|e| invalid("bollinger", e))?;
        Ok(Self { period, k })
    }
}

impl Indicator for BollingerIndicator {
    fn name(&self) -> String {
        format!("bollinger({},{})", self.period, self.k)
    }

    fn output_columns(&self) -> Vec<String> {
        vec![
            "bb_upper".to_string(),
            "bb_middle".to_string(),
            "bb_lower".to_string(),
        ]
    }

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError> {
        let warm_up = self.period - 1;
        if series.len() <= warm_up {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name(),
                need: warm_up + 1,
                have: series.len(),
            });
        }

        let mut bb = BollingerBands::new(self.period, self.k).map_err(|e| invalid("bollinger", e))?;

        let n = series.len();
        let mut upper = vec![f64::NAN; n];
        let mut middle = vec![f64::NAN; n];
        let mut lower = vec![f64::NAN; n];

        for (i, bar) in series.bars.iter().enumerate() {
            let value = bb.next(bar.close);
            if i >= warm_up {
                upper[i] = value.upper;
                middle[i] = value.average;
                lower[i] = value.lower;
            }
        }

        Ok(IndicatorOutput {
            columns: vec![
                ("bb_upper".to_string(), upper),
                ("bb_middle".to_string(), middle),
                ("bb_lower".to_string(), lower),
            ],
        })
    }
}

/// Average True Range, fed full bars via `DataItem`.
pub struct AtrIndicator {
    period: usize,
}

impl AtrIndicator {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        AverageTrueRange::new(period).map_err(|e| invalid("atr", e))?;
        Ok(Self { period })
    }
}

impl Indicator for AtrIndicator {
    fn name(&self) -> String {
        format!("atr({})", self.period)
    }

    fn output_columns(&self) -> Vec<String> {
        vec!["atr".to_string()]
    }

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError> {
        let warm_up = self.period;
        if series.len() <= warm_up {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name(),
                need: warm_up + 1,
                have: series.len(),
            });
        }

        let mut atr = AverageTrueRange::new(self.period).map_err(|e| invalid("atr", e))?;
        let mut out = vec![f64::NAN; series.len()];

        for (i, bar) in series.bars.iter().enumerate() {
            let item = DataItem::builder()
                .open(bar.open)
                .high(bar.high)
                .low(bar.low)
                .close(bar.close)
                .volume(bar.volume)
                .build()
                .map_err(|e| IndicatorError::ComputeFailed {
                    indicator: self.name(),
                    index: i,
                    reason: e.to_string(),
                })?;
            let value = atr.next(&item);
            if i >= warm_up {
                out[i] = value;
            }
        }

        Ok(IndicatorOutput {
            columns: vec![("atr".to_string(), out)],
        })
    }
}
