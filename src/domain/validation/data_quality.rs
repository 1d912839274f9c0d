use crate::domain::errors::DataError;
use crate::domain::market::{OhlcvBar, Timeframe};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Centralized validator for OHLCV bar integrity.
///
/// Rejects bars that are physically impossible or highly suspect.
pub struct BarValidator;

impl BarValidator {
    /// Validates a bar. Returns the reason it is invalid, if any.
    pub fn check_bar(bar: &OhlcvBar) -> Option<String> {
        let prices = [bar.open, bar.high, bar.low, bar.close];

        if prices.iter().any(|p| !p.is_finite()) || !bar.volume.is_finite() {
            return Some("non-finite value".to_string());
        }
        if prices.iter().any(|p| *p <= 0.0) {
            return Some("non-positive price component".to_string());
        }
        if bar.low > bar.high {
            return Some(format!("low {} > high {}", bar.low, bar.high));
        }
        if bar.open < bar.low || bar.open > bar.high {
            return Some(format!("open {} outside [low, high]", bar.open));
        }
        if bar.close < bar.low || bar.close > bar.high {
            return Some(format!("close {} outside [low, high]", bar.close));
        }
        if bar.volume < 0.0 {
            return Some(format!("negative volume {}", bar.volume));
        }

        None
    }
}

/// Outcome of a data-quality pass over a bar sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub checked: usize,
    pub dropped: usize,
    pub gaps: usize,
    pub issues: Vec<String>,
}

impl DataQualityReport {
    pub fn is_clean(&self) -> bool {
        self.dropped == 0 && self.issues.is_empty()
    }
}

/// Runs the quality pass over `bars`.
///
/// Lenient mode drops invalid bars (with a warning each) and returns the
/// survivors; strict mode turns any issue into a `DataError`.
pub fn check_bars(
    symbol: &str,
    timeframe: Timeframe,
    bars: Vec<OhlcvBar>,
    strict: bool,
) -> Result<(Vec<OhlcvBar>, DataQualityReport), DataError> {
    let checked = bars.len();
    let mut kept = Vec::with_capacity(checked);
    let mut issues = Vec::new();

    for (i, bar) in bars.into_iter().enumerate() {
        match BarValidator::check_bar(&bar) {
            None => kept.push(bar),
            Some(reason) => {
                warn!(
                    "Quality check FAILED for {} bar {} ({}): {}",
                    symbol, i, bar.timestamp, reason
                );
                issues.push(format!("bar {}: {}", i, reason));
            }
        }
    }

    // Gap scan on the surviving bars
    let step = timeframe.to_seconds();
    let mut gaps = 0;
    for pair in kept.windows(2) {
        let delta = (pair[1].timestamp - pair[0].timestamp).num_seconds();
        if delta > step {
            gaps += 1;
        }
    }

    let report = DataQualityReport {
        checked,
        dropped: issues.len(),
        gaps,
        issues,
    };

    if strict && !report.is_clean() {
        return Err(DataError::QualityCheckFailed {
            symbol: symbol.to_string(),
            issues: report.dropped,
            first: report
                .issues
                .first()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }

    Ok((kept, report))
}
