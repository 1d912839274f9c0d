use serde::{Deserialize, Serialize};
use std::fmt;

/// Declarative indicator request, TOML/JSON friendly.
///
/// ```toml
/// [[indicators]]
/// name = "macd"
/// fast = 12
/// slow = 26
/// signal = 9
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum IndicatorSpec {
    Sma {
        period: usize,
    },
    Ema {
        period: usize,
    },
    Rsi {
        period: usize,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        k: f64,
    },
    Atr {
        period: usize,
    },
    /// Extracts an already-present column instead of computing one
    Preloaded {
        source: String,
        #[serde(default)]
        rename: Option<String>,
    },
}

impl IndicatorSpec {
    pub fn sma(period: usize) -> Self {
        IndicatorSpec::Sma { period }
    }

    pub fn ema(period: usize) -> Self {
        IndicatorSpec::Ema { period }
    }

    pub fn rsi(period: usize) -> Self {
        IndicatorSpec::Rsi { period }
    }

    pub fn macd(fast: usize, slow: usize, signal: usize) -> Self {
        IndicatorSpec::Macd { fast, slow, signal }
    }

    pub fn bollinger(period: usize, k: f64) -> Self {
        IndicatorSpec::Bollinger { period, k }
    }

    pub fn atr(period: usize) -> Self {
        IndicatorSpec::Atr { period }
    }

    pub fn preloaded(source: impl Into<String>) -> Self {
        IndicatorSpec::Preloaded {
            source: source.into(),
            rename: None,
        }
    }

    /// Column names this spec will attach to the series.
    pub fn output_columns(&self) -> Vec<String> {
        match self {
            IndicatorSpec::Sma { period } => vec![format!("sma_{}", period)],
            IndicatorSpec::Ema { period } => vec![format!("ema_{}", period)],
            IndicatorSpec::Rsi { .. } => vec!["rsi".to_string()],
            IndicatorSpec::Macd { .. } => vec![
                "macd".to_string(),
                "macd_signal".to_string(),
                "macd_hist".to_string(),
            ],
            IndicatorSpec::Bollinger { .. } => vec![
                "bb_upper".to_string(),
                "bb_middle".to_string(),
                "bb_lower".to_string(),
            ],
            IndicatorSpec::Atr { .. } => vec!["atr".to_string()],
            IndicatorSpec::Preloaded { source, rename } => {
                vec![rename.clone().unwrap_or_else(|| source.clone())]
            }
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorSpec::Sma { period } => write!(f, "sma({})", period),
            IndicatorSpec::Ema { period } => write!(f, "ema({})", period),
            IndicatorSpec::Rsi { period } => write!(f, "rsi({})", period),
            IndicatorSpec::Macd { fast, slow, signal } => {
                write!(f, "macd({},{},{})", fast, slow, signal)
            }
            IndicatorSpec::Bollinger { period, k } => write!(f, "bollinger({},{})", period, k),
            IndicatorSpec::Atr { period } => write!(f, "atr({})", period),
            IndicatorSpec::Preloaded { source, rename } => match rename {
                Some(r) => write!(f, "preloaded({} as {})", source, r),
                None => write!(f, "preloaded({})", source),
            },
        }
    }
}
