use super::builtin::{EmaIndicator, SmaIndicator};
use super::library::{AtrIndicator, BollingerIndicator, MacdIndicator, RsiIndicator};
use super::preloaded::PreloadedIndicator;
use super::{Indicator, IndicatorSpec};
use crate::domain::errors::IndicatorError;
use std::fmt;

/// Where an indicator's values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorSource {
    Builtin,
    Library,
    Preloaded,
}

impl fmt::Display for IndicatorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndicatorSource::Builtin => "builtin",
            IndicatorSource::Library => "library",
            IndicatorSource::Preloaded => "preloaded",
        };
        write!(f, "{}", s)
    }
}

/// Catalog entry shown by `bquant indicators`.
#[derive(Debug, Clone)]
pub struct IndicatorDescriptor {
    pub name: &'static str,
    pub source: IndicatorSource,
    pub description: &'static str,
    pub default_spec: IndicatorSpec,
}

/// Maps indicator names/specs to concrete implementations.
pub struct IndicatorRegistry {
    entries: Vec<IndicatorDescriptor>,
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl IndicatorRegistry {
    pub fn with_defaults() -> Self {
        let entries = vec![
            IndicatorDescriptor {
                name: "sma",
                source: IndicatorSource::Builtin,
                description: "Simple moving average of closes",
                default_spec: IndicatorSpec::sma(20),
            },
            IndicatorDescriptor {
                name: "ema",
                source: IndicatorSource::Builtin,
                description: "Exponential moving average of closes",
                default_spec: IndicatorSpec::ema(20),
            },
            IndicatorDescriptor {
                name: "rsi",
                source: IndicatorSource::Library,
                description: "Relative Strength Index",
                default_spec: IndicatorSpec::rsi(14),
            },
            IndicatorDescriptor {
                name: "macd",
                source: IndicatorSource::Library,
                description: "MACD line, signal and histogram",
                default_spec: IndicatorSpec::macd(12, 26, 9),
            },
            IndicatorDescriptor {
                name: "bollinger",
                source: IndicatorSource::Library,
                description: "Bollinger Bands (upper/middle/lower)",
                default_spec: IndicatorSpec::bollinger(20, 2.0),
            },
            IndicatorDescriptor {
                name: "atr",
                source: IndicatorSource::Library,
                description: "Average True Range",
                default_spec: IndicatorSpec::atr(14),
            },
            IndicatorDescriptor {
                name: "preloaded",
                source: IndicatorSource::Preloaded,
                description: "Extracts an existing column from the input data",
                default_spec: IndicatorSpec::preloaded("macd_hist"),
            },
        ];
        Self { entries }
    }

    pub fn list(&self) -> &[IndicatorDescriptor] {
        &self.entries
    }

    /// Builds the concrete indicator for a spec, validating parameters.
    pub fn create(&self, spec: &IndicatorSpec) -> Result<Box<dyn Indicator>, IndicatorError> {
        match spec {
            IndicatorSpec::Sma { period } => Ok(Box::new(SmaIndicator::new(*period)?)),
            IndicatorSpec::Ema { period } => Ok(Box::new(EmaIndicator::new(*period)?)),
            IndicatorSpec::Rsi { period } => Ok(Box::new(RsiIndicator::new(*period)?)),
            IndicatorSpec::Macd { fast, slow, signal } => {
                Ok(Box::new(MacdIndicator::new(*fast, *slow, *signal)?))
            }
            IndicatorSpec::Bollinger { period, k } => {
                Ok(Box::new(BollingerIndicator::new(*period, *k)?))
            }
            IndicatorSpec::Atr { period } => Ok(Box::new(AtrIndicator::new(*period)?)),
            IndicatorSpec::Preloaded { source, rename } => {
                Ok(Box::new(PreloadedIndicator::new(source.clone(), rename.clone())))
            }
        }
    }

    /// Builds an indicator by catalog name with its default parameters.
    pub fn create_by_name(&self, name: &str) -> Result<Box<dyn Indicator>, IndicatorError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| IndicatorError::Unknown {
                name: name.to_string(),
            })?;
        self.create(&entry.default_spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_by_name() {
        let registry = IndicatorRegistry::with_defaults();
        let macd = registry.create_by_name("MACD").unwrap();
        assert_eq!(
            macd.output_columns(),
            vec!["macd", "macd_signal", "macd_hist"]
        );
    }

    #[test]
    fn test_unknown_name() {
        let registry = IndicatorRegistry::with_defaults();
        assert!(registry.create_by_name("vwap").is_err());
    }

    #[test]
    fn test_invalid_spec_rejected_at_create() {
        let registry = IndicatorRegistry::with_defaults();
        assert!(registry.create(&IndicatorSpec::macd(26, 12, 9)).is_err());
    }
}
