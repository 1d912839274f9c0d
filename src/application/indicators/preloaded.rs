use super::{Indicator, IndicatorOutput};
use crate::domain::errors::IndicatorError;
use crate::domain::market::OhlcvSeries;
use tracing::debug;

/// An indicator variant that extracts values from columns already present
/// in the input data rather than computing them.
///
/// Useful when the data export carries precomputed indicator columns
/// (e.g. a charting-platform CSV with a `hist` column).
pub struct PreloadedIndicator {
    source: String,
    target: String,
}

impl PreloadedIndicator {
    pub fn new(source: impl Into<String>, rename: Option<String>) -> Self {
        let source = source.into();
        let target = rename.unwrap_or_else(|| source.clone());
        Self { source, target }
    }
}

impl Indicator for PreloadedIndicator {
    fn name(&self) -> String {
        format!("preloaded({})", self.source)
    }

    fn output_columns(&self) -> Vec<String> {
        vec![self.target.clone()]
    }

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError> {
        let values = series
            .values_of(&self.source)
            .ok_or_else(|| IndicatorError::MissingSourceColumn {
                column: self.source.clone(),
            })?;

        debug!(
            "Preloaded '{}' -> '{}' ({} values)",
            self.source,
            self.target,
            values.len()
        );

        Ok(IndicatorOutput {
            columns: vec![(self.target.clone(), values)],
        })
    }
}
