pub mod builtin;
pub mod library;
pub mod preloaded;
pub mod registry;
pub mod spec;

pub use registry::{IndicatorRegistry, IndicatorSource};
pub use spec::IndicatorSpec;

use crate::domain::errors::IndicatorError;
use crate::domain::market::OhlcvSeries;

/// Named output columns of one indicator, aligned to the source series
/// (one value per bar, NaN during warm-up).
#[derive(Debug, Clone)]
pub struct IndicatorOutput {
    pub columns: Vec<(String, Vec<f64>)>,
}

/// A computable indicator.
///
/// Implementations either calculate values (builtin/library-backed) or
/// extract them from columns already present in the input (preloaded).
pub trait Indicator: Send + Sync {
    fn name(&self) -> String;

    fn output_columns(&self) -> Vec<String>;

    fn compute(&self, series: &OhlcvSeries) -> Result<IndicatorOutput, IndicatorError>;
}
