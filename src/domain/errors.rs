use thiserror::Error;

/// Errors related to loading and validating market data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error in {path}: {reason}")]
    Csv { path: String, reason: String },

    #[error("Missing required column '{column}' (headers: {headers})")]
    MissingColumn { column: String, headers: String },

    #[error("Unparseable timestamp '{value}' at row {row}")]
    BadTimestamp { value: String, row: usize },

    #[error("Timestamps not strictly increasing at row {row}: {current} <= {previous}")]
    NonMonotonic {
        row: usize,
        current: String,
        previous: String,
    },

    #[error("Data quality check failed for {symbol}: {issues} issue(s), first: {first}")]
    QualityCheckFailed {
        symbol: String,
        issues: usize,
        first: String,
    },

    #[error("Column '{column}' has {actual} values, series has {expected} bars")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown sample dataset: {name}")]
    UnknownSample { name: String },

    #[error("Series is empty")]
    EmptySeries,
}

/// Errors related to indicator construction and computation
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Unknown indicator: {name}")]
    Unknown { name: String },

    #[error("Invalid parameters for {indicator}: {reason}")]
    InvalidParameters { indicator: String, reason: String },

    #[error("Insufficient data for {indicator}: need {need} bars, have {have}")]
    InsufficientData {
        indicator: String,
        need: usize,
        have: usize,
    },

    #[error("Preloaded source column '{column}' not present in series")]
    MissingSourceColumn { column: String },

    #[error("Indicator computation failed for {indicator} at bar {index}: {reason}")]
    ComputeFailed {
        indicator: String,
        index: usize,
        reason: String,
    },
}

/// Errors related to zone detection and statistical analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Detection column '{column}' not found in series")]
    MissingDetectionColumn { column: String },

    #[error("No detection rule configured and none can be inferred")]
    NoDetectionRule,

    #[error("Too few zones for {stage}: need {need}, have {have}")]
    TooFewZones {
        stage: String,
        need: usize,
        have: usize,
    },

    #[error("Clustering failed: {reason}")]
    Clustering { reason: String },

    #[error("Regression failed: {reason}")]
    Regression { reason: String },

    #[error("Zone {zone_id} has no extracted features")]
    MissingFeatures { zone_id: String },
}

/// Errors related to result persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed for {path}: {reason}")]
    Serialize { path: String, reason: String },

    #[error("Deserialization failed for {path}: {reason}")]
    Deserialize { path: String, reason: String },
}

/// Umbrella error for the analysis pipeline, which crosses concerns.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_error_formatting() {
        let err = IndicatorError::InsufficientData {
            indicator: "macd".to_string(),
            need: 35,
            have: 20,
        };

        let msg = err.to_string();
        assert!(msg.contains("macd"));
        assert!(msg.contains("35"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn test_pipeline_error_wraps_analysis() {
        let inner = AnalysisError::MissingDetectionColumn {
            column: "macd_hist".to_string(),
        };
        let err = PipelineError::from(inner);
        assert!(err.to_string().contains("macd_hist"));
    }
}
