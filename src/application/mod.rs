// Indicator computation (builtin, library-backed, preloaded)
pub mod indicators;

// Zone detection, feature extraction and pluggable strategies
pub mod zones;

// Descriptive statistics, hypothesis suite, regression
pub mod statistics;

// Builder-style analysis pipeline
pub mod pipeline;
