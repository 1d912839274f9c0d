// Descriptive statistics at the f64 boundary (statrs)
pub mod descriptive;

// Hypothesis-test battery with multiplicity adjustment
pub mod hypothesis;

// Seeded bootstrap confidence intervals
pub mod bootstrap;

// OLS of zone return on shape features
pub mod regression;

pub use hypothesis::HypothesisTestSuite;
