// Run detection over indicator columns
pub mod detector;

// Per-zone feature extraction
pub mod features;

// Pluggable swing-point strategies
pub mod swings;

// Divergence / volatility / volume metric strategies
pub mod metrics;

// Zone-sequence transition analysis
pub mod sequence;

// K-means shape clustering
pub mod clustering;

pub use detector::{DetectionRule, ZoneDetector};
pub use features::ZoneFeaturesAnalyzer;
pub use swings::{SwingStrategy, SwingStrategyKind};
