// Universal zone data structures
pub mod models;

pub use models::{
    AnalysisMetadata, SwingPoints, ZoneAnalysisResult, ZoneFeatures, ZoneInfo, ZoneKind,
    ZoneStatistics,
};
