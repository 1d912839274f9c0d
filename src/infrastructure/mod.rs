// File-format loaders
pub mod loaders;

// Embedded and synthetic sample datasets
pub mod samples;

// Result persistence (JSON, feature CSV export)
pub mod persistence;
