// Plain chart data, renderable by any frontend
pub mod chart_model;

// egui viewer (feature-gated)
#[cfg(feature = "ui")]
pub mod viewer;
