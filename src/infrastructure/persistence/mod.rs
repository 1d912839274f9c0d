pub mod results;

pub use results::export_features_csv;
