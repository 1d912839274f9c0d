pub mod csv_loader;

pub use csv_loader::{LoadOptions, load_csv, load_csv_reader};
