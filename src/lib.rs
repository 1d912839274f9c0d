pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

#[cfg(test)]
mod config_tests;

pub use application::pipeline::analyze_zones;
