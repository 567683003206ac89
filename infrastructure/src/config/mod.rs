//! Configuration loading and schema

mod file_config;
mod loader;

pub use file_config::{FileConfig, LoggingConfig};
pub use loader::ConfigLoader;
