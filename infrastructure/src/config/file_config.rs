//! Configuration file schema.
//!
//! Everything is optional in the TOML file; missing sections and fields fall
//! back to the built-in defaults, so a minimal config can override a single
//! threshold without restating the rest.

use concierge_application::ExecutionParams;
use concierge_domain::{ComplexityConfig, RouterConfig};
use serde::{Deserialize, Serialize};

/// Root of the configuration file.
///
/// ```toml
/// [router]
/// min_score = 0.3
///
/// [complexity]
/// simple_max = 1.5
///
/// [execution]
/// llm_timeout_secs = 10
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub complexity: ComplexityConfig,
    pub router: RouterConfig,
    pub execution: ExecutionParams,
    pub logging: LoggingConfig,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset and no -v flags were
    /// given, e.g. "info" or "concierge=debug".
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}
