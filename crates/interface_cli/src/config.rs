//! CLI configuration

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;

use domain_pricing::PricingConfig;

/// Prefix of every environment variable read by the CLI
pub const ENV_PREFIX: &str = "PRICING";

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Snapshot used when `--snapshot` is not given
    pub snapshot_path: Option<PathBuf>,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Engine settings
    pub pricing: PricingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            log_level: "info".to_string(),
            log_json: false,
            pricing: PricingConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from `PRICING__*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(environment())
    }

    /// Loads configuration from an explicit variable map instead of the process environment
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(environment().source(Some(vars)))
    }

    fn load(source: Environment) -> Result<Self, ConfigError> {
        Config::builder().add_source(source).build()?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true)
}
