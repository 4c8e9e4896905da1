//! Configuration for the chain

use serde::{Deserialize, Serialize};
use tnt_protocol::{AssetId, ShareType};

/// Chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Tank and tap parameters
    pub tnt: TntParameters,

    /// Largest restriction tree a custom authority may carry
    pub max_restriction_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "tnt-chain".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            tnt: TntParameters::default(),
            max_restriction_count: 256,
        }
    }
}

/// Tank and tap parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TntParameters {
    /// Ceiling on sink chain length during validation
    pub max_sink_chain_length: usize,

    /// Maximum taps on one tank
    pub max_taps_per_tank: usize,

    /// Maximum attachments on one tank
    pub max_attachments_per_tank: usize,

    /// Core asset escrowed per tank
    pub tank_deposit: ShareType,

    /// Asset the deposit is paid in
    pub core_asset: AssetId,
}

impl Default for TntParameters {
    fn default() -> Self {
        Self {
            max_sink_chain_length: 25,
            max_taps_per_tank: 64,
            max_attachments_per_tank: 64,
            tank_deposit: 10_000,
            core_asset: AssetId(0),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(length) = std::env::var("TNT_MAX_SINK_CHAIN_LENGTH") {
            config.tnt.max_sink_chain_length = parse_var("TNT_MAX_SINK_CHAIN_LENGTH", &length)?;
        }

        if let Ok(deposit) = std::env::var("TNT_TANK_DEPOSIT") {
            config.tnt.tank_deposit = parse_var("TNT_TANK_DEPOSIT", &deposit)?;
        }

        if let Ok(count) = std::env::var("TNT_MAX_RESTRICTION_COUNT") {
            config.max_restriction_count = parse_var("TNT_MAX_RESTRICTION_COUNT", &count)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject parameters the evaluators cannot honour
    pub fn validate(&self) -> crate::Result<()> {
        if self.tnt.tank_deposit < 0 {
            return Err(crate::Error::Config(format!(
                "tank_deposit must not be negative, got {}",
                self.tnt.tank_deposit
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> crate::Result<T> {
    value
        .parse()
        .map_err(|_| crate::Error::Config(format!("Invalid value for {}: {:?}", name, value)))
}
