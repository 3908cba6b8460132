use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::domain::NumericFormat;
use crate::error::{ConfigError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub node: NodeConfig,
    pub paths: PathsConfig,
    pub chain: ChainConfig,
    pub numeric: NumericConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the local node.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub rpc_url: String,
    pub network_id: u64,
    pub peer_port: u16,
    pub rpc_port: u16,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".into(),
            network_id: 10101,
            peer_port: 30303,
            rpc_port: 8545,
        }
    }
}

/// Filesystem locations. Unset paths fall back to network-dependent
/// defaults under the home directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub datadir: Option<PathBuf>,
    pub gospel: Option<PathBuf>,
    pub node_log: Option<PathBuf>,
    pub core_path: Option<PathBuf>,
}

/// Chain provisioning parameters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Ether the etherbase account must hold before provisioning proceeds.
    pub minimum_ether: u64,
    /// Block time handed to the contract uploader.
    pub block_time: f64,
    /// How many unlocked test accounts to manage.
    pub max_test_accounts: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            minimum_ether: 32,
            block_time: 1.75,
            max_test_accounts: 10,
        }
    }
}

/// Output representation for decoded on-chain values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NumericConfig {
    pub format: NumericFormat,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.node.rpc_url).map_err(|e| ConfigError::InvalidValue {
            field: "rpc_url",
            reason: e.to_string(),
        })?;
        if self.chain.minimum_ether == 0 {
            return Err(ConfigError::InvalidValue {
                field: "minimum_ether",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.chain.max_test_accounts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_test_accounts",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize the tracing subscriber with this configuration.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }

    /// Data directory, defaulted per network id.
    pub fn datadir(&self) -> PathBuf {
        if let Some(dir) = &self.paths.datadir {
            return dir.clone();
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        match self.node.network_id {
            10101 => home.join(".augury-test"),
            1010101 => home.join(".augury"),
            id => home.join(format!(".augury-{id}")),
        }
    }

    /// Where contract addresses are persisted after an upload.
    pub fn gospel_path(&self) -> PathBuf {
        self.paths
            .gospel
            .clone()
            .unwrap_or_else(|| self.datadir().join("gospel.json"))
    }

    /// Where the spawned node's output is captured.
    pub fn node_log_path(&self) -> PathBuf {
        self.paths
            .node_log
            .clone()
            .unwrap_or_else(|| self.datadir().join("node.log"))
    }

    /// Checkout of the contract sources and uploader scripts.
    pub fn core_path(&self) -> PathBuf {
        self.paths.core_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("src")
                .join("augury-core")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_ports_match_local_chain() {
        let config = Config::default();
        assert_eq!(config.node.peer_port, 30303);
        assert_eq!(config.node.rpc_port, 8545);
        assert_eq!(config.node.network_id, 10101);
        assert_eq!(config.chain.minimum_ether, 32);
    }

    #[test]
    fn test_network_datadir_is_home_relative() {
        let config = Config::default();
        assert!(config.datadir().ends_with(".augury-test"));
    }

    #[test]
    fn gospel_defaults_inside_datadir() {
        let config = Config::default();
        assert_eq!(config.gospel_path(), config.datadir().join("gospel.json"));
    }
}
