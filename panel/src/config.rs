//! Panel configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use synthstake_chain::GasSpeed;
use synthstake_types::NetworkId;
use synthstake_utils::LogFormat;

use crate::PanelError;

/// Configuration shared by every panel of a session.
///
/// Can be loaded from a TOML file via [`PanelConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Which network the wallet is on; selects explorer links.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Percentage added on top of every gas estimate.
    #[serde(default = "default_gas_limit_buffer_percent")]
    pub gas_limit_buffer_percent: u32,

    /// Gas price tier used when the user did not pick one.
    #[serde(default)]
    pub gas_speed: GasSpeed,

    /// Keep the success view until dismissed. When false, a confirmed action
    /// resets to idle on the next mount.
    #[serde(default = "default_true")]
    pub persistent_success: bool,

    /// How often the receipt monitor polls the node.
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    /// JSON-RPC endpoint for receipt polling. Unset means simulated chain.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Mainnet
}

fn default_gas_limit_buffer_percent() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

fn default_receipt_poll_interval_ms() -> u64 {
    4_000
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PanelConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PanelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PanelError> {
        let config: Self = toml::from_str(s).map_err(|e| PanelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, PanelError> {
        toml::to_string_pretty(self).map_err(|e| PanelError::Config(e.to_string()))
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    fn validate(&self) -> Result<(), PanelError> {
        if self.receipt_poll_interval_ms == 0 {
            return Err(PanelError::Config(
                "receipt_poll_interval_ms must be positive".into(),
            ));
        }
        if self.gas_limit_buffer_percent > 100 {
            return Err(PanelError::Config(format!(
                "gas_limit_buffer_percent {} exceeds 100",
                self.gas_limit_buffer_percent
            )));
        }
        Ok(())
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            gas_limit_buffer_percent: default_gas_limit_buffer_percent(),
            gas_speed: GasSpeed::default(),
            persistent_success: default_true(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            rpc_url: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PanelConfig::from_toml_str("").unwrap();
        assert_eq!(config, PanelConfig::default());
        assert_eq!(config.gas_limit_buffer_percent, 20);
        assert!(config.persistent_success);
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = PanelConfig::from_toml_str(
            r#"
            network = "kovan"
            gas_speed = "fast"
            persistent_success = false
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.network, NetworkId::Kovan);
        assert_eq!(config.gas_speed, GasSpeed::Fast);
        assert!(!config.persistent_success);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.receipt_poll_interval_ms, 4_000);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let result = PanelConfig::from_toml_str("receipt_poll_interval_ms = 0");
        assert!(matches!(result, Err(PanelError::Config(_))));
    }

    #[test]
    fn toml_round_trip_through_file() {
        let config = PanelConfig {
            rpc_url: Some("http://127.0.0.1:8545".into()),
            ..PanelConfig::default()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();
        let loaded = PanelConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = PanelConfig::from_toml_file("/nonexistent/synthstake.toml");
        assert!(matches!(result, Err(PanelError::Io(_))));
    }
}
