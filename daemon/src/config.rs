//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use whisper_governance::LedgerParams;
use whisper_proof::digest::DEFAULT_DOMAIN;
use whisper_store_lmdb::environment::DEFAULT_MAP_SIZE;
use whisper_utils::LogFormat;

use crate::error::ConfigError;

/// Where ledger state lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process tables, discarded on exit.
    Memory,
    /// LMDB environment under `data_dir`.
    #[default]
    Lmdb,
}

/// Configuration for a Whisper daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`] or built
/// programmatically. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub store: StoreBackend,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Domain separator of the built-in digest proof verifier.
    #[serde(default = "default_proof_domain")]
    pub proof_domain: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ledger: LedgerParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./whisper_data")
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_proof_domain() -> String {
    String::from_utf8_lossy(DEFAULT_DOMAIN).into_owned()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: StoreBackend::default(),
            map_size: default_map_size(),
            proof_domain: default_proof_domain(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            ledger: LedgerParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.map_size, config.map_size);
        assert_eq!(parsed.store, config.store);
        assert_eq!(parsed.ledger.counter_ceiling, config.ledger.counter_ceiling);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.store, StoreBackend::Lmdb);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.ledger.counter_ceiling, 255);
        assert_eq!(config.proof_domain, "whisper/input-proof/v1");
    }

    #[test]
    fn ledger_table_overrides() {
        let toml = r#"
            store = "memory"
            log_format = "json"

            [ledger]
            counter_ceiling = 1000
            admins = ["0xadmin"]

            [ledger.reputation]
            post = 5
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.ledger.counter_ceiling, 1000);
        assert_eq!(config.ledger.admins.len(), 1);
        assert_eq!(config.ledger.reputation.post, 5);
        assert_eq!(config.ledger.reputation.comment, 1); // default
        assert_eq!(config.ledger.max_title_len, 200); // default
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        let err = DaemonConfig::from_toml_str(r#"store = "postgres""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_returns_read_error() {
        let err = DaemonConfig::from_toml_file(Path::new("/nonexistent/whisper.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
