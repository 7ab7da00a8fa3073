//! Application configuration with TOML file support.
//!
//! Only operational settings live here. Consensus-relevant parameters
//! (voting window, quorum, threshold, forfeit policy, bond denomination) come
//! from genesis so that every replica agrees on them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::LogFormat;
use crate::AppError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Maximum number of named LMDB databases.
    #[serde(default = "default_max_dbs")]
    pub max_dbs: u32,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,simplegov_governance=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Genesis file used by `init` when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis: Option<PathBuf>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./simplegov_data")
}

fn default_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_max_dbs() -> u32 {
    4
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AppConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(s).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.log_format()?;
        if self.map_size == 0 {
            return Err(AppError::Config("map_size must be positive".into()));
        }
        if self.max_dbs < 2 {
            return Err(AppError::Config("max_dbs must be at least 2".into()));
        }
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, AppError> {
        self.log_format.parse()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            max_dbs: default_max_dbs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            genesis: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.data_dir, PathBuf::from("./simplegov_data"));
        assert_eq!(config.log_format, "human");
        assert_eq!(config.genesis, None);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            data_dir = "/var/lib/simplegov"
            log_format = "json"
            genesis = "genesis.json"
        "#;
        let config = AppConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/simplegov"));
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.genesis, Some(PathBuf::from("genesis.json")));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("log_format = \"xml\""),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn file_loading_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simplegov.toml");
        assert!(AppConfig::from_toml_file(&path).is_err());

        std::fs::write(&path, "map_size = 1048576\n").unwrap();
        assert_eq!(AppConfig::from_toml_file(&path).unwrap().map_size, 1_048_576);
    }
}
