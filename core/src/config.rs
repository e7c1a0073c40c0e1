//! Configuration for mask lookups and the remote verification backend.
//!
//! Stored as JSON. Every field has a default, so `{}` is a valid config.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rle::RowPolicy;

/// Port the verification backend listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8888;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub masks: MaskConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Pretty-printed JSON with sorted keys.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Directory holding `<id>.rle` files.
    #[serde(default = "default_mask_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub row_policy: RowPolicy,
    /// Delete a mask once it has been checked.
    #[serde(default = "default_true")]
    pub consume: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            dir: default_mask_dir(),
            row_policy: RowPolicy::default(),
            consume: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path of the verification endpoint.
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Applies to each socket write and read.
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
}

impl RemoteConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
            connect_timeout_ms: default_connect_timeout_ms(),
            io_timeout_ms: default_io_timeout_ms(),
        }
    }
}

fn default_mask_dir() -> PathBuf {
    PathBuf::from("solmasks")
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_path() -> String {
    "/captcha/postresponse".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_io_timeout_ms() -> u64 {
    3_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.remote.port, 8888);
        assert_eq!(config.remote.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.remote.io_timeout(), Duration::from_secs(3));
        assert_eq!(config.masks.row_policy, RowPolicy::Strict);
        assert!(config.masks.consume);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_json(
            r#"{"masks":{"dir":"/srv/masks","row_policy":"permissive"},"remote":{"port":9000}}"#,
        )
        .unwrap();
        assert_eq!(config.masks.dir, PathBuf::from("/srv/masks"));
        assert_eq!(config.masks.row_policy, RowPolicy::Permissive);
        assert_eq!(config.remote.port, 9000);
        assert_eq!(config.remote.host, "localhost");
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = Config::from_json(r#"{"masks":{"row_policy":"lenient"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn json_roundtrip() {
        let mut config = Config::default();
        config.remote.host = "captcha.example".to_string();
        let text = config.to_json().unwrap();
        assert_eq!(Config::from_json(&text).unwrap(), config);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"remote":{"io_timeout_ms":250}}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.remote.io_timeout(), Duration::from_millis(250));
        assert!(matches!(
            Config::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
