//! Configuration for the smoke-test runner.
//!
//! Settings are read from an optional TOML file. Every section falls back to
//! its defaults, so an empty store describes a gateway on the local loopback
//! at the default port.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Result, anyhow};
use serde::{Deserialize, de::DeserializeOwned};
use skyprobe_protocol::{DEFAULT_ADDRESS, DEFAULT_PORT};
use tracing::{debug, info};

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be loaded from configuration
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use skyprobe::config::Configurable;
///
/// #[derive(Debug, Deserialize, Default)]
/// pub struct ReportConfig {
///     pub json: bool,
/// }
///
/// impl Configurable for ReportConfig {
///     const PREFIX: &'static str = "report";
/// }
/// ```
pub trait Configurable: DeserializeOwned + Default {
    /// Configuration section prefix (corresponds to TOML section name)
    const PREFIX: &'static str;
}

// ============================================================================
// Configuration Store
// ============================================================================

/// Configuration storage with TOML support
pub struct ConfigStore {
    data: toml::Value,
    path: Option<PathBuf>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConfigStore {
    /// Create an empty configuration store
    pub fn empty() -> Self {
        Self {
            data: toml::Value::Table(Default::default()),
            path: None,
        }
    }

    /// Create a configuration store from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let data: toml::Value =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML: {}", e))?;
        Ok(Self { data, path: None })
    }

    /// Create a configuration store from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let data: toml::Value = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse TOML in '{}': {}", path.display(), e))?;

        Ok(Self {
            data,
            path: Some(path.to_path_buf()),
        })
    }

    /// Load `path` if it exists, otherwise start from an empty store
    pub fn from_optional_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::empty())
        }
    }

    /// Get a typed configuration section
    ///
    /// If the section doesn't exist, returns the default value.
    pub fn get<C: Configurable>(&self) -> Result<C> {
        let section = self
            .data
            .get(C::PREFIX)
            .cloned()
            .unwrap_or(toml::Value::Table(Default::default()));

        debug!("Loading config section: {}", C::PREFIX);

        section
            .try_into()
            .map_err(|e| anyhow!("Failed to deserialize config section '{}': {}", C::PREFIX, e))
    }

    /// Check if a configuration section exists
    pub fn has_section(&self, prefix: &str) -> bool {
        self.data.get(prefix).is_some()
    }

    /// Get the configuration file path (if loaded from file)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

// ============================================================================
// Gateway Configuration
// ============================================================================

/// Where and how to reach the scripting gateway
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Host the gateway listens on
    pub address: String,

    /// Gateway TCP port
    pub port: u16,

    /// Token sent before the first call, if the gateway requires one
    pub auth_token: Option<String>,

    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Per-call timeout in milliseconds. Remote sleeps block for their full
    /// duration, so this must exceed the longest pause.
    pub call_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            auth_token: None,
            connect_timeout_ms: 5_000,
            call_timeout_ms: 30_000,
        }
    }
}

impl GatewayConfig {
    /// `address:port` as passed to the socket layer
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Configurable for GatewayConfig {
    const PREFIX: &'static str = "gateway";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let store = ConfigStore::empty();
        let config: GatewayConfig = store.get().unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.endpoint(), "127.0.0.1:25333");
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_section() {
        let toml = r#"
            [gateway]
            port = 25334
            auth_token = "secret"
        "#;

        let store = ConfigStore::parse(toml).unwrap();
        assert!(store.has_section("gateway"));

        let config: GatewayConfig = store.get().unwrap();
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 25334);
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_section() {
        let toml = r#"
            [other]
            value = "world"
        "#;

        let store = ConfigStore::parse(toml).unwrap();
        assert!(!store.has_section("gateway"));
        let config: GatewayConfig = store.get().unwrap();
        assert_eq!(config.port, 25333);
    }

    #[test]
    fn test_invalid_section_is_an_error() {
        let store = ConfigStore::parse("[gateway]\nport = \"high\"\n").unwrap();
        assert!(store.get::<GatewayConfig>().is_err());
    }

    #[test]
    fn test_optional_file() {
        let missing = std::env::temp_dir().join("skyprobe-no-such-config.toml");
        let store = ConfigStore::from_optional_file(&missing).unwrap();
        assert!(store.path().is_none());

        let present = std::env::temp_dir().join(format!("skyprobe-{}.toml", std::process::id()));
        std::fs::write(&present, "[gateway]\naddress = \"10.0.0.5\"\n").unwrap();
        let store = ConfigStore::from_optional_file(&present).unwrap();
        assert_eq!(store.path(), Some(present.as_path()));
        let config: GatewayConfig = store.get().unwrap();
        assert_eq!(config.endpoint(), "10.0.0.5:25333");
        std::fs::remove_file(&present).unwrap();
    }
}
