//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `terrarium.toml` in the working directory, or the file named by
//! `TERRARIUM_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command link listener.
    pub link: LinkConfig,
    /// File locations.
    pub storage: StorageConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Control loop pacing.
    pub control: ControlConfig,
    /// Initial readings of the simulated probes.
    pub simulation: SimulationConfig,
}

/// Command link listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Where settings, wear counters and trace files live.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub settings_path: PathBuf,
    pub lifecycle_path: PathBuf,
    pub trace_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Control loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// How often the wall clock is sampled.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub room_temperature: i32,
    pub terrarium_temperature: i32,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("TERRARIUM_CONFIG").unwrap_or_else(|_| "terrarium.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("TERRARIUM_HOST") {
            self.link.host = val;
        }
        if let Some(port) = var("TERRARIUM_PORT").and_then(|val| val.parse().ok()) {
            self.link.port = port;
        }
        if let Some(val) = var("TERRARIUM_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.link.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.link.port = port;
                }
            }
        }
        if let Some(dir) = var("TERRARIUM_DATA_DIR") {
            self.storage = StorageConfig::in_dir(dir);
        }
        if let Some(val) = var("TERRARIUM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.link.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if !(1..=1000).contains(&self.control.poll_interval_ms) {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be between 1 and 1000".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.link.host, self.link.port)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.control.poll_interval_ms)
    }
}

impl StorageConfig {
    /// Default file names under `dir`.
    fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            settings_path: dir.join("settings.json"),
            lifecycle_path: dir.join("lifecycle.txt"),
            trace_dir: dir.join("trace"),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4040,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "terrariumd=info,terrarium=info".to_string(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            room_temperature: 21,
            terrarium_temperature: 25,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
