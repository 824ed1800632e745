//! Server configuration.

use crate::pool::MAX_POOL_SIZE;
use crate::supervisor::TimeoutPolicy;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Multicast discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Whether to join the group and answer probes.
    enabled: bool,
    /// Multicast group probes are sent to.
    group: Ipv4Addr,
    /// UDP port of the group.
    port: u16,
    /// Local interface address the group is joined on.
    interface: Ipv4Addr,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            group: Ipv4Addr::new(239, 0, 0, 1),
            port: 1818,
            interface: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port clients connect to. Always taken from the command line.
    port: u16,
    /// Number of concurrent sessions.
    pool_size: usize,
    /// Resends of the last message before an idle game is dropped.
    max_resends: u32,
    /// Seconds of silence before the last message is resent.
    idle_timeout_secs: u64,
    /// Longest wait for network activity per loop iteration, in seconds.
    poll_interval_secs: u64,
    /// Seconds allowed for the board that follows a RESUME.
    resume_timeout_secs: u64,
    /// Discovery responder settings.
    discovery: DiscoveryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            pool_size: 5,
            max_resends: 3,
            idle_timeout_secs: 30,
            poll_interval_secs: 5,
            resume_timeout_secs: 5,
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Default configuration listening on `port`.
    pub fn new(port: u16) -> Self {
        Self::default().with_port(port)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Missing keys keep their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(pool_size = config.pool_size, "Config loaded successfully");
        Ok(config)
    }

    /// Checks values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 || self.pool_size > MAX_POOL_SIZE {
            return Err(ConfigError::new(format!(
                "pool_size must be between 1 and {}, got {}",
                MAX_POOL_SIZE, self.pool_size
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::new("poll_interval_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Timeout limits for the supervisor.
    pub fn timeout_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy::new(
            Duration::from_secs(self.idle_timeout_secs),
            self.max_resends,
            Duration::from_secs(self.resume_timeout_secs),
        )
    }

    /// Longest wait for network activity per loop iteration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
