// Configuration File Support
//
// TOML configuration for the MCP hub, with environment variable overrides.
// Loaded from the XDG config directory: ~/.config/mcp-hub/config.toml
//
// Servers are declared as an array of tables; file order is registration
// order, which is also the order fan-out results come back in.

use crate::mcp::client::{AuthConfig, AuthType, ServerDescriptor};
use crate::mcp::factory::Protocol;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// MCP server registrations, in registration order
    pub servers: Vec<ServerEntry>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// One `[[servers]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerEntry {
    /// Stable unique identifier (registry key)
    pub id: String,

    /// Display name; defaults to the id when empty
    pub name: String,

    /// Base URL of the server
    pub url: String,

    /// Disabled servers stay registered but are excluded from data fan-out
    pub enabled: bool,

    /// Protocol selection (auto, jsonrpc, rest)
    pub protocol: Protocol,

    /// Authentication scheme (none, apiKey, basic, bearer)
    pub auth_type: AuthType,

    /// Credential material for the chosen scheme
    pub auth: AuthConfig,
}

impl Default for ServerEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            url: String::new(),
            enabled: true,
            protocol: Protocol::Auto,
            auth_type: AuthType::None,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerEntry {
    /// Build the client-facing descriptor for this registration
    pub fn to_descriptor(&self) -> ServerDescriptor {
        let name = if self.name.is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        ServerDescriptor {
            id: self.id.clone(),
            name,
            url: self.url.clone(),
            enabled: self.enabled,
            auth_type: self.auth_type,
            auth_config: self.auth.clone(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::config_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file from {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file from {:?}", path))?;

        let config = config.apply_env_overrides();
        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/mcp-hub/config.toml` on Linux/Mac
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("io", "mcp-hub", "mcp-hub") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            // Fallback if XDG dirs cannot be determined
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".config")
                .join("mcp-hub")
                .join("config.toml")
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - MCP_HUB_LOG_LEVEL
    /// - MCP_HUB_LOG_FORMAT
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("MCP_HUB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MCP_HUB_LOG_FORMAT") {
            self.logging.format = format;
        }
        self
    }

    /// Validate the configuration
    ///
    /// Per-server URL problems are deliberately not rejected here; a bad
    /// registration becomes a disabled placeholder in the registry instead
    /// of sinking the whole config.
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        let mut seen = HashSet::new();
        for server in &self.servers {
            if server.id.is_empty() {
                anyhow::bail!("Server registration with empty id");
            }
            if !seen.insert(server.id.as_str()) {
                anyhow::bail!("Duplicate server id: {}", server.id);
            }
        }

        Ok(())
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}
