//! Configuration management for the Herald bot client.
//!
//! Loads the TOML configuration file, writing a default one when the file
//! does not exist yet, and validates it before startup.

use herald_event_system::{builtin_handlers, EventMetadata, HandlerClassRef};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from an existing file
    File,
    /// The file was missing and the defaults were written to it
    CreatedDefault,
}

fn default_event_buffer() -> usize {
    256
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Client session settings
    pub client: ClientSettings,
    /// Which built-in handlers to load
    #[serde(default)]
    pub handlers: HandlerSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Name shown in the startup log
    pub session_name: String,
    /// Capacity of the inbound event queue
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerSettings {
    /// Built-in handlers to skip, by type name (e.g. "DebugEvent")
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientSettings {
                session_name: "herald".to_string(),
                event_buffer: default_event_buffer(),
            },
            handlers: HandlerSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration there and
    /// returns it with [`ConfigSource::CreatedDefault`]. Nothing is logged
    /// here since logging is configured from the result.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<(Self, ConfigSource)> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok((config, ConfigSource::File))
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            Ok((default_config, ConfigSource::CreatedDefault))
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.client.session_name.trim().is_empty() {
            return Err("Session name cannot be empty".to_string());
        }

        if self.client.event_buffer == 0 {
            return Err("Event buffer must hold at least one event".to_string());
        }

        let known = builtin_handler_names();
        if let Some(unknown) = self
            .handlers
            .disabled
            .iter()
            .find(|name| !known.contains(&name.as_str()))
        {
            return Err(format!(
                "Unknown handler in disabled list: {unknown}. Must be one of: {known:?}"
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

impl HandlerSettings {
    /// Drops the disabled classes, keeping discovery order.
    pub fn select(&self, classes: Vec<HandlerClassRef>) -> Vec<HandlerClassRef> {
        classes
            .into_iter()
            .filter(|class| !self.disabled.iter().any(|d| d == class.type_name()))
            .collect()
    }
}

fn builtin_handler_names() -> Vec<&'static str> {
    builtin_handlers(&mut EventMetadata::new())
        .iter()
        .map(HandlerClassRef::type_name)
        .collect()
}
