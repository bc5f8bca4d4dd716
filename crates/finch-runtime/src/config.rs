//! Host configuration (finch.toml)
//!
//! A resource directory may carry a `finch.toml` that renames the entry
//! script, the application class or its callbacks:
//!
//! ```toml
//! main_script = "app.finch"
//! max_call_depth = 256
//!
//! [application]
//! class = "Game"
//! timer = "tick(_)"
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::path::{Path, PathBuf};

use finch_sdk::signature;
use serde::Deserialize;
use thiserror::Error;

/// Name of the configuration file looked up in the resource directory.
pub const CONFIG_FILE: &str = "finch.toml";

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Everything the host needs to start a script.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HostConfig {
    /// Directory holding the script and its assets
    #[serde(skip)]
    pub resource_dir: PathBuf,

    /// Explicit script path; `resource_dir/main_script` when unset
    #[serde(skip)]
    pub script: Option<PathBuf>,

    /// Entry script file name inside the resource directory
    #[serde(default = "default_main_script")]
    pub main_script: String,

    /// Module name the entry script runs as
    #[serde(default = "default_module")]
    pub module: String,

    /// Application class and callback names
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Nested calls allowed before a "Stack overflow." error
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

/// The class that receives host events and its three callbacks.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApplicationConfig {
    /// Class looked up in the entry module (default: "Application")
    #[serde(default = "default_class")]
    pub class: String,

    /// General event callback (default: "event(_)")
    #[serde(default = "default_event")]
    pub event: String,

    /// Notification callback (default: "notification(_)")
    #[serde(default = "default_notification")]
    pub notification: String,

    /// Timer callback (default: "timer(_)")
    #[serde(default = "default_timer")]
    pub timer: String,
}

fn default_main_script() -> String {
    "main.finch".to_string()
}

fn default_module() -> String {
    "main".to_string()
}

fn default_max_call_depth() -> usize {
    finch_engine::DEFAULT_MAX_CALL_DEPTH
}

fn default_class() -> String {
    "Application".to_string()
}

fn default_event() -> String {
    "event(_)".to_string()
}

fn default_notification() -> String {
    "notification(_)".to_string()
}

fn default_timer() -> String {
    "timer(_)".to_string()
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            class: default_class(),
            event: default_event(),
            notification: default_notification(),
            timer: default_timer(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("."),
            script: None,
            main_script: default_main_script(),
            module: default_module(),
            application: ApplicationConfig::default(),
            max_call_depth: default_max_call_depth(),
        }
    }
}

impl HostConfig {
    /// Configuration for `resource_dir`: its `finch.toml` if present,
    /// defaults otherwise.
    pub fn load(resource_dir: &Path) -> Result<Self, ConfigError> {
        let file = resource_dir.join(CONFIG_FILE);
        let mut config = if file.is_file() {
            log::debug!("loading configuration from {}", file.display());
            Self::from_file(&file)?
        } else {
            Self::default()
        };
        config.resource_dir = resource_dir.to_path_buf();
        Ok(config)
    }

    /// Parse a configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.main_script.is_empty() {
            return Err(ConfigError::ValidationError(
                "main_script cannot be empty".to_string(),
            ));
        }
        if self.module.is_empty() {
            return Err(ConfigError::ValidationError("module cannot be empty".to_string()));
        }
        if self.application.class.is_empty() {
            return Err(ConfigError::ValidationError(
                "application.class cannot be empty".to_string(),
            ));
        }
        for callback in self.application.callbacks() {
            if !signature::is_valid(callback) || signature::arity(callback) != Some(1) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid callback signature: {}. Must take one argument (e.g., event(_))",
                    callback
                )));
            }
        }
        if self.max_call_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_call_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the entry script.
    pub fn script_path(&self) -> PathBuf {
        match &self.script {
            Some(script) => script.clone(),
            None => self.resource_dir.join(&self.main_script),
        }
    }
}

impl ApplicationConfig {
    /// The event, notification and timer signatures, in that order.
    pub fn callbacks(&self) -> [&str; 3] {
        [
            self.event.as_str(),
            self.notification.as_str(),
            self.timer.as_str(),
        ]
    }
}
