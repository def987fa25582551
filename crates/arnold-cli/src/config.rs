//! Configuration file support

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default agent endpoint when neither flag nor config sets one
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000/v1/chat/send-message";

/// Configuration for arnold
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent endpoint URL
    pub url: Option<String>,
    /// Greeting shown as the first assistant message
    pub greeting: Option<String>,
    /// Use the light theme
    pub light: Option<bool>,
    /// Extra headers sent with every run request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("arnold")
    }

    /// Resolve the config file path.
    ///
    /// Precedence: explicit path, then `ARNOLD_CONFIG_PATH`, then the
    /// default location under the config directory.
    pub fn config_path(override_path: Option<&Path>) -> PathBuf {
        if let Some(path) = override_path {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var("ARNOLD_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load(override_path: Option<&Path>) -> Self {
        let path = Self::config_path(override_path);
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to the given file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init(override_path: Option<&Path>) -> std::io::Result<PathBuf> {
        let path = Self::config_path(override_path);
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            url: Some(DEFAULT_URL.to_string()),
            greeting: None,
            light: Some(false),
            headers: BTreeMap::new(),
        };

        default_config.save_to(&path)?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# arnold configuration file
# Place at ~/.config/arnold/config.toml (Linux/Mac) or %APPDATA%\arnold\config.toml (Windows)

# Agent endpoint URL
url = "http://127.0.0.1:8000/v1/chat/send-message"

# Greeting shown as the first assistant message (optional)
# greeting = "Hello! I'm your AI assistant. How can I help you today?"

# Use the light theme
light = false

# Extra headers sent with every run request (optional)
# [headers]
# authorization = "Bearer ..."
"#
}
