//! Runtime configuration.
//!
//! Loaded from a TOML file (default `~/.config/lumina/config.toml`,
//! overridable via `LUMINA_CONFIG` or `--config`). A commented template
//! is written on first run. API keys may reference environment
//! variables as `${GEMINI_API_KEY}`.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub studio: StudioConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model for analysis and chat.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model for try-on image generation.
    #[serde(default = "default_image_model")]
    pub image_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Idle minutes before an in-memory session is dropped.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u64,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_api_key() -> String {
    "${GEMINI_API_KEY}".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}
fn default_session_timeout() -> u64 {
    30
}
fn default_max_sessions() -> usize {
    100
}
fn default_port() -> u16 {
    27180
}
fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
        }
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: default_session_timeout(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the config, creating a commented template on first run.
    /// `path_override` comes from `--config` / `LUMINA_CONFIG`.
    pub fn load(path_override: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path_override)?;

        if !path.exists() {
            let config = Config::default();
            config.save_with_template(&path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.expand_env_vars();
        Ok(config)
    }

    /// Resolve the config file path without touching the filesystem.
    pub fn resolve_path(path_override: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = path_override {
            return Ok(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("LUMINA_CONFIG") {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("", "", "lumina")
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Write the commented template (for first-time setup).
    pub fn save_with_template(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        eprintln!("Created default config at {}", path.display());
        Ok(())
    }

    fn expand_env_vars(&mut self) {
        self.gemini.api_key = expand_env(&self.gemini.api_key);
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["gemini", "base_url"] => Ok(self.gemini.base_url.clone()),
            ["gemini", "text_model"] => Ok(self.gemini.text_model.clone()),
            ["gemini", "image_model"] => Ok(self.gemini.image_model.clone()),
            ["studio", "session_timeout_minutes"] => {
                Ok(self.studio.session_timeout_minutes.to_string())
            }
            ["studio", "max_sessions"] => Ok(self.studio.max_sessions.to_string()),
            ["server", "port"] => Ok(self.server.port.to_string()),
            ["server", "bind"] => Ok(self.server.bind.clone()),
            ["logging", "level"] => Ok(self.logging.level.clone()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["gemini", "api_key"] => self.gemini.api_key = value.to_string(),
            ["gemini", "base_url"] => self.gemini.base_url = value.to_string(),
            ["gemini", "text_model"] => self.gemini.text_model = value.to_string(),
            ["gemini", "image_model"] => self.gemini.image_model = value.to_string(),
            ["studio", "session_timeout_minutes"] => {
                self.studio.session_timeout_minutes = value.parse()?
            }
            ["studio", "max_sessions"] => self.studio.max_sessions = value.parse()?,
            ["server", "port"] => self.server.port = value.parse()?,
            ["server", "bind"] => self.server.bind = value.to_string(),
            ["logging", "level"] => self.logging.level = value.to_string(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        Ok(())
    }
}

fn expand_env(s: &str) -> String {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else if let Some(var_name) = s.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else {
        s.to_string()
    }
}

/// Default config template with helpful comments (used for first-time setup)
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Lumina Configuration
# Auto-created on first run. Edit as needed.

[gemini]
# API key for the Gemini API. ${VAR} references are expanded from the
# environment at load time.
api_key = "${GEMINI_API_KEY}"
# base_url = "https://generativelanguage.googleapis.com"
# text_model = "gemini-2.5-flash"
# image_model = "gemini-2.5-flash-image"

[studio]
# Idle minutes before an in-memory session is dropped.
session_timeout_minutes = 30
max_sessions = 100

[server]
port = 27180
bind = "127.0.0.1"

[logging]
level = "info"
"#;
