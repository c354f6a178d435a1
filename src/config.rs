//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::live::gemini::{DEFAULT_MODEL, GEMINI_API_BASE};
use crate::dimensions::DEFAULT_BASE_SIZE;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// HTTP server settings for `imagegen serve`.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream provider settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Default parameter values for `imagegen generate`.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Largest `count` a single `/generate` call may ask for.
    pub max_count: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3000, max_count: 8 }
    }
}

/// Upstream provider settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Gemini model identifier.
    pub model: String,
    /// Gemini REST endpoint prefix.
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_string(), base_url: GEMINI_API_BASE.to_string() }
    }
}

/// Default parameter values from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default aspect ratio.
    pub aspect_ratio: String,
    /// Default base size fed to the dimension resolver.
    pub base_size: u32,
    /// Default number of images per submission.
    pub count: usize,
    /// Default output format.
    pub format: String,
    /// Proxy server the client talks to.
    pub server_url: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "1/1".to_string(),
            base_size: DEFAULT_BASE_SIZE,
            count: 1,
            format: "png".to_string(),
            server_url: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring environment variable.
    ///
    /// Blank values count as unset.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        self.gemini_key_with(std::env::var("GEMINI_API_KEY").ok())
    }

    fn gemini_key_with(&self, from_env: Option<String>) -> Option<String> {
        let usable = |k: &String| !k.trim().is_empty();
        from_env.filter(usable).or_else(|| self.keys.gemini.clone().filter(usable))
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `IMAGEGEN_CONFIG` environment variable
/// 3. `~/.config/imagegen/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("IMAGEGEN_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/imagegen/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/imagegen/config.toml")
    } else {
        PathBuf::from("imagegen.toml")
    }
}
