//! Configuration loading.
//!
//! Loads `~/.rhetoric-analyzer/config.toml` (or `--config` / `$RHETORIC_CONFIG_PATH`).
//! Environment variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.
//!
//! The API key is deliberately not a config field. It is supplied per run and
//! only ever held in memory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::providers::gemini::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "RHETORIC_CONFIG_PATH";

/// Env var holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const CONFIG_DIR_NAME: &str = ".rhetoric-analyzer";
const CONFIG_FILE_NAME: &str = "config.toml";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation endpoint settings (`[model]`).
    pub model: ModelConfig,
    /// Log output settings (`[logging]`).
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// An explicit path must exist. The default path may be absent, in which
    /// case defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the home
    /// directory cannot be resolved.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let required = explicit.is_some() || env(CONFIG_PATH_ENV).is_some();
        let path = resolve_config_path(explicit, &env)?;
        let mut config = Self::load_from_file(&path, required)?;
        config.apply_overrides(&env);
        Ok(config)
    }

    fn load_from_file(path: &Path, required: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading config from file");
                toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Apply environment variable overrides (env > config > defaults).
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("RHETORIC_MODEL") {
            self.model.name = v;
        }
        if let Some(v) = env("RHETORIC_BASE_URL") {
            self.model.base_url = v;
        }
        if let Some(v) = env("RHETORIC_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.model.request_timeout_secs = Some(n),
                Err(_) => tracing::warn!(
                    var = "RHETORIC_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("RHETORIC_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env("RHETORIC_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(v));
        }
    }

    /// Parse a TOML string into config (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }
}

// ── Model config ────────────────────────────────────────────────

/// Generation endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Gemini model identifier.
    pub name: String,
    /// API base URL.
    pub base_url: String,
    /// Per-request timeout. Unset or zero means no timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: DEFAULT_GEMINI_URL.to_owned(),
            request_timeout_secs: None,
        }
    }
}

impl ModelConfig {
    /// Configured timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

// ── Logging config ──────────────────────────────────────────────

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// When set, JSON logs are also written here with daily rotation.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            dir: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────

/// Resolve the default config directory (`~/.rhetoric-analyzer/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(CONFIG_DIR_NAME))
}

/// Resolve the config file path: explicit > `$RHETORIC_CONFIG_PATH` > default.
///
/// # Errors
///
/// Returns an error if the default directory cannot be resolved.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}
