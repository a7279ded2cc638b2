//! Studio configuration.
//!
//! Read from `~/.config/teos-studio/config.toml`. Every section is optional;
//! absent keys fall back to the dashboard's built-in timings and texts.
//! Secrets live separately in `secret.json` (see `SecretConfig`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, StudioError};
use crate::intent::DEFAULT_TRIGGERS;
use crate::session::DEFAULT_GREETING;

const CONFIG_DIR: &str = "teos-studio";
const CONFIG_FILE: &str = "config.toml";
const SECRET_FILE: &str = "secret.json";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StudioConfig {
    pub lifecycle: LifecycleSettings,
    pub intent: IntentSettings,
    pub provider: ProviderSettings,
    pub backend: BackendSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

/// Timings of the simulated deploy cycle.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LifecycleSettings {
    /// Delay between confirm and the project entering `Building`
    pub ack_delay_ms: u64,
    /// Delay between `Building` and `Active`
    pub build_delay_ms: u64,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            ack_delay_ms: 1500,
            build_delay_ms: 5000,
        }
    }
}

impl LifecycleSettings {
    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }

    pub fn build_delay(&self) -> Duration {
        Duration::from_millis(self.build_delay_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IntentSettings {
    pub triggers: Vec<String>,
}

impl Default for IntentSettings {
    fn default() -> Self {
        Self {
            triggers: DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderSettings {
    /// Gemini model used in live mode
    pub model: String,
    /// Forces simulation mode even when an API key is available
    pub force_simulation: bool,
    pub simulated_blueprint_delay_ms: u64,
    pub simulated_chat_delay_ms: u64,
    /// Upper bound for one generation call; 0 disables the limit
    pub request_timeout_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            force_simulation: false,
            simulated_blueprint_delay_ms: 1500,
            simulated_chat_delay_ms: 1000,
            request_timeout_ms: 30_000,
        }
    }
}

impl ProviderSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.teosegypt.com".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Opening assistant message; an empty string starts with no greeting
    pub greeting: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl StudioConfig {
    /// Loads configuration from the given file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StudioError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| StudioError::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Loads the default config file, or built-in defaults if it does not exist.
    pub fn load_or_default() -> Result<Self> {
        let path = config_dir()?.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }
}

/// Root structure of `secret.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credentials
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Returns `~/.config/teos-studio`.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StudioError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join(CONFIG_DIR))
}

/// Returns `~/.config/teos-studio/secret.json`.
pub fn secret_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SECRET_FILE))
}
