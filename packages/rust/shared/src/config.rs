//! Application configuration for enrichmail.
//!
//! User config lives at `~/.enrichmail/enrichmail.toml`.
//! CLI flags override config file values, which override defaults.
//! The API credential itself is never stored in the file; the config only
//! names the environment variable that holds it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EnrichmailError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "enrichmail.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".enrichmail";

// ---------------------------------------------------------------------------
// Config structs (matching enrichmail.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Verification provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Global run defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Report highlighting rules.
    #[serde(default)]
    pub highlight: HighlightConfig,
}

/// `[provider]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Verification endpoint base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. A stall becomes a per-address
    /// failure instead of hanging the run.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "EMAILABLE_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.emailable.com/v1/verify".into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Pacing delay in ms between consecutive verification calls.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Default output workbook file name.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            output: default_output(),
        }
    }
}

fn default_pacing_ms() -> u64 {
    1000
}
fn default_output() -> String {
    "email_enrichment_final_output.xlsx".into()
}

/// `[highlight]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Provider reason code that earns a positive (accepted) marker in the
    /// original sheet. Case-insensitive. Empty string disables the overlay.
    #[serde(default = "default_accepted_reason")]
    pub accepted_reason: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            accepted_reason: default_accepted_reason(),
        }
    }
}

fn default_accepted_reason() -> String {
    "accepted_email".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.enrichmail/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EnrichmailError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.enrichmail/enrichmail.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EnrichmailError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        EnrichmailError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EnrichmailError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EnrichmailError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EnrichmailError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the API key from the env var named in the config.
///
/// The returned value must never be logged or written to disk.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.provider.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(EnrichmailError::config(format!(
            "verification API key not found. Set the {var_name} environment variable."
        ))),
    }
}
