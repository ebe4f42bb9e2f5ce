//! Settings file loading, merging, and validation.
//!
//! Everything has a stock default, so the settings file is optional. When
//! present (`livecodes-preview.toml` by default, or `--config <path>`), its
//! values are merged over the defaults key by key:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! projects_root = ".livecodes"   # Directory holding one file per project
//! # app_url = "https://livecodes.io/"   # Playground for projects without appUrl
//!
//! [paste]
//! enabled = true
//! endpoint = "https://dpaste.com/api/v2/"
//! view_prefix = "https://dpaste.com/"
//! expiry_days = 365
//! min_interval_ms = 1500
//! timeout_secs = 30
//! user_agent = "LiveCodes / https://livecodes.io/"
//!
//! [report]
//! max_url_display = 50
//! output_name = "message"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! Commit metadata (SHA, ref, repository, base URL, last-updated timestamp)
//! is not part of this file: it changes with every run and comes from the
//! command line or environment instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// The paste service allows about one request per second.
pub const MIN_UPLOAD_INTERVAL_MS: u64 = 1500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run settings loaded from the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory containing the project definition files.
    pub projects_root: String,
    /// Playground base URL for projects that do not set `appUrl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,
    /// Paste service used for oversized configurations.
    pub paste: PasteSettings,
    /// Markdown report settings.
    pub report: ReportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            projects_root: ".livecodes".to_string(),
            app_url: None,
            paste: PasteSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl Settings {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projects_root.is_empty() {
            return Err(ConfigError::Validation(
                "projects_root must not be empty".into(),
            ));
        }
        if self.paste.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "paste.endpoint must not be empty".into(),
            ));
        }
        if self.paste.min_interval_ms < MIN_UPLOAD_INTERVAL_MS {
            return Err(ConfigError::Validation(format!(
                "paste.min_interval_ms must be at least {MIN_UPLOAD_INTERVAL_MS}"
            )));
        }
        if !(1..=365).contains(&self.paste.expiry_days) {
            return Err(ConfigError::Validation(
                "paste.expiry_days must be 1-365".into(),
            ));
        }
        if self.report.max_url_display == 0 {
            return Err(ConfigError::Validation(
                "report.max_url_display must be non-zero".into(),
            ));
        }
        if self.report.output_name.is_empty() {
            return Err(ConfigError::Validation(
                "report.output_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Paste service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasteSettings {
    /// Upload oversized configurations at all.
    pub enabled: bool,
    /// Form POST endpoint.
    pub endpoint: String,
    /// Prefix stripped from the returned paste URL to get its identifier.
    pub view_prefix: String,
    /// How long the service keeps a paste.
    pub expiry_days: u32,
    /// Minimum delay between consecutive uploads.
    pub min_interval_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for PasteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://dpaste.com/api/v2/".to_string(),
            view_prefix: "https://dpaste.com/".to_string(),
            expiry_days: 365,
            min_interval_ms: MIN_UPLOAD_INTERVAL_MS,
            timeout_secs: 30,
            user_agent: "LiveCodes / https://livecodes.io/".to_string(),
        }
    }
}

impl PasteSettings {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Markdown report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// URLs longer than this are shortened in link text.
    pub max_url_display: usize,
    /// Name of the action output holding the report.
    pub output_name: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            max_url_display: 50,
            output_name: "message".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a settings file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock settings file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# LiveCodes Preview Configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding one project definition file (JSON) per project.
projects_root = ".livecodes"

# Playground used for projects that do not set "appUrl" themselves.
# app_url = "https://livecodes.io/"

# ---------------------------------------------------------------------------
# Paste service
# ---------------------------------------------------------------------------
# Configurations with inlined {{LC::TO_DATA_URL(...)}} files are uploaded here
# so the preview link stays short. Failed uploads keep the long link.
[paste]
enabled = true
endpoint = "https://dpaste.com/api/v2/"

# Prefix removed from the paste URL returned by the service.
view_prefix = "https://dpaste.com/"

# Days before the paste expires (1-365).
expiry_days = 365

# Minimum delay between uploads, in milliseconds (at least 1500).
min_interval_ms = 1500

# Per-request timeout, in seconds.
timeout_secs = 30

user_agent = "LiveCodes / https://livecodes.io/"

# ---------------------------------------------------------------------------
# Report
# ---------------------------------------------------------------------------
[report]
# Link text longer than this many characters is shortened with "...".
max_url_display = 50

# Name of the action output that receives the markdown.
output_name = "message"
"##
}
