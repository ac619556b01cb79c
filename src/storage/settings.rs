//! Settings storage
//!
//! Manages persistence of the backend location and reply pacing.

use crate::storage::{get_data_dir, StorageError};
use crate::types::config::{GatewayConfig, ReplyDelay, API_URL_ENV, DEFAULT_API_BASE_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Base URL of the news bot backend
    pub api_base_url: String,
    /// Timeout for each backend request, in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Lower bound of the cosmetic reply delay
    #[serde(default = "default_delay_min")]
    pub reply_delay_min_ms: u64,
    /// Upper bound of the cosmetic reply delay
    #[serde(default = "default_delay_max")]
    pub reply_delay_max_ms: u64,
}

fn default_timeout() -> u64 {
    60
}

fn default_delay_min() -> u64 {
    1000
}

fn default_delay_max() -> u64 {
    3000
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: default_timeout(),
            reply_delay_min_ms: default_delay_min(),
            reply_delay_max_ms: default_delay_max(),
        }
    }
}

impl AppSettings {
    /// Validate settings values
    ///
    /// Ensures all parameters are within acceptable ranges.
    pub fn validate(&mut self) {
        let url = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            tracing::warn!("Invalid api_base_url {:?}, using default", self.api_base_url);
            DEFAULT_API_BASE_URL.to_string()
        };

        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 600);

        self.reply_delay_max_ms = self.reply_delay_max_ms.min(10_000);
        if self.reply_delay_min_ms > self.reply_delay_max_ms {
            self.reply_delay_min_ms = self.reply_delay_max_ms;
        }
    }

    /// Apply the base URL from the environment, if set
    pub fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            tracing::info!("Using backend URL from {}: {}", API_URL_ENV, url);
            self.api_base_url = url;
            self.validate();
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..GatewayConfig::new(self.api_base_url.clone())
        }
    }

    pub fn reply_delay(&self) -> ReplyDelay {
        ReplyDelay::new(self.reply_delay_min_ms, self.reply_delay_max_ms)
    }
}

/// Get the settings file path
fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from disk, then apply the environment override
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> AppSettings {
    let mut settings = match get_settings_path().and_then(|p| load_settings_from(&p)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    };
    settings.apply_env_override(std::env::var(API_URL_ENV).ok());
    settings
}

/// Settings loading with error propagation
pub fn load_settings_from(path: &Path) -> Result<AppSettings, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, writing defaults");
        let settings = AppSettings::default();
        if let Err(e) = save_settings_to(&settings, path) {
            tracing::warn!("Failed to write default settings: {}", e);
        }
        return Ok(settings);
    }

    let json = fs::read_to_string(path)?;
    let mut settings: AppSettings = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!("Loaded settings from disk");
    Ok(settings)
}

/// Save settings to disk
fn save_settings_to(settings: &AppSettings, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;

    tracing::debug!("Saved settings to disk");
    Ok(())
}
