use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::autopilot;
use crate::error::{AppError, Result};

const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_autopilot_interval")]
    pub autopilot_interval_secs: u64,

    #[serde(default = "default_activity_log_capacity")]
    pub activity_log_capacity: usize,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsdesk");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("newsdesk.db").to_string_lossy().to_string()
}

fn default_gemini_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_autopilot_interval() -> u64 {
    autopilot::DEFAULT_INTERVAL.as_secs()
}

fn default_activity_log_capacity() -> usize {
    autopilot::DEFAULT_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            autopilot_interval_secs: default_autopilot_interval(),
            activity_log_capacity: default_activity_log_capacity(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.gemini_api_key = Some(key);
            }
        }

        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.autopilot_interval_secs == 0 {
            return Err(AppError::Config(
                "autopilot_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsdesk")
            .join("config.toml")
    }

    pub fn autopilot_interval(&self) -> Duration {
        Duration::from_secs(self.autopilot_interval_secs)
    }
}
