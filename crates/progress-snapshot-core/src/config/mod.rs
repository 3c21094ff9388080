//! Configuration management with file and environment sources

use anyhow::{Context, anyhow};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::Error;

/// Environment variable holding the data store connection target
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Overrides the directory searched for `config.toml`
pub const CONFIG_DIR_ENV: &str = "PROGRESS_SNAPSHOT_CONFIG_DIR";
/// Overrides `snapshot.week_end_day`
pub const WEEK_END_DAY_ENV: &str = "PROGRESS_SNAPSHOT_WEEK_END_DAY";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// progress-snapshot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub snapshot: SnapshotSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// sqlx connection URL; usually supplied through `DATABASE_URL`
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// Weekday that closes a reporting week
    pub week_end_day: Weekday,
    /// Skip the run entirely unless today is `week_end_day`
    pub only_on_week_end_day: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            week_end_day: Weekday::Sun,
            only_on_week_end_day: false,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("progress-snapshot")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file (if present), then apply environment overrides
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Load only the config file, falling back to defaults when it doesn't exist
    pub fn load_file() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.database.url = Some(url.trim().to_string());
        }

        if let Some(day) = lookup(WEEK_END_DAY_ENV) {
            self.snapshot.week_end_day = day
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid {} value: {}", WEEK_END_DAY_ENV, day))?;
        }

        Ok(())
    }

    /// The configured connection URL, validated for this workspace's sqlx backend
    pub fn database_url(&self) -> crate::Result<&str> {
        let url = self
            .database
            .url
            .as_deref()
            .ok_or_else(|| Error::ConfigError(format!("{} is not set", DATABASE_URL_ENV)))?;

        if !url.starts_with("sqlite:") {
            return Err(Error::ConfigError(format!(
                "Unsupported database URL '{}': only sqlite: URLs are supported",
                url
            )));
        }

        Ok(url)
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "database.url" => Ok(self
                .database
                .url
                .clone()
                .unwrap_or_else(|| format!("(not set - use {} env var)", DATABASE_URL_ENV))),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),
            "snapshot.week_end_day" => Ok(self.snapshot.week_end_day.to_string()),
            "snapshot.only_on_week_end_day" => Ok(self.snapshot.only_on_week_end_day.to_string()),
            _ => Err(anyhow!("Unknown configuration key: {}", key)),
        }
    }
}
