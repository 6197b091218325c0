use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{cache::FreshnessPolicy, client::ProviderId};

pub const DEFAULT_NEWS_COUNT: usize = 3;
pub const DEFAULT_BASE_CURRENCY: &str = "RUB";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// How many news items to keep per location.
    pub news_count: Option<usize>,

    /// Currency the rate table is quoted against.
    pub base_currency: Option<String>,

    /// Where cached JSON documents live. Defaults to the platform cache dir.
    pub cache_dir: Option<PathBuf>,

    /// Refetch cached entries older than this. Absent means cached entries never expire.
    pub cache_ttl_minutes: Option<u64>,

    pub http_timeout_secs: Option<u64>,
}

impl Config {
    pub fn news_count(&self) -> usize {
        self.news_count.unwrap_or(DEFAULT_NEWS_COUNT)
    }

    pub fn base_currency(&self) -> &str {
        self.base_currency.as_deref().unwrap_or(DEFAULT_BASE_CURRENCY)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn freshness_policy(&self) -> FreshnessPolicy {
        match self.cache_ttl_minutes {
            Some(minutes) => FreshnessPolicy::MaxAge(chrono::Duration::minutes(minutes as i64)),
            None => FreshnessPolicy::PresentIsFresh,
        }
    }

    /// Resolved cache directory: explicit setting first, then the platform default.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.cache_dir().to_path_buf()),
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "countryinfo", "countryinfo-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Overlay API keys from `API_KEY_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ProviderId::all() {
            if let Some(key) = lookup(id.env_var()).filter(|k| !k.trim().is_empty()) {
                self.upsert_provider_api_key(*id, key);
            }
        }
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    /// Like [`Config::provider_api_key`], but with a hint on how to fix a missing key.
    pub fn require_api_key(&self, id: ProviderId) -> Result<&str> {
        self.provider_api_key(id).ok_or_else(|| {
            anyhow!(
                "No API key configured for provider '{id}'.\n\
                 Hint: run `countryinfo configure {id}` or set {}.",
                id.env_var()
            )
        })
    }
}
