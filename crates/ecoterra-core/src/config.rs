//! Application configuration management.
//!
//! Holds the API base URL, the storage backend for the session, transport
//! tuning and the last email used to log in.
//!
//! Configuration is stored at `~/.config/ecoterra/config.json`. The
//! `ECOTERRA_API_URL` and `ECOTERRA_STORAGE` environment variables override
//! the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{HttpTransport, TransportOptions};
use crate::auth::AuthGateway;
use crate::storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "ecoterra";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://192.168.0.100:3000";

pub const API_URL_ENV: &str = "ECOTERRA_API_URL";
pub const STORAGE_ENV: &str = "ECOTERRA_STORAGE";

/// Where the token and profile snapshot are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub storage: StorageBackend,
    pub request_timeout_secs: u64,
    pub max_rate_limit_retries: u32,
    pub initial_backoff_ms: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let transport = TransportOptions::default();
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            storage: StorageBackend::default(),
            request_timeout_secs: transport.timeout.as_secs(),
            max_rate_limit_retries: transport.max_rate_limit_retries,
            initial_backoff_ms: transport.initial_backoff.as_millis() as u64,
            last_email: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from the environment, read through `var`.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(backend) = var(STORAGE_ENV).filter(|v| !v.trim().is_empty()) {
            self.storage = backend
                .parse()
                .with_context(|| format!("Invalid {}", STORAGE_ENV))?;
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_rate_limit_retries: self.max_rate_limit_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
        }
    }

    /// Open the configured storage backend; file storage lives in `cache_dir`.
    pub fn open_storage(&self, cache_dir: &Path) -> Arc<dyn KeyValueStore> {
        match self.storage {
            StorageBackend::File => Arc::new(FileStore::in_dir(cache_dir)),
            StorageBackend::Keyring => Arc::new(KeyringStore::default()),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        }
    }

    /// Wire an `AuthGateway` from this configuration.
    pub fn gateway(&self, cache_dir: &Path) -> Result<AuthGateway> {
        let transport = HttpTransport::with_options(&self.api_base_url, self.transport_options())
            .context("Failed to build HTTP client")?;
        Ok(AuthGateway::new(Arc::new(transport), self.open_storage(cache_dir)))
    }
}
