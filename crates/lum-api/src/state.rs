//! Application state and environment-driven configuration.

use std::sync::Arc;
use std::time::Duration;

use lum_registry::{BackupAuthority, Registry, DEFAULT_PROMOTION_DELAY};

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to listen on (`LUM_PORT`, default 3000).
    pub port: u16,
    /// Base URL of the backup authority (`LUM_BACKUP_URL`). When unset,
    /// sync endpoints return 503 and auto-promotions are not reported.
    pub backup_url: Option<String>,
    /// Per-request timeout for authority calls
    /// (`LUM_BACKUP_TIMEOUT_SECS`, default 10).
    pub backup_timeout: Duration,
    /// Delay before a pending HWID auto-promotes
    /// (`LUM_PROMOTION_DELAY_SECS`, default 300).
    pub promotion_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            backup_url: None,
            backup_timeout: Duration::from_secs(10),
            promotion_delay: DEFAULT_PROMOTION_DELAY,
        }
    }
}

impl AppConfig {
    /// Read configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("LUM_PORT").unwrap_or(defaults.port),
            backup_url: std::env::var("LUM_BACKUP_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            backup_timeout: env_parse("LUM_BACKUP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.backup_timeout),
            promotion_delay: env_parse("LUM_PROMOTION_DELAY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.promotion_delay),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Shared application state: the registry and the optional backup
/// authority, both behind `Arc` so handler tasks and promotion timers
/// share them cheaply.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<Registry>,
    pub backup: Option<Arc<dyn BackupAuthority>>,
}

impl AppState {
    /// State with default configuration and no backup authority.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// State from explicit configuration and an optional authority.
    pub fn with_config(config: AppConfig, backup: Option<Arc<dyn BackupAuthority>>) -> Self {
        let registry = Arc::new(Registry::with_delay(config.promotion_delay));
        Self {
            config: Arc::new(config),
            registry,
            backup,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("known_hwids", &self.registry.len())
            .field("backup_configured", &self.backup.is_some())
            .finish()
    }
}
