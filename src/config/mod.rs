use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub paths: PathsConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every gateway request is resolved against
    pub base_url: String,
    /// Per-request timeout, milliseconds
    pub timeout_ms: u64,
}

/// Fixed navigation boundary paths the guard and gateway redirect to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub login: String,
    pub home: String,
    pub offline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persisted session state lives here, one JSON document per install
    pub state_file: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            home: "/home/index".to_string(),
            offline: "/500".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            paths: PathsConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("OPSCONSOLE_API_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = env::var("OPSCONSOLE_TIMEOUT_MS") {
            self.api.timeout_ms = v.parse().unwrap_or(self.api.timeout_ms);
        }
        if let Ok(v) = env::var("OPSCONSOLE_LOGIN_PATH") {
            self.paths.login = v;
        }
        if let Ok(v) = env::var("OPSCONSOLE_HOME_PATH") {
            self.paths.home = v;
        }
        if let Ok(v) = env::var("OPSCONSOLE_OFFLINE_PATH") {
            self.paths.offline = v;
        }
        if let Ok(v) = env::var("OPSCONSOLE_STATE_FILE") {
            self.storage.state_file = PathBuf::from(v);
        }
        self
    }
}

fn default_state_file() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".config")
            .join("opsconsole")
            .join("state.json"),
        Err(_) => PathBuf::from(".opsconsole").join("state.json"),
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Process-wide configuration singleton, loaded once from the environment
pub fn config() -> &'static AppConfig {
    &CONFIG
}
