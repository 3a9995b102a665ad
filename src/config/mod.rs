use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend base URL; `/login`, `/register` and `/v1/users` hang off it
    pub base_url: String,
    /// None keeps the HTTP client's own defaults
    pub request_timeout_secs: Option<u64>,
    /// Per-request debug events from the HTTP client
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub config_dir: Option<PathBuf>,
    pub session_file: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("USERADMIN_API_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                self.api.base_url = trimmed.to_string();
            }
        }
        if let Ok(v) = env::var("USERADMIN_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().ok();
        }
        if let Ok(v) = env::var("USERADMIN_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        if let Ok(v) = env::var("USERADMIN_CONFIG_DIR") {
            if !v.trim().is_empty() {
                self.storage.config_dir = Some(PathBuf::from(v));
            }
        }

        self
    }

    pub fn development() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                request_timeout_secs: None,
                enable_request_logging: true,
            },
            storage: StorageConfig {
                config_dir: None,
                session_file: "session.json".to_string(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                request_timeout_secs: Some(30),
                enable_request_logging: true,
            },
            storage: StorageConfig {
                config_dir: None,
                session_file: "session.json".to_string(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://app.example.com/api".to_string(),
                request_timeout_secs: Some(15),
                enable_request_logging: false,
            },
            storage: StorageConfig {
                config_dir: None,
                session_file: "session.json".to_string(),
            },
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.request_timeout_secs.map(Duration::from_secs)
    }

    /// Directory holding the persisted session. Falls back to
    /// `$HOME/.config/useradmin` when no override is configured.
    pub fn config_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.storage.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let home = env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
                Ok(PathBuf::from(home).join(".config").join("useradmin"))
            }
        }
    }

    pub fn session_path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.config_dir()?.join(&self.storage.session_file))
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
