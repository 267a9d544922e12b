use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "HealthPredictX";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// SQLite file holding patients and health records
pub const CLINICAL_DB_FILE: &str = "health_db.sqlite";

/// SQLite file holding user credentials
pub const AUTH_DB_FILE: &str = "user_db.sqlite";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MODELS_DIR: &str = "models";
const DEFAULT_BIND: &str = "127.0.0.1:8501";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:1b";
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "healthpredictx=info,healthpredictx_lib=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration: defaults, overlaid by `HPX_*` environment
/// variables, overlaid by CLI flags in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub bind: SocketAddr,
    pub ollama_url: String,
    pub ollama_model: String,
    pub generation_timeout_secs: u64,
}

impl AppConfig {
    /// Build from defaults and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (testable without touching the
    /// process environment).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("HPX_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "HPX_BIND",
            value: bind_raw.clone(),
        })?;

        let generation_timeout_secs = match lookup("HPX_GENERATION_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "HPX_GENERATION_TIMEOUT_SECS",
                value: raw.clone(),
            })?,
            None => DEFAULT_GENERATION_TIMEOUT_SECS,
        };

        Ok(Self {
            data_dir: lookup("HPX_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            models_dir: lookup("HPX_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR)),
            bind,
            ollama_url: lookup("HPX_OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: lookup("HPX_OLLAMA_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            generation_timeout_secs,
        })
    }

    pub fn clinical_db_path(&self) -> PathBuf {
        self.data_dir.join(CLINICAL_DB_FILE)
    }

    pub fn auth_db_path(&self) -> PathBuf {
        self.data_dir.join(AUTH_DB_FILE)
    }
}

/// Fixed relative location of a disease model inside the models directory.
pub fn model_path(models_dir: &Path, file_stem: &str) -> PathBuf {
    models_dir.join(format!("{file_stem}.json"))
}
