use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_DATA_DIR: &str = ".pixelmind";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let api_url = non_empty_env("PIXELMIND_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let data_dir = non_empty_env("PIXELMIND_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let connect_timeout_secs = parse_u64_env("PIXELMIND_CONNECT_TIMEOUT_SECS", 5)?;
        let request_timeout_secs = parse_u64_env("PIXELMIND_REQUEST_TIMEOUT_SECS", 15)?;
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            api_url,
            data_dir,
            connect_timeout_secs,
            request_timeout_secs,
            log_level,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Каталог долговременного хранилища (кэш ленты).
    pub fn local_dir(&self) -> PathBuf {
        self.data_dir.join("local")
    }

    /// Каталог сессионного хранилища (текущий пользователь).
    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.join("session")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return None;
    }
    Some(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_positive_u64(key, &raw)
}

fn parse_positive_u64(key: &str, raw: &str) -> Result<u64> {
    let value = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
