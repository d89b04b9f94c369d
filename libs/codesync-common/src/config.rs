// Service configuration, read from the environment with local defaults

use std::path::PathBuf;

pub const DEFAULT_ORACLE_URL: &str = "https://api.jdoodle.com/v1/execute";

/// Default round-trip ceiling: the oracle's own execution limit plus network slack
pub const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// When unset, problems are served from `problems_path`
    pub redis_url: Option<String>,
    pub problems_path: PathBuf,
    pub languages_path: PathBuf,
    pub entry_points_path: PathBuf,
    pub oracle: OracleConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:5002"),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            problems_path: env_or("PROBLEMS_PATH", "config/problems.json").into(),
            languages_path: env_or("LANGUAGES_PATH", "config/languages.json").into(),
            entry_points_path: env_or("ENTRY_POINTS_PATH", "config/entry_points.json").into(),
            oracle: OracleConfig::from_env(),
        }
    }
}

impl OracleConfig {
    pub fn from_env() -> Self {
        let timeout_ms = std::env::var("ORACLE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ORACLE_TIMEOUT_MS);

        Self {
            endpoint: env_or("ORACLE_URL", DEFAULT_ORACLE_URL),
            client_id: env_or("ORACLE_CLIENT_ID", ""),
            client_secret: env_or("ORACLE_CLIENT_SECRET", ""),
            timeout_ms,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
