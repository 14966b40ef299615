use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Root of both the lookup endpoint and the review feed.
    pub catalog_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Courtesy pause between feed pages. `0` disables it.
    pub inter_page_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Directory receiving JSONL review snapshots.
    pub data_dir: PathBuf,
}
