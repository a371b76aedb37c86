//! Server configuration: a TOML file (`RCD_CONFIG` or `--config`) provides
//! the base, individual `RCD_*` environment variables override it field by
//! field, matching the teacher's env-var-first layering in `daemon/env.rs`.

use rcd_validator::Policy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8443";
pub const DEFAULT_STORE_PATH: &str = "rcd.sqlite3";
pub const DEFAULT_PING_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 1_000;
pub const DEFAULT_HISTORY_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub listen_addr: String,
    pub store_path: String,
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
    pub max_queue_size: usize,
    pub history_retention_days: u32,
    pub ping_interval_seconds: u64,
    pub max_output_bytes: usize,
    pub hmac_key: String,
    /// `token -> agent_id`. Tokens are never logged; see `rcd_session::auth`.
    pub tokens: HashMap<String, String>,
    #[serde(flatten)]
    pub policy: Policy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            store_path: DEFAULT_STORE_PATH.to_string(),
            tls_cert: None,
            tls_key: None,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            history_retention_days: DEFAULT_HISTORY_RETENTION_DAYS,
            ping_interval_seconds: DEFAULT_PING_INTERVAL_SECONDS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            hmac_key: "rcd-default-hmac-key-change-me".to_string(),
            tokens: HashMap::new(),
            policy: Policy::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Load from an optional TOML file, then apply `RCD_*` environment
    /// overrides on top. Mirrors the teacher's pattern of a typed config
    /// with every field independently overridable, rather than an
    /// all-or-nothing env/file choice.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
                toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("RCD_LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Ok(v) = std::env::var("RCD_STORE_PATH") {
            self.store_path = v;
        }
        if let Ok(v) = std::env::var("RCD_TLS_CERT") {
            self.tls_cert = Some(v);
        }
        if let Ok(v) = std::env::var("RCD_TLS_KEY") {
            self.tls_key = Some(v);
        }
        if let Ok(v) = env_usize("RCD_MAX_QUEUE_SIZE") {
            self.max_queue_size = v;
        }
        if let Ok(v) = env_u32("RCD_HISTORY_RETENTION_DAYS") {
            self.history_retention_days = v;
        }
        if let Ok(v) = env_u64("RCD_PING_INTERVAL_SECONDS") {
            self.ping_interval_seconds = v;
        }
        if let Ok(v) = std::env::var("RCD_HMAC_KEY") {
            self.hmac_key = v;
        }
        if let Ok(v) = env_u32("RCD_MAX_TIMEOUT_SECONDS") {
            self.policy.max_timeout_seconds = v;
        }
        if let Ok(v) = env_usize("RCD_MAX_COMMAND_LENGTH") {
            self.policy.max_length = v;
        }
        if let Ok(v) = std::env::var("RCD_ALLOW_SHELL_OPERATORS") {
            self.policy.allow_shell_operators = v == "1" || v.eq_ignore_ascii_case("true");
        }
    }

    pub fn tokens_by_agent(&self) -> Vec<(String, rcd_core::AgentId)> {
        self.tokens
            .iter()
            .map(|(token, agent_id)| (token.clone(), rcd_core::AgentId::from_string(agent_id)))
            .collect()
    }
}

fn env_usize(key: &str) -> Result<usize, ()> {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).ok_or(())
}

fn env_u32(key: &str) -> Result<u32, ()> {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).ok_or(())
}

fn env_u64(key: &str) -> Result<u64, ()> {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).ok_or(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}
