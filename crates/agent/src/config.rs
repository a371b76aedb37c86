//! Agent-side configuration (spec.md §6): connection, liveness, and policy
//! fields with the identical shape the coordinator uses for policy, loaded
//! the same env-over-file way as `rcd-coordinator::config`.

use rcd_validator::Policy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub server_url: String,
    pub token: String,
    pub use_tls: bool,
    pub validate_tls: bool,

    pub reconnect_initial_ms: u64,
    pub reconnect_cap_ms: u64,
    pub ping_interval_s: u64,

    #[serde(flatten)]
    pub policy: Policy,

    pub log_level: String,
    pub log_file: Option<String>,
    pub log_rotate_bytes: u64,
    pub log_backups: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8443/agent/socket".to_string(),
            token: String::new(),
            use_tls: false,
            validate_tls: true,
            reconnect_initial_ms: 1_000,
            reconnect_cap_ms: 60_000,
            ping_interval_s: 30,
            policy: Policy::default(),
            log_level: "info".to_string(),
            log_file: None,
            log_rotate_bytes: 10 * 1024 * 1024,
            log_backups: 5,
        }
    }
}

impl AgentConfig {
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
        if let Ok(v) = std::env::var("RCD_AGENT_SERVER_URL") {
            self.server_url = v;
        }
        if let Ok(v) = std::env::var("RCD_AGENT_TOKEN") {
            self.token = v;
        }
        if let Ok(v) = std::env::var("RCD_AGENT_VALIDATE_TLS") {
            self.validate_tls = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("RCD_AGENT_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Ok(v) = std::env::var("RCD_AGENT_LOG_FILE") {
            self.log_file = Some(v);
        }
    }

    /// Full socket URL with the bearer token attached as a query parameter
    /// — spec.md §4.3's "only supported form" for the handshake.
    pub fn socket_url(&self) -> String {
        let sep = if self.server_url.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.server_url, sep, self.token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_url_attaches_token() {
        let config = AgentConfig { server_url: "wss://host/agent/socket".into(), token: "tok123".into(), ..Default::default() };
        assert_eq!(config.socket_url(), "wss://host/agent/socket?token=tok123");
    }
}
