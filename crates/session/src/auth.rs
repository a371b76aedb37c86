//! Token authentication: bearer tokens never touch the lookup index or a
//! trace span in plaintext. Each configured `(token, agent_id)` pair is
//! stored keyed by an HMAC-SHA256 digest of the token, so a leaked log line
//! or core dump of the index never reveals a usable credential.

use hmac::{Hmac, Mac};
use rcd_core::AgentId;
use sha2::Sha256;
use std::collections::HashMap;

use crate::error::SessionError;

type HmacSha256 = Hmac<Sha256>;

#[allow(clippy::expect_used)]
fn digest(key: &[u8], token: &str) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Returns the first 8 hex characters of a token's digest, safe to put in a
/// tracing span or log line without revealing the token itself.
pub fn hash_prefix(key: &[u8], token: &str) -> String {
    digest(key, token)[..8].to_string()
}

/// A token → agent_id lookup keyed by HMAC digest rather than the raw
/// token, built once from the coordinator's configured `tokens` table.
pub struct TokenIndex {
    key: Vec<u8>,
    by_digest: HashMap<String, AgentId>,
}

impl TokenIndex {
    pub fn new(key: impl Into<Vec<u8>>, tokens: impl IntoIterator<Item = (String, AgentId)>) -> Self {
        let key = key.into();
        let by_digest =
            tokens.into_iter().map(|(token, agent_id)| (digest(&key, &token), agent_id)).collect();
        Self { key, by_digest }
    }

    pub fn authenticate(&self, token: &str) -> Result<AgentId, SessionError> {
        self.by_digest.get(&digest(&self.key, token)).copied().ok_or(SessionError::UnknownToken)
    }

    pub fn hash_prefix(&self, token: &str) -> String {
        hash_prefix(&self.key, token)
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
