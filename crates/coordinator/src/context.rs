//! The explicit `CoordinatorContext` the Design Notes require in place of
//! process-wide mutable globals: one struct, constructed once in `main`,
//! cloned (cheap — every field is `Arc`-backed) into every axum handler and
//! every session actor.

use std::sync::Arc;
use std::time::Instant;

use rcd_core::{Clock, SystemClock};
use rcd_engine::QueueEngine;
use rcd_session::{SessionRegistry, TokenIndex};
use rcd_storage::Store;
use rcd_validator::Policy;

use crate::config::CoordinatorConfig;

#[derive(Clone)]
pub struct CoordinatorContext {
    pub store: Arc<dyn Store>,
    pub engine: Arc<QueueEngine>,
    pub sessions: SessionRegistry,
    pub auth: Arc<TokenIndex>,
    pub policy: Arc<Policy>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<CoordinatorConfig>,
    pub start_time: Instant,
}

impl CoordinatorContext {
    pub fn new(store: Arc<dyn Store>, config: CoordinatorConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let policy = Arc::new(config.policy.clone());
        let engine = Arc::new(QueueEngine::new(Arc::clone(&store), Arc::clone(&clock), config.policy.clone()));
        let auth = Arc::new(TokenIndex::new(config.hmac_key.clone().into_bytes(), config.tokens_by_agent()));
        Self {
            store,
            engine,
            sessions: SessionRegistry::new(),
            auth,
            policy,
            clock,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}
