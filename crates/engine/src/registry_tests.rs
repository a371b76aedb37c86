use super::*;
use rcd_core::{Command, FakeClock};
use rcd_storage::MemoryStore;
use std::sync::Arc;

fn test_engine() -> QueueEngine {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    QueueEngine::new(store, clock, Policy::default())
}

#[tokio::test]
async fn existing_queue_for_is_none_before_first_use() {
    let engine = test_engine();
    let agent_id = AgentId::new();
    assert!(engine.existing_queue_for(&agent_id).is_none());
}

#[tokio::test]
async fn queue_for_lazily_spawns_and_caches_the_same_actor() {
    let engine = test_engine();
    let agent_id = AgentId::new();

    let first = engine.queue_for(agent_id);
    assert!(engine.existing_queue_for(&agent_id).is_some());

    let command = Command::new_pending(agent_id, "echo hi".into(), 30, 0, 1);
    first.submit(command).await.unwrap();

    // A second lookup must return a handle to the *same* actor, not a fresh
    // one, so the command submitted above is still visible.
    let second = engine.queue_for(agent_id);
    let summary = second.summary().await;
    assert_eq!(summary.pending, 1);
}

#[tokio::test]
async fn agents_get_independent_queues() {
    let engine = test_engine();
    let a = AgentId::new();
    let b = AgentId::new();

    let handle_a = engine.queue_for(a);
    let _handle_b = engine.queue_for(b);

    handle_a.submit(Command::new_pending(a, "echo a".into(), 30, 0, 1)).await.unwrap();

    let summary_a = engine.summary_for(&a).await.unwrap();
    let summary_b = engine.summary_for(&b).await.unwrap();
    assert_eq!(summary_a.pending, 1);
    assert_eq!(summary_b.pending, 0);
}

#[tokio::test]
async fn summary_for_unknown_agent_is_none() {
    let engine = test_engine();
    let agent_id = AgentId::new();
    assert!(engine.summary_for(&agent_id).await.is_none());
}

#[tokio::test]
async fn metrics_and_policy_are_shared_across_agents() {
    let engine = test_engine();
    let a = AgentId::new();
    let b = AgentId::new();

    let handle_a = engine.queue_for(a);
    let handle_b = engine.queue_for(b);
    handle_a.submit(Command::new_pending(a, "echo a".into(), 30, 0, 1)).await.unwrap();
    handle_b.submit(Command::new_pending(b, "echo b".into(), 30, 0, 2)).await.unwrap();

    // Both queues were validated against the one shared policy and
    // published to the one shared metrics set.
    assert_eq!(engine.policy().max_timeout_seconds, Policy::default().max_timeout_seconds);
    assert_eq!(engine.metrics().commands_dispatched, 0);
}
