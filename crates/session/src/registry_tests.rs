use super::*;
use rcd_core::AgentId;

#[tokio::test]
async fn second_registration_supersedes_the_first() {
    let registry = SessionRegistry::new();
    let agent_id = AgentId::new();

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    registry.register(agent_id, tx_a);
    assert!(registry.is_online(&agent_id));

    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    registry.register(agent_id, tx_b);

    assert_eq!(rx_a.recv().await, Some(CloseReason::Superseded));
    assert!(registry.is_online(&agent_id));
}

#[test]
fn unregister_is_a_noop_if_already_superseded() {
    let registry = SessionRegistry::new();
    let agent_id = AgentId::new();

    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    registry.register(agent_id, tx_a.clone());
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    registry.register(agent_id, tx_b);

    // The superseded session's own cleanup must not remove the newer one.
    registry.unregister(agent_id, &tx_a);
    assert!(registry.is_online(&agent_id));
}

#[test]
fn unregister_removes_the_current_registration() {
    let registry = SessionRegistry::new();
    let agent_id = AgentId::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    registry.register(agent_id, tx.clone());

    registry.unregister(agent_id, &tx);
    assert!(!registry.is_online(&agent_id));
}

#[test]
fn online_agent_ids_reflects_current_registrations() {
    let registry = SessionRegistry::new();
    let a = AgentId::new();
    let b = AgentId::new();
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    registry.register(a, tx_a);
    registry.register(b, tx_b);

    let mut ids = registry.online_agent_ids();
    ids.sort_by_key(|id| id.as_str().to_string());
    let mut expected = vec![a, b];
    expected.sort_by_key(|id| id.as_str().to_string());
    assert_eq!(ids, expected);
}
