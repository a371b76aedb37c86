use super::*;

#[test]
fn new_agent_starts_offline_with_no_last_connected() {
    let agent = Agent::new(AgentId::new(), 1_000);
    assert_eq!(agent.status, AgentStatus::Offline);
    assert!(agent.last_connected_ms.is_none());
    assert_eq!(agent.first_seen_ms, 1_000);
    assert!(agent.metadata.is_empty());
}

#[test]
fn status_displays_as_lowercase_word() {
    assert_eq!(AgentStatus::Online.to_string(), "online");
    assert_eq!(AgentStatus::Offline.to_string(), "offline");
}
