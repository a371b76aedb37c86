use super::*;
use crate::filter::TransitionPatch;
use rcd_core::Command;

#[tokio::test]
async fn unknown_agent_mark_fails() {
    let store = MemoryStore::new();
    let err = store.mark_agent(&AgentId::new(), AgentStatus::Online).await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownAgent(_)));
}

#[tokio::test]
async fn transition_rejects_when_current_status_not_in_from_set() {
    let store = MemoryStore::new();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    let command = Command::new_pending(agent_id, "echo hi".into(), 30, 0, 1000);
    let id = command.command_id;
    store.insert_command(command).await.unwrap();

    let result = store
        .transition(id, &[CommandStatus::Sent], CommandStatus::Completed, TransitionPatch::default())
        .await
        .unwrap();
    assert!(!result);

    let loaded = store.get_command(id).await.unwrap().unwrap();
    assert_eq!(loaded.status, CommandStatus::Pending);
}

#[tokio::test]
async fn transition_on_missing_command_is_not_found() {
    let store = MemoryStore::new();
    let err = store
        .transition(CommandId::new(), &[CommandStatus::Pending], CommandStatus::Sent, TransitionPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::CommandNotFound));
}

#[tokio::test]
async fn pending_for_agent_matches_sqlite_ordering_contract() {
    let store = MemoryStore::new();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    store.insert_command(Command::new_pending(agent_id, "low".into(), 30, 0, 1000)).await.unwrap();
    store.insert_command(Command::new_pending(agent_id, "high".into(), 30, 10, 2000)).await.unwrap();

    let pending = store.pending_for_agent(&agent_id).await.unwrap();
    assert_eq!(pending[0].command, "high");
    assert_eq!(pending[1].command, "low");
}

#[tokio::test]
async fn purge_older_than_skips_in_flight_commands() {
    let store = MemoryStore::new();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    let mut command = Command::new_pending(agent_id, "still-running".into(), 30, 0, 0);
    command.status = CommandStatus::Executing;
    store.insert_command(command).await.unwrap();

    let purged = store.purge_older_than(1_000_000).await.unwrap();
    assert_eq!(purged, 0);
}
