use super::*;
use crate::filter::{ListFilter, StatsFilter, TransitionPatch};
use rcd_core::{AgentId, Command};

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("open in-memory sqlite store")
}

#[tokio::test]
async fn upsert_and_get_agent_round_trips_metadata() {
    let store = store();
    let agent_id = AgentId::new();
    let mut metadata = BTreeMap::new();
    metadata.insert("hostname".to_string(), "box-1".to_string());

    store.upsert_agent(&agent_id, metadata.clone()).await.unwrap();
    let agent = store.get_agent(&agent_id).await.unwrap().expect("agent exists");
    assert_eq!(agent.metadata, metadata);
    assert_eq!(agent.status, AgentStatus::Offline);
}

#[tokio::test]
async fn mark_agent_online_sets_last_connected() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    store.mark_agent(&agent_id, AgentStatus::Online).await.unwrap();

    let agent = store.get_agent(&agent_id).await.unwrap().unwrap();
    assert_eq!(agent.status, AgentStatus::Online);
    assert!(agent.last_connected_ms.is_some());
}

#[tokio::test]
async fn insert_command_rejects_duplicate_id() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    let command = Command::new_pending(agent_id, "echo hi".into(), 30, 0, 1000);
    let duplicate = Command { command_id: command.command_id, ..command.clone() };

    store.insert_command(command).await.unwrap();
    let err = store.insert_command(duplicate).await.unwrap_err();
    assert!(matches!(err, StoreError::CommandConflict));
}

#[tokio::test]
async fn transition_is_compare_and_set() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    let command = Command::new_pending(agent_id, "echo hi".into(), 30, 0, 1000);
    let id = command.command_id;
    store.insert_command(command).await.unwrap();

    let ok = store
        .transition(
            id,
            &[CommandStatus::Pending],
            CommandStatus::Sent,
            TransitionPatch { sent_at_ms: Some(2000), ..Default::default() },
        )
        .await
        .unwrap();
    assert!(ok);

    // A second attempt from the same `from` set fails: status moved on.
    let retried = store
        .transition(id, &[CommandStatus::Pending], CommandStatus::Sent, TransitionPatch::default())
        .await
        .unwrap();
    assert!(!retried);

    let loaded = store.get_command(id).await.unwrap().unwrap();
    assert_eq!(loaded.status, CommandStatus::Sent);
    assert_eq!(loaded.sent_at_ms, Some(2000));
}

#[tokio::test]
async fn transition_patch_writes_terminal_fields() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    let command = Command::new_pending(agent_id, "echo hi".into(), 30, 0, 1000);
    let id = command.command_id;
    store.insert_command(command).await.unwrap();

    store
        .transition(id, &[CommandStatus::Pending], CommandStatus::Sent, TransitionPatch::default())
        .await
        .unwrap();
    store
        .transition(
            id,
            &[CommandStatus::Sent],
            CommandStatus::Completed,
            TransitionPatch {
                completed_at_ms: Some(3000),
                stdout: Some("hi\n".into()),
                exit_code: Some(0),
                execution_time_seconds: Some(0.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let loaded = store.get_command(id).await.unwrap().unwrap();
    assert_eq!(loaded.status, CommandStatus::Completed);
    assert_eq!(loaded.stdout, "hi\n");
    assert_eq!(loaded.exit_code, Some(0));
}

#[tokio::test]
async fn pending_for_agent_orders_by_priority_then_age() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();

    let low = Command::new_pending(agent_id, "low".into(), 30, 0, 1000);
    let high = Command::new_pending(agent_id, "high".into(), 30, 10, 2000);
    let older_low = Command::new_pending(agent_id, "older-low".into(), 30, 0, 500);

    store.insert_command(low).await.unwrap();
    store.insert_command(high.clone()).await.unwrap();
    store.insert_command(older_low.clone()).await.unwrap();

    let pending = store.pending_for_agent(&agent_id).await.unwrap();
    let commands: Vec<&str> = pending.iter().map(|c| c.command.as_str()).collect();
    assert_eq!(commands, vec!["high", "older-low", "low"]);
}

#[tokio::test]
async fn list_commands_filters_by_status_and_paginates() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();
    for i in 0..3 {
        store
            .insert_command(Command::new_pending(agent_id, format!("cmd-{i}"), 30, 0, 1000 + i))
            .await
            .unwrap();
    }

    let all = store.list_commands(ListFilter::for_agent(agent_id.to_string())).await.unwrap();
    assert_eq!(all.len(), 3);

    let mut filter = ListFilter::for_agent(agent_id.to_string());
    filter.status = Some(CommandStatus::Pending);
    filter.limit = 2;
    let page = store.list_commands(filter).await.unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn purge_older_than_only_removes_terminal_commands() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();

    let stale_pending = Command::new_pending(agent_id, "still-pending".into(), 30, 0, 100);
    let stale_done = Command::new_pending(agent_id, "done".into(), 30, 0, 100);
    let done_id = stale_done.command_id;
    store.insert_command(stale_pending).await.unwrap();
    store.insert_command(stale_done).await.unwrap();
    store
        .transition(done_id, &[CommandStatus::Pending], CommandStatus::Cancelled, TransitionPatch::default())
        .await
        .unwrap();

    let purged = store.purge_older_than(10_000).await.unwrap();
    assert_eq!(purged, 1);
    assert!(store.get_command(done_id).await.unwrap().is_none());
}

#[tokio::test]
async fn statistics_counts_by_status_and_averages_execution_time() {
    let store = store();
    let agent_id = AgentId::new();
    store.upsert_agent(&agent_id, BTreeMap::new()).await.unwrap();

    let a = Command::new_pending(agent_id, "a".into(), 30, 0, 1000);
    let b = Command::new_pending(agent_id, "b".into(), 30, 0, 1000);
    let (a_id, b_id) = (a.command_id, b.command_id);
    store.insert_command(a).await.unwrap();
    store.insert_command(b).await.unwrap();

    store
        .transition(a_id, &[CommandStatus::Pending], CommandStatus::Sent, TransitionPatch::default())
        .await
        .unwrap();
    store
        .transition(
            a_id,
            &[CommandStatus::Sent],
            CommandStatus::Completed,
            TransitionPatch { execution_time_seconds: Some(2.0), ..Default::default() },
        )
        .await
        .unwrap();
    let _ = b_id;

    let stats = store.statistics(StatsFilter::default()).await.unwrap();
    assert_eq!(stats.counts_by_status.get(&CommandStatus::Completed), Some(&1));
    assert_eq!(stats.counts_by_status.get(&CommandStatus::Pending), Some(&1));
    assert_eq!(stats.average_execution_time_seconds, Some(2.0));
}
