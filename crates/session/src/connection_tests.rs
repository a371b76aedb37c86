use super::*;
use rcd_core::{CommandId, FakeClock};
use rcd_storage::MemoryStore;
use rcd_validator::Policy;

#[test]
fn truncate_leaves_short_output_untouched() {
    let (out, truncated) = truncate("hello".to_string(), 1024);
    assert_eq!(out, "hello");
    assert!(!truncated);
}

#[test]
fn truncate_cuts_at_the_byte_ceiling_on_a_char_boundary() {
    let s = "a".repeat(10);
    let (out, truncated) = truncate(s, 4);
    assert_eq!(out.len(), 4);
    assert!(truncated);
}

#[test]
fn truncate_does_not_split_a_multibyte_character() {
    let s = "é".repeat(5); // each 'é' is 2 bytes
    let (out, truncated) = truncate(s, 3);
    assert!(truncated);
    assert!(out.is_char_boundary(out.len()));
    assert_eq!(out.len(), 2); // rounds down to the nearest char boundary
}

fn test_queue() -> (Arc<QueueEngine>, AgentId) {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let clock: Arc<dyn rcd_core::Clock> = Arc::new(FakeClock::new());
    let engine = Arc::new(QueueEngine::new(store, clock, Policy::default()));
    let agent_id = AgentId::new();
    (engine, agent_id)
}

#[tokio::test]
async fn result_frame_resolves_the_matching_in_flight_command() {
    let (engine, agent_id) = test_queue();
    let queue = engine.queue_for(agent_id);
    let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();

    let command = rcd_core::Command::new_pending(agent_id, "whoami".into(), 30, 0, 1);
    let command = queue.submit(command).await.unwrap();
    queue.bind(Arc::new(WsSink::new(outbound_tx.clone()))).await;
    tokio::task::yield_now().await;

    let result = Frame::Result {
        command_id: command.command_id,
        stdout: "ok\n".into(),
        stderr: String::new(),
        exit_code: 0,
        execution_time: 0.01,
    };
    handle_frame(&rcd_wire::encode(&result), agent_id, &queue, &outbound_tx, SessionConfig::default())
        .await;

    let summary = queue.summary().await;
    assert_eq!(summary.in_flight, 0);
}

#[tokio::test]
async fn error_frame_resolves_as_failed() {
    let (engine, agent_id) = test_queue();
    let queue = engine.queue_for(agent_id);
    let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();

    let command = rcd_core::Command::new_pending(agent_id, "false".into(), 30, 0, 1);
    let command = queue.submit(command).await.unwrap();
    queue.bind(Arc::new(WsSink::new(outbound_tx.clone()))).await;
    tokio::task::yield_now().await;

    let error =
        Frame::Error { command_id: command.command_id, error: "spawn failed".into() };
    handle_frame(&rcd_wire::encode(&error), agent_id, &queue, &outbound_tx, SessionConfig::default())
        .await;

    let summary = queue.summary().await;
    assert_eq!(summary.in_flight, 0);
}

#[tokio::test]
async fn ping_frame_elicits_a_pong_reply() {
    let (engine, agent_id) = test_queue();
    let queue = engine.queue_for(agent_id);
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

    handle_frame(&rcd_wire::encode(&Frame::Ping), agent_id, &queue, &outbound_tx, SessionConfig::default())
        .await;

    let Message::Text(text) = outbound_rx.recv().await.unwrap() else {
        panic!("expected a text frame");
    };
    assert_eq!(rcd_wire::decode(&text).unwrap(), Frame::Pong);
}

#[tokio::test]
async fn unknown_command_id_on_result_is_dropped_not_fatal() {
    let (engine, agent_id) = test_queue();
    let queue = engine.queue_for(agent_id);
    let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();

    let result = Frame::Result {
        command_id: CommandId::new(),
        stdout: String::new(),
        stderr: String::new(),
        exit_code: 0,
        execution_time: 0.0,
    };
    // Must not panic.
    handle_frame(&rcd_wire::encode(&result), agent_id, &queue, &outbound_tx, SessionConfig::default())
        .await;
}

#[tokio::test]
async fn malformed_frame_is_dropped_not_fatal() {
    let (engine, agent_id) = test_queue();
    let queue = engine.queue_for(agent_id);
    let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();

    handle_frame("{not json", agent_id, &queue, &outbound_tx, SessionConfig::default()).await;
}
