//! Black-box scenario tests driving the real coordinator router end to end:
//! REST over `reqwest`, the agent socket over `tokio-tungstenite`. Each test
//! corresponds to one of the documented dispatch scenarios.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rcd_coordinator::config::CoordinatorConfig;
use rcd_coordinator::context::CoordinatorContext;
use rcd_storage::MemoryStore;
use rcd_wire::api::{CommandFilter, CommandView, SubmitRequest, SubmitResponse};
use rcd_wire::Frame;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

struct TestServer {
    base_url: String,
    http: reqwest::Client,
}

impl TestServer {
    async fn start(config: CoordinatorConfig) -> Self {
        let store: Arc<dyn rcd_storage::Store> = Arc::new(MemoryStore::new());
        let ctx = CoordinatorContext::new(store, config);
        let app = rcd_coordinator::routes::build_router(ctx);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        // give the listener a moment to accept
        tokio::time::sleep(Duration::from_millis(20)).await;
        Self { base_url: format!("http://{addr}"), http: reqwest::Client::new() }
    }

    fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/agent/socket?token={}", self.base_url.trim_start_matches("http://"), token)
    }

    async fn submit(&self, agent_id: &str, req: &SubmitRequest) -> reqwest::Response {
        self.http
            .post(format!("{}/agents/{agent_id}/commands", self.base_url))
            .json(req)
            .send()
            .await
            .expect("submit request")
    }

    async fn get_command(&self, command_id: &str) -> CommandView {
        self.http
            .get(format!("{}/commands/{command_id}", self.base_url))
            .send()
            .await
            .expect("get command request")
            .json()
            .await
            .expect("decode command view")
    }

    async fn agent_history(&self, agent_id: &str) -> Vec<CommandView> {
        self.http
            .get(format!("{}/agents/{agent_id}/commands", self.base_url))
            .query(&CommandFilter { limit: 100, ..Default::default() })
            .send()
            .await
            .expect("history request")
            .json()
            .await
            .expect("decode history")
    }

    async fn late_result_drops(&self) -> u64 {
        let stats: rcd_wire::api::StatisticsResponse = self
            .http
            .get(format!("{}/statistics", self.base_url))
            .send()
            .await
            .expect("stats request")
            .json()
            .await
            .expect("decode stats");
        stats.late_result_drops
    }
}

/// A fake agent driving the socket side of the protocol under test control.
struct FakeAgent {
    ws: tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
}

impl FakeAgent {
    async fn connect(server: &TestServer, token: &str) -> Self {
        let (ws, _) = tokio_tungstenite::connect_async(server.ws_url(token)).await.expect("agent connect");
        let mut agent = Self { ws };
        // first frame is always Welcome
        let frame = agent.next_frame().await.expect("welcome frame");
        assert!(matches!(frame, Frame::Welcome { .. }));
        agent
    }

    async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => return rcd_wire::decode(&text).ok(),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                _ => return None,
            }
        }
    }

    /// Waits for the next `Frame::Command` dispatched to this agent,
    /// silently acking any `ping` that arrives in the meantime.
    async fn next_command(&mut self) -> (rcd_core::CommandId, String) {
        loop {
            match self.next_frame().await.expect("frame before close") {
                Frame::Command { command_id, command, .. } => return (command_id, command),
                Frame::Ping => {
                    self.send(&Frame::Pong).await;
                }
                _ => continue,
            }
        }
    }

    async fn send(&mut self, frame: &Frame) {
        self.ws.send(Message::Text(rcd_wire::encode(frame))).await.expect("send frame");
    }

    async fn reply_completed(&mut self, command_id: rcd_core::CommandId, stdout: &str) {
        self.send(&Frame::Result {
            command_id,
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
            execution_time: 0.02,
        })
        .await;
    }
}

fn config_with_tokens(tokens: &[(&str, &str)]) -> CoordinatorConfig {
    let mut config = CoordinatorConfig::default();
    config.tokens = tokens.iter().map(|(token, agent)| (token.to_string(), agent.to_string())).collect();
    config
}

fn submit_req(command: &str) -> SubmitRequest {
    SubmitRequest { command: command.to_string(), timeout: Some(5), priority: None }
}

#[tokio::test]
async fn s1_simple_completion() {
    let server = TestServer::start(config_with_tokens(&[("tok-a1", "a1")])).await;
    let mut agent = FakeAgent::connect(&server, "tok-a1").await;

    let resp: SubmitResponse =
        server.submit("a1", &submit_req("whoami")).await.json().await.expect("submit response");

    let (command_id, command) = agent.next_command().await;
    assert_eq!(command_id, resp.command_id);
    assert_eq!(command, "whoami");
    agent.reply_completed(command_id, "remoteshell\n").await;

    let view = wait_for_terminal(&server, &resp.command_id.to_string()).await;
    assert_eq!(view.status, rcd_core::CommandStatus::Completed);
    assert_eq!(view.stdout, "remoteshell\n");
    assert_eq!(view.exit_code, Some(0));
    assert!(view.sent_at_ms.unwrap() <= view.completed_at_ms.unwrap());

    let history = server.agent_history("a1").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].command_id, resp.command_id);
}

#[tokio::test]
async fn s2_offline_queue_drains_in_order() {
    let server = TestServer::start(config_with_tokens(&[("tok-a2", "a2")])).await;

    let mut ids = Vec::new();
    for cmd in ["echo 1", "echo 2", "echo 3"] {
        let resp: SubmitResponse =
            server.submit("a2", &submit_req(cmd)).await.json().await.expect("submit response");
        assert_eq!(resp.status, rcd_core::CommandStatus::Pending);
        ids.push(resp.command_id);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let mut agent = FakeAgent::connect(&server, "tok-a2").await;
    for (i, expected_id) in ids.iter().enumerate() {
        let (command_id, command) = agent.next_command().await;
        assert_eq!(command_id, *expected_id, "command {i} arrived out of order");
        let stdout = format!("{}\n", i + 1);
        agent.reply_completed(command_id, &stdout).await;
    }

    for id in ids {
        let view = wait_for_terminal(&server, &id.to_string()).await;
        assert_eq!(view.status, rcd_core::CommandStatus::Completed);
    }
}

#[tokio::test]
async fn s3_priority_override() {
    let server = TestServer::start(config_with_tokens(&[("tok-a3", "a3")])).await;

    let mut by_priority = Vec::new();
    for (cmd, priority) in [("c1", 0), ("c2", 0), ("c3", 10), ("c4", 0)] {
        let req = SubmitRequest { command: cmd.to_string(), timeout: Some(5), priority: Some(priority) };
        let resp: SubmitResponse = server.submit("a3", &req).await.json().await.expect("submit response");
        by_priority.push((cmd, resp.command_id));
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let mut agent = FakeAgent::connect(&server, "tok-a3").await;
    let expected_order = ["c3", "c1", "c2", "c4"];
    for expected_cmd in expected_order {
        let (command_id, command) = agent.next_command().await;
        assert_eq!(command, expected_cmd);
        agent.reply_completed(command_id, "ok\n").await;
    }
}

#[tokio::test]
async fn s4_timeout_then_late_result_is_dropped() {
    let server = TestServer::start(config_with_tokens(&[("tok-a4", "a4")])).await;
    let mut agent = FakeAgent::connect(&server, "tok-a4").await;

    let req = SubmitRequest { command: "sleep 60".to_string(), timeout: Some(1), priority: None };
    let resp: SubmitResponse = server.submit("a4", &req).await.json().await.expect("submit response");
    let (command_id, _) = agent.next_command().await;

    // grace_seconds defaults to 5, so the deadline is ~timeout+grace out.
    let view = wait_for_terminal(&server, &resp.command_id.to_string()).await;
    assert_eq!(view.status, rcd_core::CommandStatus::Timeout);

    let drops_before = server.late_result_drops().await;
    agent.reply_completed(command_id, "too late\n").await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let view_after = server.get_command(&resp.command_id.to_string()).await;
    assert_eq!(view_after.status, rcd_core::CommandStatus::Timeout);
    assert_eq!(server.late_result_drops().await, drops_before + 1);
}

#[tokio::test]
async fn s5_validation_rejection() {
    let server = TestServer::start(CoordinatorConfig::default()).await;

    let resp = server.submit("a5", &submit_req("rm -rf /")).await;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: rcd_wire::api::ErrorBody = resp.json().await.expect("error body");
    assert_eq!(body.reason.as_deref(), Some("denied"));
    assert!(server.agent_history("a5").await.is_empty());

    let mut strict_config = CoordinatorConfig::default();
    strict_config.policy.allow_shell_operators = false;
    let strict_server = TestServer::start(strict_config).await;
    let resp = strict_server.submit("a5", &submit_req("ls; cat /etc/passwd")).await;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: rcd_wire::api::ErrorBody = resp.json().await.expect("error body");
    assert_eq!(body.reason.as_deref(), Some("shell_operator_forbidden"));
}

#[tokio::test]
async fn s6_session_supersession() {
    let server = TestServer::start(config_with_tokens(&[("tok-a6", "a6")])).await;

    let mut session_a = FakeAgent::connect(&server, "tok-a6").await;
    // give the registry a moment to record session A before session B dials in
    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut session_b = FakeAgent::connect(&server, "tok-a6").await;

    // Session A should observe a superseded close.
    let a_closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match session_a.ws.next().await {
                Some(Ok(Message::Close(frame))) => return frame.map(|f| f.code),
                Some(Ok(_)) => continue,
                _ => return None,
            }
        }
    })
    .await
    .expect("session A closed before timeout");
    assert_eq!(a_closed, Some(4000u16.into()));

    let resp: SubmitResponse =
        server.submit("a6", &submit_req("echo hi")).await.json().await.expect("submit response");
    let (command_id, _) = session_b.next_command().await;
    assert_eq!(command_id, resp.command_id);
}

async fn wait_for_terminal(server: &TestServer, command_id: &str) -> CommandView {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let view = server.get_command(command_id).await;
        if view.status.is_terminal() {
            return view;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("command {command_id} never reached a terminal status");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
