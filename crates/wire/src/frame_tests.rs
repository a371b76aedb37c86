use super::*;

#[test]
fn command_frame_round_trips() {
    let frame = Frame::Command {
        command_id: CommandId::new(),
        command: "whoami".into(),
        timeout: 5,
        priority: 10,
    };
    let text = encode(&frame);
    assert_eq!(decode(&text).unwrap(), frame);
}

#[test]
fn encoded_frame_carries_a_type_tag() {
    let frame = Frame::Ping;
    let text = encode(&frame);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["type"], "ping");
}

#[test]
fn unknown_type_is_a_soft_decode_error_not_a_panic() {
    let result = decode(r#"{"type":"teleport","payload":1}"#);
    assert!(result.is_err());
}

#[test]
fn malformed_json_is_a_soft_decode_error() {
    let result = decode("{not json");
    assert!(result.is_err());
}

#[test]
fn result_for_unknown_command_id_still_decodes() {
    // Decoding succeeds regardless of whether the command_id is known to
    // the receiver; correlating it against in-flight waiters is the
    // session's job, not the wire format's.
    let frame = Frame::Result {
        command_id: CommandId::new(),
        stdout: "hi\n".into(),
        stderr: String::new(),
        exit_code: 0,
        execution_time: 0.01,
    };
    let text = encode(&frame);
    assert!(decode(&text).is_ok());
}

#[test]
fn outcome_maps_onto_the_three_terminal_statuses_a_waiter_can_resolve_to() {
    assert_eq!(CommandStatus::from(Outcome::Completed), CommandStatus::Completed);
    assert_eq!(CommandStatus::from(Outcome::Failed), CommandStatus::Failed);
    assert_eq!(CommandStatus::from(Outcome::TimedOut), CommandStatus::Timeout);
}
