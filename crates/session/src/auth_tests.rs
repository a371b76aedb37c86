use super::*;

#[test]
fn authenticates_a_known_token() {
    let agent_id = AgentId::new();
    let index = TokenIndex::new(b"secret".to_vec(), [("tok-a".to_string(), agent_id)]);
    assert_eq!(index.authenticate("tok-a").unwrap(), agent_id);
}

#[test]
fn rejects_an_unknown_token() {
    let agent_id = AgentId::new();
    let index = TokenIndex::new(b"secret".to_vec(), [("tok-a".to_string(), agent_id)]);
    assert!(matches!(index.authenticate("tok-b"), Err(SessionError::UnknownToken)));
}

#[test]
fn different_keys_produce_different_digests_for_the_same_token() {
    let a = digest(b"key-a", "tok");
    let b = digest(b"key-b", "tok");
    assert_ne!(a, b);
}

#[test]
fn hash_prefix_never_contains_the_raw_token() {
    let prefix = hash_prefix(b"secret", "super-sensitive-token");
    assert_eq!(prefix.len(), 8);
    assert!(!prefix.contains("super"));
}
