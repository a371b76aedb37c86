use super::*;

crate::define_id! {
    pub struct TestId("tst-");
}

#[test]
fn new_ids_carry_the_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn two_new_ids_differ() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn round_trips_through_serde() {
    let id = TestId::new();
    let json = serde_json::to_string(&id).unwrap();
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}

#[test]
fn from_string_preserves_short_values() {
    let id = TestId::from_string("tst-custom");
    assert_eq!(id.as_str(), "tst-custom");
}

#[test]
fn borrow_str_allows_map_lookup_by_str() {
    use std::collections::HashMap;
    let id = TestId::new();
    let key = id.as_str().to_string();
    let mut map: HashMap<TestId, u32> = HashMap::new();
    map.insert(id, 7);
    assert_eq!(map.get(key.as_str()), Some(&7));
}
