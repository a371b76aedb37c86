use super::*;

#[test]
fn close_codes_match_the_documented_contract() {
    assert_eq!(CloseReason::AuthFailed.code(), 1008);
    assert_eq!(CloseReason::Graceful.code(), 1001);
    assert_eq!(CloseReason::Superseded.code(), 4000);
    assert_eq!(CloseReason::LivenessLost.code(), 4001);
}
