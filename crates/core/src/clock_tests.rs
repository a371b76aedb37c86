use super::*;

#[test]
fn fake_clock_advances_both_instant_and_unix_ms() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    let ms0 = clock.unix_ms();

    clock.advance(Duration::from_secs(5));

    assert_eq!(clock.now() - t0, Duration::from_secs(5));
    assert_eq!(clock.unix_ms() - ms0, 5_000);
}

#[test]
fn fake_clock_is_shared_across_clones() {
    let clock = FakeClock::new();
    let clone = clock.clone();
    clock.advance(Duration::from_secs(1));
    assert_eq!(clock.unix_ms(), clone.unix_ms());
}

#[test]
fn system_clock_unix_ms_is_plausible() {
    let clock = SystemClock;
    // Anything after 2020-01-01 in ms.
    assert!(clock.unix_ms() > 1_577_836_800_000);
}
