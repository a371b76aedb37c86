use super::*;
use rcd_core::FakeClock;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn fires_registered_deadline_once_clock_reaches_it() {
    let clock = Arc::new(FakeClock::new());
    let wheel = DeadlineWheel::spawn(clock.clone());
    let mut rx = wheel.register_agent(0);

    let command_id = CommandId::new();
    let deadline_ms = clock.unix_ms() + 1_000;
    wheel.register(0, command_id, 7, deadline_ms);

    clock.advance(Duration::from_millis(1_000));
    tokio::time::advance(Duration::from_millis(1_000)).await;

    let fired = rx.recv().await.expect("deadline should have fired");
    assert_eq!(fired.command_id, command_id);
    assert_eq!(fired.generation, 7);
}

#[tokio::test(start_paused = true)]
async fn does_not_fire_before_deadline() {
    let clock = Arc::new(FakeClock::new());
    let wheel = DeadlineWheel::spawn(clock.clone());
    let mut rx = wheel.register_agent(0);

    let command_id = CommandId::new();
    wheel.register(0, command_id, 1, clock.unix_ms() + 10_000);

    clock.advance(Duration::from_millis(1_000));
    tokio::time::advance(Duration::from_millis(1_000)).await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn routes_fired_deadlines_only_to_their_own_agent() {
    let clock = Arc::new(FakeClock::new());
    let wheel = DeadlineWheel::spawn(clock.clone());
    let mut rx_a = wheel.register_agent(0);
    let mut rx_b = wheel.register_agent(1);

    let command_id = CommandId::new();
    wheel.register(1, command_id, 1, clock.unix_ms() + 500);

    clock.advance(Duration::from_millis(500));
    tokio::time::advance(Duration::from_millis(500)).await;

    let fired = rx_b.recv().await.expect("agent b should see its own deadline");
    assert_eq!(fired.command_id, command_id);
    assert!(rx_a.try_recv().is_err());
}
