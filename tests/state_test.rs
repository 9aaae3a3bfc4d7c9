//! Tests for the restart counters and the reset-window/ceiling decision.

use chrono::{DateTime, Duration, Utc};
use lazarus::state::{RestartDecision, RestartPolicy, RestartState};

fn policy(max_restarts: u32, reset_window_ms: u64) -> RestartPolicy {
    RestartPolicy {
        max_restarts,
        restart_delay_ms: 5000,
        reset_window_ms,
    }
}

fn start_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-02-19T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[test]
fn first_crash_is_attempt_one() {
    let p = policy(5, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    let decision = state.note_crash(t0 + Duration::seconds(10), &p);
    assert_eq!(decision, RestartDecision::Retry { attempt: 1 });
    assert_eq!(state.restart_count, 1);
}

#[test]
fn crashes_within_window_count_up_to_ceiling() {
    let p = policy(5, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    for expected in 1..=5 {
        let now = t0 + Duration::seconds(i64::from(expected));
        let decision = state.note_crash(now, &p);
        assert_eq!(decision, RestartDecision::Retry { attempt: expected });
        assert_eq!(state.restart_count, expected);
    }

    let decision = state.note_crash(t0 + Duration::seconds(6), &p);
    assert_eq!(decision, RestartDecision::GiveUp);
}

#[test]
fn crashes_spaced_beyond_window_always_count_one() {
    let p = policy(3, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    let mut now = t0;
    for _ in 0..10 {
        now = now + Duration::milliseconds(60_001);
        let decision = state.note_crash(now, &p);
        assert_eq!(decision, RestartDecision::Retry { attempt: 1 });
        assert_eq!(state.restart_count, 1);
    }
}

#[test]
fn elapsed_exactly_at_window_does_not_reset() {
    // The reset comparison is strictly greater-than.
    let p = policy(2, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    assert_eq!(
        state.note_crash(t0, &p),
        RestartDecision::Retry { attempt: 1 }
    );

    let decision = state.note_crash(t0 + Duration::milliseconds(60_000), &p);
    assert_eq!(decision, RestartDecision::Retry { attempt: 2 });
}

#[test]
fn window_is_measured_from_the_last_attempt() {
    // Each retry restamps last_restart_time, so a third crash 40s after the
    // second is still inside the window even though it is 80s after the
    // first.
    let p = policy(2, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    assert_eq!(
        state.note_crash(t0, &p),
        RestartDecision::Retry { attempt: 1 }
    );
    assert_eq!(
        state.note_crash(t0 + Duration::seconds(40), &p),
        RestartDecision::Retry { attempt: 2 }
    );
    assert_eq!(
        state.note_crash(t0 + Duration::seconds(80), &p),
        RestartDecision::GiveUp
    );
}

#[test]
fn clock_skew_backwards_does_not_reset() {
    let p = policy(2, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    assert_eq!(
        state.note_crash(t0, &p),
        RestartDecision::Retry { attempt: 1 }
    );

    // Wall clock jumped back two hours; the count must survive.
    let decision = state.note_crash(t0 - Duration::hours(2), &p);
    assert_eq!(decision, RestartDecision::Retry { attempt: 2 });

    let decision = state.note_crash(t0 - Duration::hours(2), &p);
    assert_eq!(decision, RestartDecision::GiveUp);
}

#[test]
fn give_up_is_sticky_within_window() {
    let p = policy(1, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    assert_eq!(
        state.note_crash(t0, &p),
        RestartDecision::Retry { attempt: 1 }
    );
    assert_eq!(state.note_crash(t0, &p), RestartDecision::GiveUp);
    assert_eq!(state.note_crash(t0, &p), RestartDecision::GiveUp);
    assert_eq!(state.restart_count, 1);
}

#[test]
fn give_up_clears_after_window_passes() {
    // Forgiveness: once the window elapses, attempts start over at 1.
    let p = policy(1, 60_000);
    let t0 = start_time();
    let mut state = RestartState::new(t0);

    assert_eq!(
        state.note_crash(t0, &p),
        RestartDecision::Retry { attempt: 1 }
    );
    assert_eq!(state.note_crash(t0, &p), RestartDecision::GiveUp);

    let later = t0 + Duration::milliseconds(60_001);
    assert_eq!(
        state.note_crash(later, &p),
        RestartDecision::Retry { attempt: 1 }
    );
}

#[test]
fn default_policy_matches_documented_constants() {
    let p = RestartPolicy::default();
    assert_eq!(p.max_restarts, 5);
    assert_eq!(p.restart_delay_ms, 5000);
    assert_eq!(p.reset_window_ms, 60_000);
}
