// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use std::time::Duration;

fn begin(warning_minutes: u32, clock: &FakeClock) -> (ResetCycle, Vec<Effect>) {
    ResetCycle::begin(
        "Resources",
        ResetTrigger::Scheduled,
        warning_minutes,
        19.5,
        clock,
    )
}

fn resolved(occupants: Vec<OccupantId>) -> CycleEvent {
    CycleEvent::TargetResolved {
        path: PathBuf::from("/worlds/Resources"),
        occupants,
    }
}

#[test]
fn begin_emits_start_and_resolves_target() {
    let clock = FakeClock::new();
    let (cycle, effects) = begin(0, &clock);

    assert_eq!(cycle.phase, ResetPhase::Evacuating);
    assert_eq!(cycle.world, "Resources");
    assert_eq!(effects.len(), 2);
    assert!(matches!(
        &effects[0],
        Effect::Emit(Event::CycleStarted { world, trigger })
            if world == "Resources" && *trigger == ResetTrigger::Scheduled
    ));
    assert!(matches!(
        &effects[1],
        Effect::ResolveTarget { world } if world == "Resources"
    ));
}

#[test]
fn occupants_are_relocated_and_notified_individually() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);

    let occupants = vec![OccupantId::from("alice"), OccupantId::from("bob")];
    let (_, effects) = cycle.transition(resolved(occupants), &clock);

    let relocations: Vec<_> = effects
        .iter()
        .filter(|e| matches!(e, Effect::Relocate { .. }))
        .collect();
    let notices: Vec<_> = effects
        .iter()
        .filter(|e| matches!(e, Effect::Notify { .. }))
        .collect();
    assert_eq!(relocations.len(), 2);
    assert_eq!(notices.len(), 2);
}

#[test]
fn empty_world_evacuates_trivially() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);

    let (next, effects) = cycle.transition(resolved(vec![]), &clock);
    assert_eq!(next.phase, ResetPhase::TearingDown);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Relocate { .. })));
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::ReleaseWorld { .. })));
}

#[test]
fn warning_holds_before_teardown() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(5, &clock);

    let (warned, effects) = cycle.transition(resolved(vec![]), &clock);
    assert_eq!(warned.phase, ResetPhase::Warned);
    assert!(warned.is_warned());

    // The countdown notice goes out now; the release must wait for the timer.
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Broadcast { message } if message == &warning_message(5)
    )));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::SetTimer { id, duration }
            if id == &teardown_timer_id("Resources") && *duration == Duration::from_secs(300)
    )));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::ReleaseWorld { .. })));

    let (tearing, effects) = warned.transition(CycleEvent::WarningElapsed, &clock);
    assert_eq!(tearing.phase, ResetPhase::TearingDown);
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::ReleaseWorld { .. })));
}

#[test]
fn full_cycle_reaches_completed_in_order() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);

    let (cycle, _) = cycle.transition(resolved(vec![OccupantId::from("alice")]), &clock);
    assert_eq!(cycle.phase, ResetPhase::TearingDown);

    let (cycle, effects) = cycle.transition(CycleEvent::Released, &clock);
    assert_eq!(cycle.phase, ResetPhase::TearingDown);
    assert!(matches!(
        &effects[0],
        Effect::DeleteStorage { path, .. } if path == &PathBuf::from("/worlds/Resources")
    ));

    let (cycle, effects) = cycle.transition(CycleEvent::StorageDeleted, &clock);
    assert_eq!(cycle.phase, ResetPhase::Rebuilding);
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::CreateWorld { .. })));

    clock.advance(Duration::from_millis(2500));
    let (cycle, effects) = cycle.transition(CycleEvent::Created { health_after: 20.0 }, &clock);
    assert_eq!(cycle.phase, ResetPhase::Completed);
    assert!(cycle.is_terminal());

    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Emit(Event::CycleCompleted { duration_ms, tps_before, tps_after, .. })
            if *duration_ms == 2500 && *tps_before == 19.5 && *tps_after == 20.0
    )));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Broadcast { message } if message == &completion_message(2500, 19.5, 20.0)
    )));
}

#[test]
fn unresolvable_target_fails_before_any_phase() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);

    let (failed, effects) = cycle.transition(
        CycleEvent::TargetUnavailable {
            reason: "create rejected".to_string(),
        },
        &clock,
    );
    assert!(matches!(failed.phase, ResetPhase::Failed { .. }));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::ReleaseWorld { .. })));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Emit(Event::CycleFailed { phase, .. }) if phase == "evacuating"
    )));
}

#[test]
fn release_failure_stops_before_storage_is_touched() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);
    let (cycle, _) = cycle.transition(resolved(vec![]), &clock);

    let (failed, effects) = cycle.transition(
        CycleEvent::ReleaseFailed {
            reason: "still held after forced unload".to_string(),
        },
        &clock,
    );
    assert!(failed.is_terminal());
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::DeleteStorage { .. } | Effect::CreateWorld { .. })));
    // Teardown failure is logged, not broadcast to occupants.
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::Broadcast { .. })));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Log { level: LogLevel::Error, .. }
    )));
}

#[test]
fn delete_failure_broadcasts_and_skips_rebuild() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);
    let (cycle, _) = cycle.transition(resolved(vec![]), &clock);
    let (cycle, _) = cycle.transition(CycleEvent::Released, &clock);

    let (failed, effects) = cycle.transition(
        CycleEvent::StorageDeleteFailed {
            reason: "permission denied".to_string(),
        },
        &clock,
    );
    assert!(failed.is_terminal());
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::CreateWorld { .. })));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Broadcast { message } if message == MSG_RESET_FAILED
    )));
}

#[test]
fn rebuild_failure_broadcasts_and_fails() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);
    let (cycle, _) = cycle.transition(resolved(vec![]), &clock);
    let (cycle, _) = cycle.transition(CycleEvent::Released, &clock);
    let (cycle, _) = cycle.transition(CycleEvent::StorageDeleted, &clock);

    let (failed, effects) = cycle.transition(
        CycleEvent::CreateFailed {
            reason: "generator error".to_string(),
        },
        &clock,
    );
    assert!(failed.is_terminal());
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Broadcast { message } if message == MSG_REBUILD_FAILED
    )));
    assert!(!effects.iter().any(|e| matches!(
        e,
        Effect::Broadcast { message } if message.contains("completed")
    )));
}

#[test]
fn out_of_order_events_leave_the_cycle_unchanged() {
    let clock = FakeClock::new();
    let (cycle, _) = begin(0, &clock);

    let (same, effects) = cycle.transition(CycleEvent::Released, &clock);
    assert_eq!(same.phase, cycle.phase);
    assert!(effects.is_empty());

    let (same, effects) = cycle.transition(CycleEvent::WarningElapsed, &clock);
    assert_eq!(same.phase, ResetPhase::Evacuating);
    assert!(effects.is_empty());
}
