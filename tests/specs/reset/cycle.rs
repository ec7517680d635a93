//! Reset cycle specs
//!
//! Drive a full manual reset through the daemon and watch the world
//! storage get rebuilt.

use crate::prelude::*;

#[test]
fn ensure_creates_the_world_once() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["ensure"])
        .passes()
        .stdout_has("World created");

    temp.fallow()
        .args(&["ensure"])
        .passes()
        .stdout_has("World already exists");

    assert!(temp
        .state_path()
        .join("worlds/Resources/world.toml")
        .is_file());
}

#[test]
fn manual_reset_rebuilds_the_world() {
    let temp = Project::empty();

    // No warning hold so the cycle runs straight through
    temp.fallow().args(&["set", "warning", "0"]).passes();
    temp.fallow().args(&["ensure"]).passes();

    let manifest = temp.state_path().join("worlds/Resources/world.toml");
    let before = std::fs::read_to_string(&manifest).unwrap();

    temp.fallow()
        .args(&["reset"])
        .passes()
        .stdout_has("Reset started");

    // The rebuilt world gets a fresh seed, so the manifest changes
    let rebuilt = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_to_string(&manifest)
            .map(|after| after != before)
            .unwrap_or(false)
    });
    assert!(rebuilt, "world.toml should be rewritten by the reset");
}

#[test]
fn completed_reset_announces_to_players() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "warning", "0"]).passes();
    temp.fallow()
        .args(&["reset"])
        .passes()
        .stdout_has("Reset started");

    let messages = temp.state_path().join("messages.log");
    let announced = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_to_string(&messages)
            .map(|log| log.contains("reset completed"))
            .unwrap_or(false)
    });
    assert!(announced, "completion broadcast should land in messages.log");
}

#[test]
fn stop_during_teardown_still_rebuilds_the_world() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "warning", "0"]).passes();
    temp.fallow().args(&["ensure"]).passes();

    // Stop immediately after triggering; the daemon must finish the
    // in-flight cycle before exiting
    temp.fallow().args(&["reset"]).passes();
    temp.fallow()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");

    assert!(
        temp.state_path()
            .join("worlds/Resources/world.toml")
            .is_file(),
        "world should be rebuilt, not left deleted, across a stop"
    );
}

#[test]
fn reset_during_warning_hold_is_rejected() {
    let temp = Project::empty();

    // Long warning keeps the first cycle in its hold phase
    temp.fallow().args(&["set", "warning", "5"]).passes();
    temp.fallow()
        .args(&["reset"])
        .passes()
        .stdout_has("Reset started");

    temp.fallow()
        .args(&["reset"])
        .fails()
        .stderr_has("already in progress");
}

#[test]
fn warning_hold_broadcasts_the_countdown() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "warning", "5"]).passes();
    temp.fallow().args(&["reset"]).passes();

    let messages = temp.state_path().join("messages.log");
    let warned = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_to_string(&messages)
            .map(|log| log.contains("will reset in 5 minute(s)"))
            .unwrap_or(false)
    });
    assert!(warned, "warning broadcast should land in messages.log");

    // Status reflects the hold
    temp.fallow()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Cycle: warned");
}
