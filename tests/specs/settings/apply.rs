//! Settings specs
//!
//! Verify settings display, mutation, persistence, and validation
//! through the CLI.

use crate::prelude::*;

#[test]
fn settings_shows_defaults() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["settings"])
        .passes()
        .stdout_has("world = Resources")
        .stdout_has("type = daily")
        .stdout_has("hour = 3")
        .stdout_has("warning = 5");
}

#[test]
fn set_hour_reports_and_persists() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["set", "hour", "5"])
        .passes()
        .stdout_has("Set hour = 5");

    temp.fallow()
        .args(&["settings"])
        .passes()
        .stdout_has("hour = 5");

    // Persisted to the settings file, not just in-memory
    let persisted = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_to_string(temp.state_path().join("settings.toml"))
            .map(|s| s.contains("restart_time = 5"))
            .unwrap_or(false)
    });
    assert!(persisted, "settings.toml should record the new hour");
}

#[test]
fn set_rejects_out_of_range_hour() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "hour", "99"]).fails();

    // The stored value is untouched
    temp.fallow()
        .args(&["settings"])
        .passes()
        .stdout_has("hour = 3");
}

#[test]
fn set_rejects_unknown_key() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "gravity", "9"]).fails();
}

#[test]
fn set_rejects_unknown_cadence() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "type", "fortnightly"]).fails();
}

#[test]
fn settings_survive_daemon_restart() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "world", "Mining"]).passes();
    temp.fallow().args(&["daemon", "stop"]).passes();

    temp.fallow()
        .args(&["settings"])
        .passes()
        .stdout_has("world = Mining");
}

#[test]
fn reload_rereads_the_settings_file() {
    let temp = Project::empty();

    // Start the daemon, then edit the file behind its back
    temp.fallow().args(&["daemon", "start"]).passes();
    temp.state_file("settings.toml", "world_name = \"Quarry\"\n");

    temp.fallow()
        .args(&["reload"])
        .passes()
        .stdout_has("Settings reloaded");

    temp.fallow()
        .args(&["settings"])
        .passes()
        .stdout_has("world = Quarry");
}
