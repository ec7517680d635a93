//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_is_idempotent() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();

    temp.fallow()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_running_after_start() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();

    temp.fallow()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Version:")
        .stdout_has("Uptime:");
}

#[test]
fn daemon_status_shows_world_and_schedule() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();

    temp.fallow()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("World: Resources")
        .stdout_has("Cadence: daily at 03:00")
        .stdout_has("Next reset:")
        .stdout_has("Cycle: idle");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();

    temp.fallow()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");
}

#[test]
fn daemon_status_reports_not_running_after_stop() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();
    temp.fallow().args(&["daemon", "stop"]).passes();

    temp.fallow()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_creates_pid_and_version_files() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();

    let state = temp.state_path();
    let has_files = wait_for(SPEC_WAIT_MAX_MS, || {
        state.join("daemon.pid").exists() && state.join("daemon.version").exists()
    });

    assert!(has_files, "daemon.pid and daemon.version should exist");
}

#[test]
fn daemon_creates_socket_file() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();

    let socket_dir = temp.socket_dir();
    let has_socket = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_dir(&socket_dir)
            .ok()
            .map(|entries| {
                entries.filter_map(|e| e.ok()).any(|entry| {
                    entry
                        .path()
                        .extension()
                        .map(|ext| ext == "sock")
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    });

    assert!(has_socket, "daemon socket file should exist");
}

#[test]
fn daemon_stop_removes_pid_file() {
    let temp = Project::empty();
    temp.fallow().args(&["daemon", "start"]).passes();
    temp.fallow().args(&["daemon", "stop"]).passes();

    let gone = wait_for(SPEC_WAIT_MAX_MS, || !temp.state_path().join("daemon.pid").exists());
    assert!(gone, "daemon.pid should be removed on stop");
}

#[test]
fn daemon_start_surfaces_settings_error() {
    let temp = Project::empty();
    temp.state_file("settings.toml", "world_name = [not toml");

    temp.fallow()
        .args(&["daemon", "start"])
        .fails()
        .stderr_has("not valid TOML");
}
