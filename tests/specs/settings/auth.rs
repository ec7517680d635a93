//! Admin token specs
//!
//! When settings.toml carries an admin_token, mutating and trigger
//! commands must present it; read-only commands stay open.

use crate::prelude::*;

const TOKEN_SETTINGS: &str = "admin_token = \"sesame\"\n";

#[test]
fn set_without_token_is_rejected_and_changes_nothing() {
    let temp = Project::empty();
    temp.state_file("settings.toml", TOKEN_SETTINGS);

    temp.fallow()
        .args(&["set", "hour", "5"])
        .fails()
        .stderr_has("You do not have permission");

    // Read-only access stays open; the stored hour is untouched
    temp.fallow()
        .args(&["settings"])
        .passes()
        .stdout_has("hour = 3");

    // The rejected change never reached the settings file
    let persisted = std::fs::read_to_string(temp.state_path().join("settings.toml")).unwrap();
    assert!(!persisted.contains("restart_time"));
}

#[test]
fn set_with_a_wrong_token_is_rejected() {
    let temp = Project::empty();
    temp.state_file("settings.toml", TOKEN_SETTINGS);

    temp.fallow()
        .args(&["--token", "mellon", "set", "hour", "5"])
        .fails()
        .stderr_has("You do not have permission");
}

#[test]
fn set_with_the_token_is_accepted() {
    let temp = Project::empty();
    temp.state_file("settings.toml", TOKEN_SETTINGS);

    temp.fallow()
        .args(&["--token", "sesame", "set", "hour", "5"])
        .passes()
        .stdout_has("Set hour = 5");

    temp.fallow()
        .args(&["settings"])
        .passes()
        .stdout_has("hour = 5");
}

#[test]
fn reset_without_token_is_rejected() {
    let temp = Project::empty();
    temp.state_file("settings.toml", TOKEN_SETTINGS);

    temp.fallow()
        .args(&["reset"])
        .fails()
        .stderr_has("You do not have permission");
}
