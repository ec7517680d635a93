//! CLI help specs
//!
//! Verify top-level help output lists the subcommands.

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["--help"])
        .passes()
        .stdout_has("daemon")
        .stdout_has("schedule")
        .stdout_has("reset")
        .stdout_has("settings");
}

#[test]
fn help_shows_about_line() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["--help"])
        .passes()
        .stdout_has("Scheduled resource world resets");
}

#[test]
fn version_flag_prints_version() {
    let temp = Project::empty();

    temp.fallow().args(&["--version"]).passes().stdout_has("fallow");
}
