//! CLI error specs
//!
//! Verify the CLI rejects unknown commands and bad arguments without
//! touching the daemon.

use crate::prelude::*;

#[test]
fn unknown_subcommand_fails() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["frobnicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn set_requires_key_and_value() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "hour"]).fails();
}

#[test]
fn no_subcommand_prints_usage() {
    let temp = Project::empty();

    temp.fallow().args(&[]).fails().stderr_has("Usage");
}
