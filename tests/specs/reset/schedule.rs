//! Schedule specs
//!
//! Verify the armed schedule follows the settings.

use crate::prelude::*;

#[test]
fn schedule_defaults_to_daily() {
    let temp = Project::empty();

    temp.fallow()
        .args(&["schedule"])
        .passes()
        .stdout_has("Cadence: daily at 03:00")
        .stdout_has("Next reset:");
}

#[test]
fn schedule_follows_cadence_changes() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "type", "weekly"]).passes();

    temp.fallow()
        .args(&["schedule"])
        .passes()
        .stdout_has("Cadence: weekly on Monday at 03:00");
}

#[test]
fn schedule_shows_monthly_day() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "type", "monthly"]).passes();
    temp.fallow().args(&["set", "day", "15"]).passes();

    temp.fallow()
        .args(&["schedule"])
        .passes()
        .stdout_has("monthly on day 15");
}

#[test]
fn interval_schedule_is_repeating() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "type", "interval"]).passes();
    temp.fallow().args(&["set", "interval", "3600"]).passes();

    temp.fallow()
        .args(&["schedule"])
        .passes()
        .stdout_has("every 1 hour(s)")
        .stdout_has("Repeating: yes");
}

#[test]
fn set_hour_rearms_the_timer() {
    let temp = Project::empty();

    temp.fallow().args(&["set", "hour", "7"]).passes();

    temp.fallow()
        .args(&["schedule"])
        .passes()
        .stdout_has("Cadence: daily at 07:00")
        .stdout_has("07:00:00");
}
