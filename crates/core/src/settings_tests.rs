// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_match_documented_values() {
    let s = Settings::default();
    assert_eq!(s.world_name, "Resources");
    assert_eq!(s.reset_type, "daily");
    assert_eq!(s.reset_day, 1);
    assert_eq!(s.restart_time, 3);
    assert_eq!(s.reset_warning_time, 5);
    assert_eq!(s.reset_interval, 86_400);
    assert_eq!(s.admin_token, None);
}

#[test]
fn policy_carries_all_mode_fields() {
    let mut s = Settings::default();
    s.set_reset_type("weekly").unwrap();
    s.set_reset_day(3).unwrap();
    s.set_restart_time(6).unwrap();

    let p = s.policy();
    assert_eq!(p.kind, ResetKind::Weekly);
    assert_eq!(p.hour_of_day, 6);
    assert_eq!(p.day_of_week, 3);
    // Stored even though weekly ignores it; switching kinds keeps it.
    assert_eq!(p.day_of_month, 3);
    assert_eq!(p.interval_secs, 86_400);
}

#[test]
fn unknown_persisted_kind_falls_back_to_daily() {
    let s = Settings {
        reset_type: "fortnightly".to_string(),
        ..Settings::default()
    };
    assert_eq!(s.kind(), ResetKind::Daily);
}

#[test]
fn invalid_hour_is_rejected_without_mutation() {
    let mut s = Settings::default();
    assert_eq!(s.set_restart_time(24), Err(SettingsError::HourOutOfRange));
    assert_eq!(s.restart_time, 3);
}

#[test]
fn weekly_day_must_fit_a_week() {
    let mut s = Settings::default();
    s.set_reset_type("weekly").unwrap();
    assert_eq!(s.set_reset_day(8), Err(SettingsError::WeekdayOutOfRange));
    assert_eq!(s.reset_day, 1);

    s.set_reset_type("monthly").unwrap();
    s.set_reset_day(28).unwrap();
    assert_eq!(s.reset_day, 28);
}

#[test]
fn day_zero_and_overlarge_days_are_rejected() {
    let mut s = Settings::default();
    assert_eq!(s.set_reset_day(0), Err(SettingsError::DayOutOfRange));
    assert_eq!(s.set_reset_day(32), Err(SettingsError::DayOutOfRange));
}

#[test]
fn world_name_must_be_a_plain_directory_name() {
    let mut s = Settings::default();
    assert_eq!(s.set_world_name(""), Err(SettingsError::EmptyWorldName));
    assert!(matches!(
        s.set_world_name("a/b"),
        Err(SettingsError::InvalidWorldName(_))
    ));
    assert!(matches!(
        s.set_world_name(".."),
        Err(SettingsError::InvalidWorldName(_))
    ));
    s.set_world_name("mining").unwrap();
    assert_eq!(s.world_name, "mining");
}

#[test]
fn apply_routes_keys_to_setters() {
    let mut s = Settings::default();

    assert_eq!(s.apply("hour", "5"), Ok(Applied::Rearm));
    assert_eq!(s.restart_time, 5);

    assert_eq!(s.apply("type", "weekly"), Ok(Applied::Rearm));
    assert_eq!(s.apply("day", "3"), Ok(Applied::Rearm));
    assert_eq!(s.apply("interval", "3600"), Ok(Applied::Rearm));

    assert_eq!(s.apply("warning", "10"), Ok(Applied::Nothing));
    assert_eq!(s.reset_warning_time, 10);

    assert_eq!(s.apply("world", "mining"), Ok(Applied::EnsureWorld));
    assert_eq!(s.world_name, "mining");
}

#[test]
fn apply_rejects_bad_keys_and_values() {
    let mut s = Settings::default();
    assert_eq!(
        s.apply("cadence", "daily"),
        Err(SettingsError::UnknownKey("cadence".to_string()))
    );
    assert_eq!(
        s.apply("hour", "soon"),
        Err(SettingsError::InvalidNumber("soon".to_string()))
    );
    assert_eq!(
        s.apply("type", "yearly"),
        Err(SettingsError::UnknownKind("yearly".to_string()))
    );
    assert_eq!(s, Settings::default());
}

#[test]
fn sanitize_repairs_out_of_range_values() {
    let mut s = Settings {
        world_name: "../escape".to_string(),
        reset_type: "hourly".to_string(),
        reset_day: 0,
        restart_time: 99,
        ..Settings::default()
    };
    let fixes = s.sanitize();
    assert_eq!(fixes.len(), 4);
    assert_eq!(s.world_name, "Resources");
    assert_eq!(s.reset_type, "daily");
    assert_eq!(s.reset_day, 1);
    assert_eq!(s.restart_time, 3);
}

#[test]
fn sanitize_leaves_valid_settings_alone() {
    let mut s = Settings::default();
    assert!(s.sanitize().is_empty());
    assert_eq!(s, Settings::default());
}
