// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_both_clocks() {
    let clock = FakeClock::new();
    let mono = clock.now();
    let wall = clock.wall_now();

    clock.advance(Duration::from_secs(90));

    assert_eq!(clock.now(), mono + Duration::from_secs(90));
    assert_eq!(clock.wall_now(), wall + chrono::Duration::seconds(90));
}

#[test]
fn fake_clock_set_wall_leaves_monotonic_alone() {
    let clock = FakeClock::new();
    let mono = clock.now();

    let wall = chrono::NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    clock.set_wall(wall);

    assert_eq!(clock.wall_now(), wall);
    assert_eq!(clock.now(), mono);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();

    clock.advance(Duration::from_secs(5));

    assert_eq!(clock.now(), other.now());
    assert_eq!(clock.wall_now(), other.wall_now());
}
