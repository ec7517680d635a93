// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn broadcast_appends_timestamped_lines() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("messages.log");
    let notify = HostBroadcaster::new(log.clone());

    notify.broadcast("World reset complete!").await.unwrap();
    notify.broadcast("second").await.unwrap();

    let contents = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("World reset complete!"));
    assert!(lines[0].starts_with('['));
}

#[tokio::test]
async fn notify_prefixes_the_occupant() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("sub/messages.log");
    let notify = HostBroadcaster::new(log.clone());

    notify
        .notify(&OccupantId::from("alice"), "moving you out")
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("@alice moving you out"));
}
