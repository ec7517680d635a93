// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{Broadcaster, NotifyError};
use async_trait::async_trait;
use fallow_core::OccupantId;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Broadcaster that appends announcements to the host's message log.
///
/// The host picks the lines up from this file and fans them out to
/// connected occupants; one line per message, `@<occupant>` prefix for
/// targeted delivery.
#[derive(Clone)]
pub struct HostBroadcaster {
    log_path: PathBuf,
}

impl HostBroadcaster {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    async fn append(&self, line: &str) -> Result<(), NotifyError> {
        if let Some(parent) = self.log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        file.write_all(format!("[{stamp}] {line}\n").as_bytes())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Broadcaster for HostBroadcaster {
    async fn broadcast(&self, message: &str) -> Result<(), NotifyError> {
        tracing::debug!(message, "broadcast");
        self.append(message).await
    }

    async fn notify(&self, occupant: &OccupantId, message: &str) -> Result<(), NotifyError> {
        tracing::debug!(occupant = %occupant, message, "notify");
        self.append(&format!("@{occupant} {message}")).await
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
