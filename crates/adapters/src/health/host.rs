// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{HealthError, HealthProbe};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Probe that reads the tick rate the host publishes to a stats file.
#[derive(Clone)]
pub struct HostHealthProbe {
    stats_path: PathBuf,
}

impl HostHealthProbe {
    pub fn new(stats_path: PathBuf) -> Self {
        Self { stats_path }
    }
}

#[async_trait]
impl HealthProbe for HostHealthProbe {
    async fn sample(&self) -> Result<f64, HealthError> {
        let raw = fs::read_to_string(&self.stats_path).await?;
        raw.trim()
            .parse::<f64>()
            .map_err(|e| HealthError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
