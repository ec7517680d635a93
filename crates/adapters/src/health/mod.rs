// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment health sampling (tick rate)

mod host;

pub use host::HostHealthProbe;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeHealthProbe;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("health sample unavailable: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Samples the environment's current tick rate.
///
/// Callers fall back to a nominal rate when sampling fails; a cycle
/// never aborts over a missing health reading.
#[async_trait]
pub trait HealthProbe: Clone + Send + Sync + 'static {
    async fn sample(&self) -> Result<f64, HealthError>;
}
