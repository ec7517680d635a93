// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Occupant-facing announcement channel

mod host;

pub use host::HostBroadcaster;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBroadcaster;

use async_trait::async_trait;
use fallow_core::OccupantId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivers announcements to everyone or to a single occupant.
///
/// Delivery is best effort: the engine logs failures and keeps the
/// cycle moving rather than aborting a reset over a lost message.
#[async_trait]
pub trait Broadcaster: Clone + Send + Sync + 'static {
    async fn broadcast(&self, message: &str) -> Result<(), NotifyError>;

    async fn notify(&self, occupant: &OccupantId, message: &str) -> Result<(), NotifyError>;
}
