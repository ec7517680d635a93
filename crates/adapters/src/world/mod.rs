// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! World gateway adapters

mod host;

pub use host::HostWorldAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWorldAdapter, WorldCall};

use async_trait::async_trait;
use fallow_core::{OccupantId, WorldInfo};
use std::path::Path;
use thiserror::Error;

/// Errors from world gateway operations
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world not found: {0}")]
    NotFound(String),
    #[error("world already exists: {0}")]
    AlreadyExists(String),
    #[error("world still occupied: {0}")]
    Occupied(String),
    #[error("storage path {0} is outside the worlds root")]
    PathOutsideRoot(String),
    #[error("corrupt world manifest at {0}: {1}")]
    Manifest(String, String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for the host's environment registry.
///
/// One world name maps to one registry entry with an on-disk
/// representation; the engine never touches storage except through
/// `delete_storage` on the path the gateway reported.
#[async_trait]
pub trait WorldAdapter: Clone + Send + Sync + 'static {
    /// Look up a world by name
    async fn find(&self, name: &str) -> Result<Option<WorldInfo>, WorldError>;

    /// Create a fresh world with default generation parameters
    async fn create(&self, name: &str) -> Result<WorldInfo, WorldError>;

    /// Unload the live world; `forced` is the retry variant
    async fn release(&self, name: &str, forced: bool) -> Result<(), WorldError>;

    /// Remove the on-disk representation owned by a released world
    async fn delete_storage(&self, path: &Path) -> Result<(), WorldError>;

    /// Occupants currently inside the world
    async fn occupants(&self, name: &str) -> Result<Vec<OccupantId>, WorldError>;

    /// Move an occupant out of `from` to the fallback world's entry point
    async fn relocate(&self, occupant: &OccupantId, from: &str) -> Result<(), WorldError>;
}
