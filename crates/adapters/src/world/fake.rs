// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory world gateway for engine and daemon tests

use super::{WorldAdapter, WorldError};
use async_trait::async_trait;
use fallow_core::{OccupantId, WorldInfo};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One gateway call, recorded in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldCall {
    Find(String),
    Create(String),
    Release { name: String, forced: bool },
    DeleteStorage(PathBuf),
    Occupants(String),
    Relocate { occupant: OccupantId, from: String },
}

#[derive(Debug, Default)]
struct FakeWorld {
    path: PathBuf,
    occupants: Vec<OccupantId>,
}

#[derive(Debug, Default)]
struct Inner {
    worlds: HashMap<String, FakeWorld>,
    relocated: Vec<OccupantId>,
    calls: Vec<WorldCall>,
    fail_create: bool,
    /// Number of upcoming release calls that should fail
    fail_release: u32,
    fail_delete: bool,
}

/// In-memory [`WorldAdapter`] with scriptable failures
#[derive(Clone, Default)]
pub struct FakeWorldAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl FakeWorldAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_world(&self, name: &str, occupants: &[&str]) {
        self.lock().worlds.insert(
            name.to_string(),
            FakeWorld {
                path: PathBuf::from(format!("/worlds/{name}")),
                occupants: occupants.iter().map(|o| OccupantId::from(*o)).collect(),
            },
        );
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.lock().fail_create = fail;
    }

    /// Fail the next `count` release calls
    pub fn set_fail_release(&self, count: u32) {
        self.lock().fail_release = count;
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.lock().fail_delete = fail;
    }

    pub fn calls(&self) -> Vec<WorldCall> {
        self.lock().calls.clone()
    }

    pub fn world_exists(&self, name: &str) -> bool {
        self.lock().worlds.contains_key(name)
    }

    pub fn relocated(&self) -> Vec<OccupantId> {
        self.lock().relocated.clone()
    }
}

#[async_trait]
impl WorldAdapter for FakeWorldAdapter {
    async fn find(&self, name: &str) -> Result<Option<WorldInfo>, WorldError> {
        let mut inner = self.lock();
        inner.calls.push(WorldCall::Find(name.to_string()));
        Ok(inner.worlds.get(name).map(|w| WorldInfo {
            name: name.to_string(),
            path: w.path.clone(),
        }))
    }

    async fn create(&self, name: &str) -> Result<WorldInfo, WorldError> {
        let mut inner = self.lock();
        inner.calls.push(WorldCall::Create(name.to_string()));
        if inner.fail_create {
            return Err(WorldError::Io(std::io::Error::other("create failed")));
        }
        if inner.worlds.contains_key(name) {
            return Err(WorldError::AlreadyExists(name.to_string()));
        }
        let path = PathBuf::from(format!("/worlds/{name}"));
        inner.worlds.insert(
            name.to_string(),
            FakeWorld {
                path: path.clone(),
                occupants: Vec::new(),
            },
        );
        Ok(WorldInfo {
            name: name.to_string(),
            path,
        })
    }

    async fn release(&self, name: &str, forced: bool) -> Result<(), WorldError> {
        let mut inner = self.lock();
        inner.calls.push(WorldCall::Release {
            name: name.to_string(),
            forced,
        });
        if inner.fail_release > 0 {
            inner.fail_release -= 1;
            return Err(WorldError::Io(std::io::Error::other("release failed")));
        }
        if !inner.worlds.contains_key(name) {
            return Err(WorldError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn delete_storage(&self, path: &Path) -> Result<(), WorldError> {
        let mut inner = self.lock();
        inner
            .calls
            .push(WorldCall::DeleteStorage(path.to_path_buf()));
        if inner.fail_delete {
            return Err(WorldError::Io(std::io::Error::other("delete failed")));
        }
        inner.worlds.retain(|_, w| w.path != path);
        Ok(())
    }

    async fn occupants(&self, name: &str) -> Result<Vec<OccupantId>, WorldError> {
        let mut inner = self.lock();
        inner.calls.push(WorldCall::Occupants(name.to_string()));
        Ok(inner
            .worlds
            .get(name)
            .map(|w| w.occupants.clone())
            .unwrap_or_default())
    }

    async fn relocate(&self, occupant: &OccupantId, from: &str) -> Result<(), WorldError> {
        let mut inner = self.lock();
        inner.calls.push(WorldCall::Relocate {
            occupant: occupant.clone(),
            from: from.to_string(),
        });
        if let Some(world) = inner.worlds.get_mut(from) {
            world.occupants.retain(|o| o != occupant);
        }
        inner.relocated.push(occupant.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
