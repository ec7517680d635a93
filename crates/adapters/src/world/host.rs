// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-convention world gateway
//!
//! Each world is a directory under the worlds root:
//!
//! ```text
//! <root>/<name>/world.toml      manifest (name, seed, created_at)
//! <root>/<name>/.held           marker while the world is loaded
//! <root>/<name>/occupants/<id>  one entry file per occupant
//! ```
//!
//! `release` refuses to drop the held marker while occupants remain
//! unless forced, which mirrors a live host rejecting an unload of a
//! world that still has participants in it.

use super::{WorldAdapter, WorldError};
use async_trait::async_trait;
use fallow_core::{OccupantId, WorldInfo};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

const MANIFEST: &str = "world.toml";
const HELD_MARKER: &str = ".held";
const OCCUPANTS_DIR: &str = "occupants";

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    name: String,
    /// Generation seed; fresh per rebuild
    seed: String,
    created_at: chrono::NaiveDateTime,
}

/// World gateway backed by a directory tree
#[derive(Clone)]
pub struct HostWorldAdapter {
    root: PathBuf,
    fallback: String,
}

impl HostWorldAdapter {
    /// `fallback` names the world occupants are evacuated into.
    pub fn new(root: PathBuf, fallback: impl Into<String>) -> Self {
        Self {
            root,
            fallback: fallback.into(),
        }
    }

    fn world_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl WorldAdapter for HostWorldAdapter {
    async fn find(&self, name: &str) -> Result<Option<WorldInfo>, WorldError> {
        let dir = self.world_dir(name);
        let manifest_path = dir.join(MANIFEST);
        if !manifest_path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&manifest_path).await?;
        let manifest: Manifest = toml::from_str(&raw)
            .map_err(|e| WorldError::Manifest(manifest_path.display().to_string(), e.to_string()))?;

        Ok(Some(WorldInfo {
            name: manifest.name,
            path: dir,
        }))
    }

    async fn create(&self, name: &str) -> Result<WorldInfo, WorldError> {
        let dir = self.world_dir(name);
        if dir.join(MANIFEST).exists() {
            return Err(WorldError::AlreadyExists(name.to_string()));
        }

        fs::create_dir_all(dir.join(OCCUPANTS_DIR)).await?;

        let manifest = Manifest {
            name: name.to_string(),
            seed: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Local::now().naive_local(),
        };
        let raw = toml::to_string_pretty(&manifest)
            .map_err(|e| WorldError::Manifest(name.to_string(), e.to_string()))?;
        fs::write(dir.join(MANIFEST), raw).await?;
        fs::write(dir.join(HELD_MARKER), b"").await?;

        tracing::info!(world = name, "created world");
        Ok(WorldInfo {
            name: name.to_string(),
            path: dir,
        })
    }

    async fn release(&self, name: &str, forced: bool) -> Result<(), WorldError> {
        let dir = self.world_dir(name);
        if !dir.join(MANIFEST).exists() {
            return Err(WorldError::NotFound(name.to_string()));
        }

        if !forced {
            let remaining = self.occupants(name).await?;
            if !remaining.is_empty() {
                return Err(WorldError::Occupied(name.to_string()));
            }
        }

        let marker = dir.join(HELD_MARKER);
        if marker.exists() {
            fs::remove_file(&marker).await?;
        }
        tracing::info!(world = name, forced, "released world");
        Ok(())
    }

    async fn delete_storage(&self, path: &Path) -> Result<(), WorldError> {
        // Only ever delete inside the worlds root.
        if !path.starts_with(&self.root) || path == self.root {
            return Err(WorldError::PathOutsideRoot(path.display().to_string()));
        }

        match fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            // Already gone counts as deleted.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WorldError::Io(e)),
        }
    }

    async fn occupants(&self, name: &str) -> Result<Vec<OccupantId>, WorldError> {
        let dir = self.world_dir(name).join(OCCUPANTS_DIR);
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut occupants = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            occupants.push(OccupantId::new(entry.file_name().to_string_lossy()));
        }
        occupants.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(occupants)
    }

    async fn relocate(&self, occupant: &OccupantId, from: &str) -> Result<(), WorldError> {
        let source = self
            .world_dir(from)
            .join(OCCUPANTS_DIR)
            .join(occupant.as_str());
        if !source.exists() {
            return Err(WorldError::NotFound(format!("{from}/{occupant}")));
        }

        let dest_dir = self.world_dir(&self.fallback).join(OCCUPANTS_DIR);
        fs::create_dir_all(&dest_dir).await?;
        fs::rename(&source, dest_dir.join(occupant.as_str())).await?;

        tracing::info!(occupant = %occupant, from, to = %self.fallback, "relocated occupant");
        Ok(())
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
