// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings persistence
//!
//! Settings live in one TOML file under the state directory. Missing
//! file means defaults; out-of-range persisted values are repaired on
//! load and logged rather than refused, so an edited file can never
//! keep the daemon from starting.

use fallow_core::Settings;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SettingsFileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file {0} is not valid TOML: {1}")]
    Parse(String, String),
    #[error("settings serialization failed: {0}")]
    Serialize(String),
}

/// Load settings, repairing any out-of-range values.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsFileError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = std::fs::read_to_string(path)?;
    let mut settings: Settings = toml::from_str(&raw)
        .map_err(|e| SettingsFileError::Parse(path.display().to_string(), e.to_string()))?;

    for fix in settings.sanitize() {
        warn!(file = %path.display(), "{fix}");
    }
    Ok(settings)
}

/// Persist settings atomically (write to a sibling temp file, then rename).
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsFileError> {
    let raw = toml::to_string_pretty(settings)
        .map_err(|e| SettingsFileError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, raw)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
