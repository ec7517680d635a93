// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated daemon settings with the documented defaults
//!
//! The persisted record stores the raw values; `policy()` derives the
//! evaluator input. Setters validate at the boundary and reject invalid
//! values without mutating, so the scheduler only ever sees well-formed
//! policies.

use crate::policy::{ResetKind, ResetPolicy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors from settings validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("hour must be between 0 and 23")]
    HourOutOfRange,
    #[error("day must be between 1 and 7 for weekly resets")]
    WeekdayOutOfRange,
    #[error("day must be between 1 and 31")]
    DayOutOfRange,
    #[error("unknown reset type: {0}")]
    UnknownKind(String),
    #[error("world name cannot be empty")]
    EmptyWorldName,
    #[error("world name must be a plain directory name: {0}")]
    InvalidWorldName(String),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("unknown setting: {0}")]
    UnknownKey(String),
}

/// What a successful setting change requires of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Cadence changed; cancel and rearm the reset timer.
    Rearm,
    /// Target world changed; make sure it exists.
    EnsureWorld,
    /// No scheduling consequence (picked up by the next cycle).
    Nothing,
}

/// Persisted daemon settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_world_name")]
    pub world_name: String,
    #[serde(default = "default_reset_type")]
    pub reset_type: String,
    #[serde(default = "default_reset_day")]
    pub reset_day: u8,
    #[serde(default = "default_restart_time")]
    pub restart_time: u8,
    #[serde(default = "default_reset_warning_time")]
    pub reset_warning_time: u32,
    #[serde(default = "default_reset_interval")]
    pub reset_interval: u32,
    /// When set, mutating and trigger requests must present this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

fn default_world_name() -> String {
    "Resources".to_string()
}

fn default_reset_type() -> String {
    "daily".to_string()
}

fn default_reset_day() -> u8 {
    1
}

fn default_restart_time() -> u8 {
    3
}

fn default_reset_warning_time() -> u32 {
    5
}

fn default_reset_interval() -> u32 {
    86_400
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_name: default_world_name(),
            reset_type: default_reset_type(),
            reset_day: default_reset_day(),
            restart_time: default_restart_time(),
            reset_warning_time: default_reset_warning_time(),
            reset_interval: default_reset_interval(),
            admin_token: None,
        }
    }
}

impl Settings {
    /// Reset kind, defaulting to daily for unrecognized persisted values.
    pub fn kind(&self) -> ResetKind {
        ResetKind::from_str(&self.reset_type).unwrap_or(ResetKind::Daily)
    }

    /// The evaluator input derived from the current settings.
    pub fn policy(&self) -> ResetPolicy {
        ResetPolicy {
            kind: self.kind(),
            hour_of_day: self.restart_time,
            day_of_week: self.reset_day,
            day_of_month: self.reset_day,
            interval_secs: self.reset_interval,
        }
    }

    pub fn warning_minutes(&self) -> u32 {
        self.reset_warning_time
    }

    /// Repair out-of-range persisted values, returning a description of
    /// every correction so the loader can log them.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();
        if validate_world_name(&self.world_name).is_err() {
            fixes.push(format!(
                "invalid world_name {:?}, using {:?}",
                self.world_name,
                default_world_name()
            ));
            self.world_name = default_world_name();
        }
        if ResetKind::from_str(&self.reset_type).is_err() {
            fixes.push(format!(
                "unknown reset_type {:?}, using \"daily\"",
                self.reset_type
            ));
            self.reset_type = default_reset_type();
        }
        if self.restart_time > 23 {
            fixes.push(format!(
                "restart_time {} out of range, using {}",
                self.restart_time,
                default_restart_time()
            ));
            self.restart_time = default_restart_time();
        }
        if self.reset_day == 0 || self.reset_day > 31 {
            fixes.push(format!(
                "reset_day {} out of range, using {}",
                self.reset_day,
                default_reset_day()
            ));
            self.reset_day = default_reset_day();
        }
        fixes
    }

    pub fn set_world_name(&mut self, name: &str) -> Result<(), SettingsError> {
        validate_world_name(name)?;
        self.world_name = name.to_string();
        Ok(())
    }

    pub fn set_reset_type(&mut self, kind: &str) -> Result<(), SettingsError> {
        let parsed =
            ResetKind::from_str(kind).map_err(|_| SettingsError::UnknownKind(kind.to_string()))?;
        self.reset_type = parsed.to_string();
        Ok(())
    }

    /// Day of week (1-7) for weekly cadences, day of month (1-31) otherwise.
    pub fn set_reset_day(&mut self, day: u32) -> Result<(), SettingsError> {
        if day == 0 || day > 31 {
            return Err(SettingsError::DayOutOfRange);
        }
        if self.kind() == ResetKind::Weekly && day > 7 {
            return Err(SettingsError::WeekdayOutOfRange);
        }
        self.reset_day = day as u8;
        Ok(())
    }

    pub fn set_restart_time(&mut self, hour: u32) -> Result<(), SettingsError> {
        if hour > 23 {
            return Err(SettingsError::HourOutOfRange);
        }
        self.restart_time = hour as u8;
        Ok(())
    }

    pub fn set_reset_warning_time(&mut self, minutes: u32) -> Result<(), SettingsError> {
        self.reset_warning_time = minutes;
        Ok(())
    }

    pub fn set_reset_interval(&mut self, seconds: u32) -> Result<(), SettingsError> {
        self.reset_interval = seconds;
        Ok(())
    }

    /// Apply a key/value change from the command surface.
    ///
    /// Returns what the scheduler must do if the change was accepted.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<Applied, SettingsError> {
        match key {
            "world" => {
                self.set_world_name(value)?;
                Ok(Applied::EnsureWorld)
            }
            "type" => {
                self.set_reset_type(value)?;
                Ok(Applied::Rearm)
            }
            "day" => {
                self.set_reset_day(parse_number(value)?)?;
                Ok(Applied::Rearm)
            }
            "hour" => {
                self.set_restart_time(parse_number(value)?)?;
                Ok(Applied::Rearm)
            }
            "warning" => {
                self.set_reset_warning_time(parse_number(value)?)?;
                Ok(Applied::Nothing)
            }
            "interval" => {
                self.set_reset_interval(parse_number(value)?)?;
                Ok(Applied::Rearm)
            }
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }
}

fn parse_number(value: &str) -> Result<u32, SettingsError> {
    value
        .parse::<u32>()
        .map_err(|_| SettingsError::InvalidNumber(value.to_string()))
}

fn validate_world_name(name: &str) -> Result<(), SettingsError> {
    if name.trim().is_empty() {
        return Err(SettingsError::EmptyWorldName);
    }
    // Worlds are single directories under the worlds root.
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(SettingsError::InvalidWorldName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
