// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for state machine orchestration

use crate::cycle::ResetTrigger;
use crate::traced::TracedEffect;
use crate::world::OccupantId;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::time::Duration;

/// Effects are side effects that state machines request
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Emit an event for observability
    Emit(Event),
    /// Broadcast a message to all connected observers
    Broadcast { message: String },
    /// Notify a single occupant
    Notify {
        occupant: OccupantId,
        message: String,
    },
    /// Relocate an occupant out of a world to the fallback entry point
    Relocate {
        world: String,
        occupant: OccupantId,
    },
    /// Resolve the target world: find it, create it once if absent,
    /// and report its storage path and occupants
    ResolveTarget { world: String },
    /// Idempotent create-if-absent check
    EnsureWorld { world: String },
    /// Release the live world (forced retry handled by the executor)
    ReleaseWorld { world: String },
    /// Delete the world's on-disk representation on a background task
    DeleteStorage { world: String, path: PathBuf },
    /// Create a fresh world with default generation parameters
    CreateWorld { world: String },
    /// Set a one-shot timer
    SetTimer { id: String, duration: Duration },
    /// Set a repeating timer (interval sub-mode)
    SetRepeatingTimer { id: String, period: Duration },
    /// Cancel a timer
    CancelTimer { id: String },
    /// Log a message
    Log { level: LogLevel, message: String },
}

impl TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Emit(_) => "emit",
            Effect::Broadcast { .. } => "broadcast",
            Effect::Notify { .. } => "notify",
            Effect::Relocate { .. } => "relocate",
            Effect::ResolveTarget { .. } => "resolve_target",
            Effect::EnsureWorld { .. } => "ensure_world",
            Effect::ReleaseWorld { .. } => "release_world",
            Effect::DeleteStorage { .. } => "delete_storage",
            Effect::CreateWorld { .. } => "create_world",
            Effect::SetTimer { .. } => "set_timer",
            Effect::SetRepeatingTimer { .. } => "set_repeating_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::Log { .. } => "log",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit(event) => vec![("event", event.name().to_string())],
            Effect::Broadcast { message } => vec![("message", message.clone())],
            Effect::Notify { occupant, .. } => vec![("occupant", occupant.to_string())],
            Effect::Relocate { world, occupant } => vec![
                ("world", world.clone()),
                ("occupant", occupant.to_string()),
            ],
            Effect::ResolveTarget { world }
            | Effect::EnsureWorld { world }
            | Effect::ReleaseWorld { world }
            | Effect::CreateWorld { world } => vec![("world", world.clone())],
            Effect::DeleteStorage { world, path } => vec![
                ("world", world.clone()),
                ("path", path.display().to_string()),
            ],
            Effect::SetTimer { id, duration } => vec![
                ("id", id.clone()),
                ("duration_secs", duration.as_secs().to_string()),
            ],
            Effect::SetRepeatingTimer { id, period } => vec![
                ("id", id.clone()),
                ("period_secs", period.as_secs().to_string()),
            ],
            Effect::CancelTimer { id } => vec![("id", id.clone())],
            Effect::Log { message, .. } => vec![("message", message.clone())],
        }
    }
}

/// Events emitted by state machines and effect execution
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    // Timer events
    TimerFired {
        id: String,
    },

    // Cycle events
    CycleStarted {
        world: String,
        trigger: ResetTrigger,
    },
    CyclePhase {
        world: String,
        phase: String,
    },
    CycleCompleted {
        world: String,
        duration_ms: u64,
        tps_before: f64,
        tps_after: f64,
    },
    CycleFailed {
        world: String,
        phase: String,
        reason: String,
    },

    // Gateway feedback from effect execution
    TargetResolved {
        world: String,
        path: PathBuf,
        occupants: Vec<OccupantId>,
    },
    TargetUnavailable {
        world: String,
        reason: String,
    },
    WorldReleased {
        world: String,
    },
    WorldReleaseFailed {
        world: String,
        reason: String,
    },
    StorageDeleted {
        world: String,
    },
    StorageDeleteFailed {
        world: String,
        reason: String,
    },
    WorldCreated {
        world: String,
    },
    WorldCreateFailed {
        world: String,
        reason: String,
    },

    // Schedule events
    ScheduleArmed {
        world: String,
        next_fire: NaiveDateTime,
        repeating: bool,
    },
}

impl Event {
    /// Get the event name for pattern matching
    /// Format: "category:action"
    pub fn name(&self) -> &'static str {
        match self {
            Event::TimerFired { .. } => "timer:fired",
            Event::CycleStarted { .. } => "cycle:started",
            Event::CyclePhase { .. } => "cycle:phase",
            Event::CycleCompleted { .. } => "cycle:completed",
            Event::CycleFailed { .. } => "cycle:failed",
            Event::TargetResolved { .. } => "world:resolved",
            Event::TargetUnavailable { .. } => "world:unavailable",
            Event::WorldReleased { .. } => "world:released",
            Event::WorldReleaseFailed { .. } => "world:release_failed",
            Event::StorageDeleted { .. } => "world:storage_deleted",
            Event::StorageDeleteFailed { .. } => "world:storage_delete_failed",
            Event::WorldCreated { .. } => "world:created",
            Event::WorldCreateFailed { .. } => "world:create_failed",
            Event::ScheduleArmed { .. } => "schedule:armed",
        }
    }
}

/// Log levels for effect-based logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
