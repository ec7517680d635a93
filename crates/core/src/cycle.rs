// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reset cycle state machine
//!
//! A cycle represents one full reset of the resource world: evacuate
//! occupants, optionally hold for a warning period, tear the world down,
//! delete its storage, and rebuild it under the same name. Transitions
//! are pure; all side effects are requested as `Effect`s.

use crate::clock::Clock;
use crate::effect::{Effect, Event, LogLevel};
use crate::world::OccupantId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

/// Message sent to each occupant moved out of the world.
pub const MSG_EVACUATED: &str =
    "You have been teleported to safety - the resource world is being reset.";

/// Broadcast when storage deletion fails mid-cycle.
pub const MSG_RESET_FAILED: &str = "Resource world reset failed! Check server logs for details.";

/// Broadcast when the fresh world cannot be created.
pub const MSG_REBUILD_FAILED: &str = "Failed to recreate the resource world!";

/// Countdown notice broadcast before tear-down begins.
pub fn warning_message(minutes: u32) -> String {
    format!("Resource world will reset in {minutes} minute(s)!")
}

/// Announcement broadcast after a successful rebuild.
pub fn completion_message(duration_ms: u64, tps_before: f64, tps_after: f64) -> String {
    format!("Resource world reset completed in {duration_ms}ms (TPS: {tps_before:.1} -> {tps_after:.1}).")
}

/// Timer id for the warning hold of a given world's cycle.
pub fn teardown_timer_id(world: &str) -> String {
    format!("cycle:teardown:{world}")
}

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetTrigger {
    /// A scheduled fire timer elapsed
    Scheduled,
    /// An operator forced the reset
    Manual,
}

impl ResetTrigger {
    pub fn name(&self) -> &'static str {
        match self {
            ResetTrigger::Scheduled => "scheduled",
            ResetTrigger::Manual => "manual",
        }
    }
}

/// The phase of a reset cycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResetPhase {
    /// Resolving the target world and moving occupants out
    Evacuating,
    /// Countdown broadcast sent; holding until the warning timer fires
    Warned,
    /// Releasing the live world, then deleting its storage
    TearingDown,
    /// Creating the fresh world under the same name
    Rebuilding,
    /// Cycle finished and the world is back
    Completed,
    /// Cycle aborted; the next scheduled fire is unaffected
    Failed { reason: String },
}

impl ResetPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ResetPhase::Evacuating => "evacuating",
            ResetPhase::Warned => "warned",
            ResetPhase::TearingDown => "tearing_down",
            ResetPhase::Rebuilding => "rebuilding",
            ResetPhase::Completed => "completed",
            ResetPhase::Failed { .. } => "failed",
        }
    }
}

/// Events that drive a cycle forward. Gateway feedback is translated
/// into these by the runtime.
#[derive(Clone, Debug)]
pub enum CycleEvent {
    /// Target world found (or created on the spot); storage path and
    /// current occupants reported
    TargetResolved {
        path: PathBuf,
        occupants: Vec<OccupantId>,
    },
    /// Target world absent and could not be created
    TargetUnavailable { reason: String },
    /// Warning hold elapsed
    WarningElapsed,
    /// Live world released
    Released,
    /// Release failed even after the forced retry
    ReleaseFailed { reason: String },
    /// Background storage deletion finished
    StorageDeleted,
    /// Background storage deletion failed
    StorageDeleteFailed { reason: String },
    /// Fresh world created; health sampled after rebuild
    Created { health_after: f64 },
    /// Fresh world could not be created
    CreateFailed { reason: String },
}

/// One reset of the resource world
#[derive(Clone, Debug)]
pub struct ResetCycle {
    pub world: String,
    pub trigger: ResetTrigger,
    pub warning_minutes: u32,
    pub phase: ResetPhase,
    pub started_at: Instant,
    /// Health metric sampled before evacuation
    pub health_before: f64,
    /// Storage path reported at resolution, needed for deletion
    pub storage_path: Option<PathBuf>,
}

impl ResetCycle {
    /// Start a new cycle in the Evacuating phase
    pub fn begin(
        world: impl Into<String>,
        trigger: ResetTrigger,
        warning_minutes: u32,
        health_before: f64,
        clock: &impl Clock,
    ) -> (ResetCycle, Vec<Effect>) {
        let world = world.into();
        let cycle = ResetCycle {
            world: world.clone(),
            trigger,
            warning_minutes,
            phase: ResetPhase::Evacuating,
            started_at: clock.now(),
            health_before,
            storage_path: None,
        };
        let effects = vec![
            Effect::Emit(Event::CycleStarted {
                world: world.clone(),
                trigger,
            }),
            Effect::ResolveTarget { world },
        ];
        (cycle, effects)
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(&self, event: CycleEvent, clock: &impl Clock) -> (ResetCycle, Vec<Effect>) {
        match (&self.phase, event) {
            // Evacuating: target resolved, move everyone out, then warn or tear down
            (ResetPhase::Evacuating, CycleEvent::TargetResolved { path, occupants }) => {
                let mut effects = Vec::new();
                for occupant in occupants {
                    effects.push(Effect::Relocate {
                        world: self.world.clone(),
                        occupant: occupant.clone(),
                    });
                    effects.push(Effect::Notify {
                        occupant,
                        message: MSG_EVACUATED.to_string(),
                    });
                }

                if self.warning_minutes > 0 {
                    let cycle = ResetCycle {
                        phase: ResetPhase::Warned,
                        storage_path: Some(path),
                        ..self.clone()
                    };
                    effects.push(Effect::Broadcast {
                        message: warning_message(self.warning_minutes),
                    });
                    effects.push(Effect::SetTimer {
                        id: teardown_timer_id(&self.world),
                        duration: std::time::Duration::from_secs(
                            u64::from(self.warning_minutes) * 60,
                        ),
                    });
                    effects.push(Effect::Emit(Event::CyclePhase {
                        world: self.world.clone(),
                        phase: ResetPhase::Warned.name().to_string(),
                    }));
                    (cycle, effects)
                } else {
                    let cycle = ResetCycle {
                        phase: ResetPhase::TearingDown,
                        storage_path: Some(path),
                        ..self.clone()
                    };
                    effects.push(Effect::Emit(Event::CyclePhase {
                        world: self.world.clone(),
                        phase: ResetPhase::TearingDown.name().to_string(),
                    }));
                    effects.push(Effect::ReleaseWorld {
                        world: self.world.clone(),
                    });
                    (cycle, effects)
                }
            }

            // Evacuating: target absent and uncreatable
            (ResetPhase::Evacuating, CycleEvent::TargetUnavailable { reason }) => {
                self.fail(reason, None)
            }

            // Warned: hold elapsed, begin tear-down
            (ResetPhase::Warned, CycleEvent::WarningElapsed) => {
                let cycle = ResetCycle {
                    phase: ResetPhase::TearingDown,
                    ..self.clone()
                };
                let effects = vec![
                    Effect::Emit(Event::CyclePhase {
                        world: self.world.clone(),
                        phase: ResetPhase::TearingDown.name().to_string(),
                    }),
                    Effect::ReleaseWorld {
                        world: self.world.clone(),
                    },
                ];
                (cycle, effects)
            }

            // TearingDown: world released, delete its storage off the main path
            (ResetPhase::TearingDown, CycleEvent::Released) => match &self.storage_path {
                Some(path) => {
                    let effects = vec![Effect::DeleteStorage {
                        world: self.world.clone(),
                        path: path.clone(),
                    }];
                    (self.clone(), effects)
                }
                None => self.fail("storage path unknown after release".to_string(), None),
            },

            // TearingDown: release failed even forced, stop before touching storage
            (ResetPhase::TearingDown, CycleEvent::ReleaseFailed { reason }) => {
                self.fail(reason, None)
            }

            // TearingDown: storage gone, rebuild
            (ResetPhase::TearingDown, CycleEvent::StorageDeleted) => {
                let cycle = ResetCycle {
                    phase: ResetPhase::Rebuilding,
                    ..self.clone()
                };
                let effects = vec![
                    Effect::Emit(Event::CyclePhase {
                        world: self.world.clone(),
                        phase: ResetPhase::Rebuilding.name().to_string(),
                    }),
                    Effect::CreateWorld {
                        world: self.world.clone(),
                    },
                ];
                (cycle, effects)
            }

            // TearingDown: deletion failed, no rebuild on a half-deleted world
            (ResetPhase::TearingDown, CycleEvent::StorageDeleteFailed { reason }) => {
                self.fail(reason, Some(MSG_RESET_FAILED))
            }

            // Rebuilding: fresh world up, announce
            (ResetPhase::Rebuilding, CycleEvent::Created { health_after }) => {
                let elapsed = clock.now().duration_since(self.started_at);
                let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                let cycle = ResetCycle {
                    phase: ResetPhase::Completed,
                    ..self.clone()
                };
                let effects = vec![
                    Effect::Emit(Event::CycleCompleted {
                        world: self.world.clone(),
                        duration_ms,
                        tps_before: self.health_before,
                        tps_after: health_after,
                    }),
                    Effect::Broadcast {
                        message: completion_message(duration_ms, self.health_before, health_after),
                    },
                ];
                (cycle, effects)
            }

            // Rebuilding: create failed
            (ResetPhase::Rebuilding, CycleEvent::CreateFailed { reason }) => {
                self.fail(reason, Some(MSG_REBUILD_FAILED))
            }

            // Invalid transitions - no change
            _ => (self.clone(), vec![]),
        }
    }

    fn fail(&self, reason: String, broadcast: Option<&str>) -> (ResetCycle, Vec<Effect>) {
        let cycle = ResetCycle {
            phase: ResetPhase::Failed {
                reason: reason.clone(),
            },
            ..self.clone()
        };
        let mut effects = vec![
            Effect::Emit(Event::CycleFailed {
                world: self.world.clone(),
                phase: self.phase.name().to_string(),
                reason: reason.clone(),
            }),
            Effect::Log {
                level: LogLevel::Error,
                message: format!("reset of '{}' failed: {reason}", self.world),
            },
        ];
        if let Some(message) = broadcast {
            effects.push(Effect::Broadcast {
                message: message.to_string(),
            });
        }
        (cycle, effects)
    }

    /// Check if the cycle is terminal (completed or failed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.phase,
            ResetPhase::Completed | ResetPhase::Failed { .. }
        )
    }

    /// Check if the cycle is holding for its warning timer
    pub fn is_warned(&self) -> bool {
        matches!(self.phase, ResetPhase::Warned)
    }
}

#[cfg(test)]
#[path = "cycle_tests.rs"]
mod tests;
