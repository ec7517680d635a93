// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fallow-core: Core library for the fallow resource-world resetter
//!
//! This crate provides:
//! - The reset cadence policy and its pure next-fire evaluator
//! - The reset-cycle state machine (evacuate, warn, tear down, rebuild)
//! - Effect-based orchestration vocabulary consumed by the engine
//! - Validated daemon settings with the documented defaults

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod cycle;
pub mod effect;
pub mod policy;
pub mod settings;
pub mod traced;
pub mod world;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use cycle::{
    completion_message, teardown_timer_id, warning_message, CycleEvent, ResetCycle, ResetPhase,
    ResetTrigger,
};
pub use effect::{Effect, Event, LogLevel};
pub use policy::{ResetKind, ResetPolicy, SECS_PER_DAY};
pub use settings::{Applied, Settings, SettingsError};
pub use traced::TracedEffect;
pub use world::{OccupantId, WorldInfo};

/// Neutral health-metric baseline substituted when the host probe fails.
pub const DEFAULT_TICK_RATE: f64 = 20.0;
