// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Reset engine: timer scheduler, effect executor, and the runtime
//! that drives reset cycles from events.

mod error;
mod executor;
mod runtime;
mod scheduler;

pub use error::RuntimeError;
pub use executor::{ExecuteError, Executor};
pub use runtime::{Runtime, RuntimeDeps, ScheduleSummary, RESET_TIMER_ID};
pub use scheduler::Scheduler;
