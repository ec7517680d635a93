// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fallowd library surface
//!
//! The wire protocol and lifecycle paths are exported so the CLI can
//! talk to (and spawn) the daemon without duplicating either.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod lifecycle;
pub mod protocol;
pub mod server;
pub mod settings;

/// Startup marker prefix written to the log before anything else.
/// The CLI uses it to find where the current startup attempt begins.
/// Full format: "--- fallowd: starting (pid: 12345)"
pub const STARTUP_MARKER_PREFIX: &str = "--- fallowd: starting (pid: ";
