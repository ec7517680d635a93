// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the host capabilities the reset engine depends on:
//! the world gateway, the broadcast channel, and the health probe.

pub mod health;
pub mod notify;
pub mod world;

pub use health::{HealthError, HealthProbe, HostHealthProbe};
pub use notify::{Broadcaster, HostBroadcaster, NotifyError};
pub use world::{HostWorldAdapter, WorldAdapter, WorldError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use health::FakeHealthProbe;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeBroadcaster;
#[cfg(any(test, feature = "test-support"))]
pub use world::{FakeWorldAdapter, WorldCall};
