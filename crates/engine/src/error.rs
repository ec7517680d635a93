// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime error types

use thiserror::Error;

/// Errors from runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("a reset cycle is already in progress")]
    CycleInProgress,
    #[error("execute error: {0}")]
    Execute(#[from] crate::ExecuteError),
    #[error("world error: {0}")]
    World(#[from] fallow_adapters::WorldError),
}
