// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{HealthError, HealthProbe};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Probe returning a scripted tick rate, or an error when unset
#[derive(Clone, Default)]
pub struct FakeHealthProbe {
    tick_rate: Arc<Mutex<Option<f64>>>,
}

impl FakeHealthProbe {
    pub fn new(tick_rate: f64) -> Self {
        Self {
            tick_rate: Arc::new(Mutex::new(Some(tick_rate))),
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, tick_rate: f64) {
        *self.tick_rate.lock().unwrap_or_else(|e| e.into_inner()) = Some(tick_rate);
    }
}

#[async_trait]
impl HealthProbe for FakeHealthProbe {
    async fn sample(&self) -> Result<f64, HealthError> {
        self.tick_rate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .ok_or_else(|| HealthError::Unavailable("no sample scripted".to_string()))
    }
}
