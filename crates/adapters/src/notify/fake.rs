// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{Broadcaster, NotifyError};
use async_trait::async_trait;
use fallow_core::OccupantId;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    broadcasts: Vec<String>,
    notified: Vec<(OccupantId, String)>,
    fail: bool,
}

/// Records announcements instead of delivering them
#[derive(Clone, Default)]
pub struct FakeBroadcaster {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_fail(&self, fail: bool) {
        self.lock().fail = fail;
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.lock().broadcasts.clone()
    }

    pub fn notified(&self) -> Vec<(OccupantId, String)> {
        self.lock().notified.clone()
    }
}

#[async_trait]
impl Broadcaster for FakeBroadcaster {
    async fn broadcast(&self, message: &str) -> Result<(), NotifyError> {
        let mut inner = self.lock();
        if inner.fail {
            return Err(NotifyError::Io(std::io::Error::other("broadcast failed")));
        }
        inner.broadcasts.push(message.to_string());
        Ok(())
    }

    async fn notify(&self, occupant: &OccupantId, message: &str) -> Result<(), NotifyError> {
        let mut inner = self.lock();
        if inner.fail {
            return Err(NotifyError::Io(std::io::Error::other("notify failed")));
        }
        inner.notified.push((occupant.clone(), message.to_string()));
        Ok(())
    }
}
