// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor
//!
//! Interprets the effects requested by the cycle state machine against
//! the world gateway and broadcast channel. Announcement effects are
//! best effort; gateway effects report their outcome as feedback
//! events so the runtime can advance the cycle.

use crate::Scheduler;
use fallow_adapters::{Broadcaster, WorldAdapter};
use fallow_core::{Clock, Effect, Event, LogLevel};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("world error: {0}")]
    World(#[from] fallow_adapters::WorldError),
    #[error("notify error: {0}")]
    Notify(#[from] fallow_adapters::NotifyError),
}

/// Executes effects using the configured adapters
pub struct Executor<W, B, C> {
    worlds: W,
    notify: B,
    scheduler: Arc<Mutex<Scheduler>>,
    /// Channel for events produced off the main path (background deletes)
    feedback: mpsc::Sender<Event>,
    clock: C,
}

impl<W, B, C> Executor<W, B, C>
where
    W: WorldAdapter,
    B: Broadcaster,
    C: Clock,
{
    pub fn new(
        worlds: W,
        notify: B,
        scheduler: Arc<Mutex<Scheduler>>,
        feedback: mpsc::Sender<Event>,
        clock: C,
    ) -> Self {
        Self {
            worlds,
            notify,
            scheduler,
            feedback,
            clock,
        }
    }

    /// Execute a single effect with tracing
    ///
    /// Returns an optional event that should be fed back into the event loop.
    pub async fn execute(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        use fallow_core::TracedEffect;

        let op_name = effect.name();
        let span = tracing::info_span!("effect", effect = op_name);
        let _guard = span.enter();

        tracing::debug!(fields = ?effect.fields(), "executing");

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(event) => tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                has_event = event.is_some(),
                "completed"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "failed"
            ),
        }

        result
    }

    /// Execute a batch of effects, collecting the feedback events.
    pub async fn execute_all(&self, effects: Vec<Effect>) -> Result<Vec<Event>, ExecuteError> {
        let mut events = Vec::new();
        for effect in effects {
            if let Some(event) = self.execute(effect).await? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Inner execution logic for a single effect
    async fn execute_inner(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        match effect {
            Effect::Emit(event) => {
                // Fed back to the event loop for observers; lifecycle
                // events carry no transition of their own.
                tracing::info!(event = event.name(), "event");
                Ok(Some(event))
            }

            Effect::Broadcast { message } => {
                // Announcements never block a cycle.
                if let Err(e) = self.notify.broadcast(&message).await {
                    tracing::warn!(error = %e, "broadcast failed");
                }
                Ok(None)
            }

            Effect::Notify { occupant, message } => {
                if let Err(e) = self.notify.notify(&occupant, &message).await {
                    tracing::warn!(occupant = %occupant, error = %e, "notify failed");
                }
                Ok(None)
            }

            Effect::Relocate { world, occupant } => {
                // A stuck occupant is logged, not fatal: the world is
                // torn down underneath them either way.
                if let Err(e) = self.worlds.relocate(&occupant, &world).await {
                    tracing::warn!(occupant = %occupant, error = %e, "relocate failed");
                }
                Ok(None)
            }

            Effect::ResolveTarget { world } => match self.resolve_target(&world).await {
                Ok(event) => Ok(Some(event)),
                Err(e) => Ok(Some(Event::TargetUnavailable {
                    world,
                    reason: e.to_string(),
                })),
            },

            Effect::EnsureWorld { world } => {
                if self.worlds.find(&world).await?.is_some() {
                    return Ok(None);
                }
                self.worlds.create(&world).await?;
                Ok(Some(Event::WorldCreated { world }))
            }

            Effect::ReleaseWorld { world } => {
                if let Err(first) = self.worlds.release(&world, false).await {
                    tracing::warn!(world, error = %first, "release failed, retrying forced");
                    if let Err(second) = self.worlds.release(&world, true).await {
                        return Ok(Some(Event::WorldReleaseFailed {
                            world,
                            reason: second.to_string(),
                        }));
                    }
                }
                Ok(Some(Event::WorldReleased { world }))
            }

            Effect::DeleteStorage { world, path } => {
                // Deletion can be slow on large worlds; run it off the
                // event loop and report back through the feedback channel.
                let worlds = self.worlds.clone();
                let feedback = self.feedback.clone();
                tokio::spawn(async move {
                    let event = match worlds.delete_storage(&path).await {
                        Ok(()) => Event::StorageDeleted { world },
                        Err(e) => Event::StorageDeleteFailed {
                            world,
                            reason: e.to_string(),
                        },
                    };
                    if feedback.send(event).await.is_err() {
                        tracing::warn!("event loop gone, dropping storage deletion result");
                    }
                });
                Ok(None)
            }

            Effect::CreateWorld { world } => match self.worlds.create(&world).await {
                Ok(_) => Ok(Some(Event::WorldCreated { world })),
                Err(e) => Ok(Some(Event::WorldCreateFailed {
                    world,
                    reason: e.to_string(),
                })),
            },

            Effect::SetTimer { id, duration } => {
                let mut scheduler = self.scheduler.lock().unwrap_or_else(|e| e.into_inner());
                scheduler.set_timer(id, duration, self.clock.now());
                Ok(None)
            }

            Effect::SetRepeatingTimer { id, period } => {
                let mut scheduler = self.scheduler.lock().unwrap_or_else(|e| e.into_inner());
                scheduler.set_repeating(id, period, self.clock.now());
                Ok(None)
            }

            Effect::CancelTimer { id } => {
                let mut scheduler = self.scheduler.lock().unwrap_or_else(|e| e.into_inner());
                scheduler.cancel_timer(&id);
                Ok(None)
            }

            Effect::Log { level, message } => {
                match level {
                    LogLevel::Debug => tracing::debug!("{message}"),
                    LogLevel::Info => tracing::info!("{message}"),
                    LogLevel::Warn => tracing::warn!("{message}"),
                    LogLevel::Error => tracing::error!("{message}"),
                }
                Ok(None)
            }
        }
    }

    /// Find the target world, creating it once if it is absent.
    async fn resolve_target(&self, world: &str) -> Result<Event, ExecuteError> {
        let info = match self.worlds.find(world).await? {
            Some(info) => info,
            None => {
                tracing::info!(world, "target world absent, creating");
                self.worlds.create(world).await?
            }
        };
        let occupants = self.worlds.occupants(world).await?;
        Ok(Event::TargetResolved {
            world: world.to_string(),
            path: info.path,
            occupants,
        })
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
