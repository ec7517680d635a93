// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reset runtime
//!
//! Owns the active cycle, the schedule, and the effect executor. The
//! daemon's event loop feeds events in through [`Runtime::handle_event`]
//! and forwards whatever events come back until the queue drains.

use crate::{Executor, RuntimeError, Scheduler};
use chrono::NaiveDateTime;
use fallow_adapters::{Broadcaster, HealthProbe, WorldAdapter};
use fallow_core::{
    teardown_timer_id, Clock, CycleEvent, Effect, Event, ResetCycle, ResetTrigger, Settings,
    DEFAULT_TICK_RATE,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Timer id of the scheduled reset fire.
pub const RESET_TIMER_ID: &str = "schedule:reset";

/// Adapters the runtime is built from
pub struct RuntimeDeps<W, B, H> {
    pub worlds: W,
    pub notify: B,
    pub health: H,
    /// Receives events produced off the main path (background deletes)
    pub feedback: mpsc::Sender<Event>,
}

/// Snapshot of the armed schedule for status output
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSummary {
    pub cadence: String,
    pub next_fire: Option<NaiveDateTime>,
    pub repeating: bool,
}

/// Drives reset cycles from events
pub struct Runtime<W, B, H, C: Clock> {
    executor: Executor<W, B, C>,
    health: H,
    clock: C,
    settings: Arc<Mutex<Settings>>,
    scheduler: Arc<Mutex<Scheduler>>,
    /// The in-flight cycle. Locked briefly, never across an await.
    active: Mutex<Option<ResetCycle>>,
    /// Armed next-fire instant, kept for status output.
    next_fire: Mutex<Option<(NaiveDateTime, bool)>>,
}

impl<W, B, H, C> Runtime<W, B, H, C>
where
    W: WorldAdapter,
    B: Broadcaster,
    H: HealthProbe,
    C: Clock,
{
    pub fn new(deps: RuntimeDeps<W, B, H>, settings: Arc<Mutex<Settings>>, clock: C) -> Self {
        let scheduler = Arc::new(Mutex::new(Scheduler::new()));
        let executor = Executor::new(
            deps.worlds,
            deps.notify,
            scheduler.clone(),
            deps.feedback,
            clock.clone(),
        );
        Self {
            executor,
            health: deps.health,
            clock,
            settings,
            scheduler,
            active: Mutex::new(None),
            next_fire: Mutex::new(None),
        }
    }

    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        self.scheduler.clone()
    }

    /// Arm the reset timer from the current settings.
    ///
    /// Replaces any pending reset timer; the warning-hold timer of an
    /// in-flight cycle is left alone.
    pub async fn start(&self) -> Result<Vec<Event>, RuntimeError> {
        let (world, policy) = {
            let settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            (settings.world_name.clone(), settings.policy())
        };

        let mut effects = vec![Effect::CancelTimer {
            id: RESET_TIMER_ID.to_string(),
        }];
        let now = self.clock.wall_now();
        let next_fire = policy.next_fire(now);
        let repeating = match policy.interval_period() {
            Some(period) => {
                effects.push(Effect::SetRepeatingTimer {
                    id: RESET_TIMER_ID.to_string(),
                    period,
                });
                true
            }
            None => {
                let until = (next_fire - now)
                    .to_std()
                    .unwrap_or(std::time::Duration::ZERO);
                effects.push(Effect::SetTimer {
                    id: RESET_TIMER_ID.to_string(),
                    duration: until,
                });
                false
            }
        };
        effects.push(Effect::Emit(Event::ScheduleArmed {
            world,
            next_fire,
            repeating,
        }));

        *self.next_fire.lock().unwrap_or_else(|e| e.into_inner()) = Some((next_fire, repeating));
        tracing::info!(cadence = %policy.describe(), %next_fire, repeating, "schedule armed");
        Ok(self.executor.execute_all(effects).await?)
    }

    /// Cancel every pending timer, including an in-flight warning hold.
    pub fn stop(&self) {
        self.scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel_all();
        *self.next_fire.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Force a reset now, outside the schedule.
    pub async fn trigger_now(&self) -> Result<Vec<Event>, RuntimeError> {
        if self.is_busy() {
            return Err(RuntimeError::CycleInProgress);
        }
        self.begin_cycle(ResetTrigger::Manual).await
    }

    /// Make sure the configured world exists; returns true if it was created.
    pub async fn ensure_world(&self) -> Result<bool, RuntimeError> {
        let world = {
            let settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            settings.world_name.clone()
        };
        let event = self.executor.execute(Effect::EnsureWorld { world }).await?;
        Ok(event.is_some())
    }

    pub fn schedule_summary(&self) -> ScheduleSummary {
        let policy = {
            let settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            settings.policy()
        };
        let armed = *self.next_fire.lock().unwrap_or_else(|e| e.into_inner());
        ScheduleSummary {
            cadence: policy.describe(),
            next_fire: armed.map(|(at, _)| at),
            repeating: armed.is_some_and(|(_, repeating)| repeating),
        }
    }

    /// Phase name of the in-flight cycle, if any.
    pub fn active_phase(&self) -> Option<String> {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|c| !c.is_terminal())
            .map(|c| c.phase.name().to_string())
    }

    /// Process one event, returning follow-up events for the loop to
    /// feed back in.
    pub async fn handle_event(&self, event: Event) -> Result<Vec<Event>, RuntimeError> {
        match event {
            Event::TimerFired { ref id } if id == RESET_TIMER_ID => self.on_reset_fire().await,

            Event::TimerFired { ref id } => {
                let matches_hold = self
                    .active
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .as_ref()
                    .is_some_and(|c| c.is_warned() && *id == teardown_timer_id(&c.world));
                if matches_hold {
                    self.advance(CycleEvent::WarningElapsed).await
                } else {
                    tracing::debug!(id, "ignoring unknown timer");
                    Ok(vec![])
                }
            }

            Event::TargetResolved {
                world,
                path,
                occupants,
            } => {
                self.advance_if_active(&world, CycleEvent::TargetResolved { path, occupants })
                    .await
            }
            Event::TargetUnavailable { world, reason } => {
                self.advance_if_active(&world, CycleEvent::TargetUnavailable { reason })
                    .await
            }
            Event::WorldReleased { world } => {
                self.advance_if_active(&world, CycleEvent::Released).await
            }
            Event::WorldReleaseFailed { world, reason } => {
                self.advance_if_active(&world, CycleEvent::ReleaseFailed { reason })
                    .await
            }
            Event::StorageDeleted { world } => {
                self.advance_if_active(&world, CycleEvent::StorageDeleted)
                    .await
            }
            Event::StorageDeleteFailed { world, reason } => {
                self.advance_if_active(&world, CycleEvent::StorageDeleteFailed { reason })
                    .await
            }
            Event::WorldCreated { world } => {
                let rebuilding = self
                    .active
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .as_ref()
                    .is_some_and(|c| c.world == world && !c.is_terminal());
                if rebuilding {
                    // Sample health after the rebuild for the announcement.
                    let health_after = self.sample_health().await;
                    self.advance(CycleEvent::Created { health_after }).await
                } else {
                    // EnsureWorld outside a cycle.
                    Ok(vec![])
                }
            }
            Event::WorldCreateFailed { world, reason } => {
                self.advance_if_active(&world, CycleEvent::CreateFailed { reason })
                    .await
            }

            // Informational events carry no transition.
            _ => Ok(vec![]),
        }
    }

    async fn on_reset_fire(&self) -> Result<Vec<Event>, RuntimeError> {
        if self.is_busy() {
            // Containment: never stack cycles. A one-shot schedule is
            // rearmed so the skip does not kill future resets.
            tracing::warn!("scheduled reset skipped, cycle already in progress");
            let repeating = self
                .next_fire
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .is_some_and(|(_, repeating)| repeating);
            if repeating {
                return Ok(vec![]);
            }
            return self.start().await;
        }
        self.begin_cycle(ResetTrigger::Scheduled).await
    }

    async fn begin_cycle(&self, trigger: ResetTrigger) -> Result<Vec<Event>, RuntimeError> {
        let (world, warning_minutes) = {
            let settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            (settings.world_name.clone(), settings.warning_minutes())
        };
        let health_before = self.sample_health().await;
        let (cycle, effects) =
            ResetCycle::begin(world, trigger, warning_minutes, health_before, &self.clock);
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = Some(cycle);
        Ok(self.executor.execute_all(effects).await?)
    }

    async fn advance_if_active(
        &self,
        world: &str,
        event: CycleEvent,
    ) -> Result<Vec<Event>, RuntimeError> {
        let is_active = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|c| c.world == world && !c.is_terminal());
        if !is_active {
            tracing::debug!(world, "gateway feedback without a matching cycle");
            return Ok(vec![]);
        }
        self.advance(event).await
    }

    async fn advance(&self, event: CycleEvent) -> Result<Vec<Event>, RuntimeError> {
        let Some(cycle) = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        else {
            return Ok(vec![]);
        };

        let scheduled = cycle.trigger == ResetTrigger::Scheduled;
        let (next, effects) = cycle.transition(event, &self.clock);
        let terminal = next.is_terminal();
        if !terminal {
            *self.active.lock().unwrap_or_else(|e| e.into_inner()) = Some(next);
        }

        let mut events = self.executor.execute_all(effects).await?;

        // A consumed scheduled fire is rearmed once the cycle ends; in
        // interval sub-mode the repeating timer is still pending, and a
        // manual trigger never consumed the timer at all.
        if terminal && scheduled {
            let repeating = self
                .next_fire
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .is_some_and(|(_, repeating)| repeating);
            if !repeating {
                events.extend(self.start().await?);
            }
        }
        Ok(events)
    }

    fn is_busy(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|c| !c.is_terminal())
    }

    async fn sample_health(&self) -> f64 {
        match self.health.sample().await {
            Ok(tps) => tps,
            Err(e) => {
                tracing::debug!(error = %e, "health probe unavailable, using nominal rate");
                DEFAULT_TICK_RATE
            }
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
