// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, the event pump.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use fallow_adapters::{HostBroadcaster, HostHealthProbe, HostWorldAdapter};
use fallow_core::{Event, Settings, SystemClock};
use fallow_engine::{Runtime, RuntimeDeps, Scheduler};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::settings::{load_settings, SettingsFileError};

/// Daemon runtime with concrete adapter types
pub type DaemonRuntime = Runtime<HostWorldAdapter, HostBroadcaster, HostHealthProbe, SystemClock>;

/// World occupants are evacuated into during a reset.
pub const FALLBACK_WORLD: &str = "world";

/// Upper bound on waiting for an in-flight tear-down to finish at shutdown.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// State directory holding everything below
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the persisted settings file
    pub settings_path: PathBuf,
    /// Directory holding the worlds
    pub worlds_path: PathBuf,
    /// Announcement log the host fans out to occupants
    pub messages_path: PathBuf,
    /// Stats file the host publishes its tick rate to
    pub stats_path: PathBuf,
}

impl Config {
    /// Resolve all paths from an optional state directory override.
    pub fn resolve(state_dir: Option<PathBuf>) -> Result<Self, LifecycleError> {
        let state_dir = match state_dir {
            Some(dir) => dir,
            None => default_state_dir()?,
        };

        let hash = state_hash(&state_dir);
        let socket_dir = socket_dir();

        Ok(Self {
            socket_path: socket_dir.join(format!("{}.sock", hash)),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            settings_path: state_dir.join("settings.toml"),
            worlds_path: state_dir.join("worlds"),
            messages_path: state_dir.join("messages.log"),
            stats_path: state_dir.join("tps"),
            state_dir,
        })
    }
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Live settings (shared with the runtime)
    pub settings: Arc<Mutex<Settings>>,
    /// Runtime for event processing
    pub runtime: DaemonRuntime,
    /// Scheduler for timers (shared with runtime)
    pub scheduler: Arc<Mutex<Scheduler>>,
    /// Channel for internal events (background storage deletion)
    pub internal_events: mpsc::Receiver<Event>,
    /// When daemon started
    pub start_time: Instant,
    /// Shutdown requested flag
    pub shutdown_requested: bool,
}

impl DaemonState {
    /// Process an event through the runtime
    ///
    /// Any events produced by the runtime are fed back into the event
    /// loop iteratively until the queue drains.
    pub async fn process_event(&mut self, event: Event) -> Result<(), LifecycleError> {
        let mut pending_events = vec![event];

        while let Some(event) = pending_events.pop() {
            let result_events = self
                .runtime
                .handle_event(event)
                .await
                .map_err(|e| LifecycleError::Runtime(e.to_string()))?;

            // Queue any produced events to be processed next
            pending_events.extend(result_events);
        }

        Ok(())
    }

    /// Fire any timers whose deadline has passed
    pub async fn check_timers(&mut self) -> Result<(), LifecycleError> {
        let now = std::time::Instant::now();
        let timer_events = {
            let mut scheduler = self.scheduler.lock().unwrap_or_else(|e| e.into_inner());
            scheduler.fired_timers(now)
        };
        for event in timer_events {
            self.process_event(event).await?;
        }
        Ok(())
    }

    /// A cycle past the point of no return must finish its rebuild
    /// before the process exits; stopping mid-teardown would leave the
    /// world deleted without a replacement. Cycles still evacuating or
    /// holding for their warning are simply abandoned.
    async fn finish_teardown(&mut self) {
        let deadline = Instant::now() + SHUTDOWN_DRAIN_TIMEOUT;
        while matches!(
            self.runtime.active_phase().as_deref(),
            Some("tearing_down" | "rebuilding")
        ) {
            let now = Instant::now();
            if now >= deadline {
                warn!("gave up waiting for the in-flight cycle to finish");
                break;
            }
            match tokio::time::timeout(deadline - now, self.internal_events.recv()).await {
                Ok(Some(event)) => {
                    if let Err(e) = self.process_event(event).await {
                        warn!(error = %e, "error finishing cycle during shutdown");
                        break;
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("gave up waiting for the in-flight cycle to finish");
                    break;
                }
            }
        }
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        self.finish_teardown().await;
        self.runtime.stop();

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        if self.config.version_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.version_path) {
                warn!("Failed to remove version file: {}", e);
            }
        }

        // Lock file is released automatically when self.lock_file is dropped

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsFileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create directories (needed for socket, lock, etc.)
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(&config.worlds_path)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 2. Acquire lock file FIRST - prevents races
    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Reborrow as immutable

    // 3. Write version file
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 4. Load settings BEFORE binding socket (fail fast on a corrupt file)
    let settings = load_settings(&config.settings_path)?;
    info!(
        world = %settings.world_name,
        cadence = %settings.policy().describe(),
        "loaded settings"
    );

    // 5. Set up adapters
    let worlds = HostWorldAdapter::new(config.worlds_path.clone(), FALLBACK_WORLD);
    let notify = HostBroadcaster::new(config.messages_path.clone());
    let health = HostHealthProbe::new(config.stats_path.clone());

    // 6. Set up internal event channel
    let (internal_tx, internal_events) = mpsc::channel(100);

    // 7. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    // 8. Create runtime
    let settings = Arc::new(Mutex::new(settings));
    let runtime = Runtime::new(
        RuntimeDeps {
            worlds,
            notify,
            health,
            feedback: internal_tx,
        },
        Arc::clone(&settings),
        SystemClock,
    );
    let scheduler = runtime.scheduler();

    let mut state = DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        settings,
        runtime,
        scheduler,
        internal_events,
        start_time: Instant::now(),
        shutdown_requested: false,
    };

    // 9. Arm the schedule and make sure the target world exists
    let events = state
        .runtime
        .start()
        .await
        .map_err(|e| LifecycleError::Runtime(e.to_string()))?;
    for event in events {
        state.process_event(event).await?;
    }
    match state.runtime.ensure_world().await {
        Ok(true) => info!("created missing target world"),
        Ok(false) => {}
        // Not fatal: the next cycle resolves the world again.
        Err(e) => warn!(error = %e, "could not ensure target world"),
    }

    info!("Daemon started, state dir: {}", config.state_dir.display());
    Ok(state)
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }

    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Get the state directory for fallow
fn default_state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("FALLOW_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("fallow"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/fallow"))
}

/// Get the socket directory for fallow
///
/// Uses /tmp/fallow by default to keep paths short (macOS SUN_LEN = 104).
/// Can be overridden with FALLOW_SOCKET_DIR for testing.
fn socket_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FALLOW_SOCKET_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("/tmp/fallow")
}

/// Hash the state directory for a unique, short socket name.
///
/// SHA-256 so the CLI and the daemon agree on the name regardless of
/// which toolchain built them.
fn state_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let result = hasher.finalize();
    // Take first 16 chars of hex digest
    hex_encode(&result[..8])
}

// Hex encoding helper
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
