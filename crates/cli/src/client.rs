// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use fallow_core::Settings;
use fallow_daemon::lifecycle::Config;
use fallow_daemon::protocol::{self, ProtocolError, Request, Response};
use fallow_daemon::STARTUP_MARKER_PREFIX;
use thiserror::Error;
use tokio::net::UnixStream;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("FALLOW_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("FALLOW_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("FALLOW_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("FALLOW_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("A reset cycle is already in progress")]
    Busy,

    #[error("You do not have permission to use this command.")]
    Unauthorized,

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon status fields for display
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub world: String,
    pub cadence: String,
    pub next_fire: Option<String>,
    pub active_phase: Option<String>,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
    token: Option<String>,
}

impl DaemonClient {
    /// Connect to daemon, auto-starting if not running
    pub async fn connect_or_start(
        config: &Config,
        token: Option<String>,
    ) -> Result<Self, ClientError> {
        // Check version file before connecting - restart daemon on mismatch
        if let Ok(daemon_version) = std::fs::read_to_string(&config.version_path) {
            let cli_version = env!("CARGO_PKG_VERSION");
            if daemon_version.trim() != cli_version {
                let _ = daemon_stop(config).await;
            }
        }

        match Self::connect(config, token.clone()) {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                // Start daemon in background
                let child = start_daemon_background(config)?;
                // Wait for socket with retry, watching for early exit
                Self::connect_with_retry(config, token, timeout_connect(), child)
            }
            Err(e) => Err(wrap_with_startup_error(e, config)),
        }
    }

    /// Connect to existing daemon (no auto-start)
    pub fn connect(config: &Config, token: Option<String>) -> Result<Self, ClientError> {
        if !config.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }

        Ok(Self {
            socket_path: config.socket_path.clone(),
            token,
        })
    }

    fn connect_with_retry(
        config: &Config,
        token: Option<String>,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // Check if daemon process exited early (startup failure)
            if let Ok(Some(status)) = child.try_wait() {
                // Process exited - poll for the startup error in the log
                // (filesystem may need to sync)
                let poll_start = Instant::now();
                while poll_start.elapsed() < timeout_exit() {
                    if let Some(err) = read_startup_error(config) {
                        return Err(ClientError::DaemonStartFailed(err));
                    }
                    std::thread::sleep(poll_interval());
                }
                return Err(ClientError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            match Self::connect(config, token.clone()) {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    std::thread::sleep(poll_interval());
                }
                Err(e) => return Err(wrap_with_startup_error(e, config)),
            }
        }

        // Timeout - check log for startup errors
        Err(wrap_with_startup_error(
            ClientError::DaemonStartTimeout,
            config,
        ))
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        protocol::write_request(&mut writer, &request, timeout_ipc()).await?;
        let response = protocol::read_response(&mut reader, timeout_ipc()).await?;

        match response {
            Response::Unauthorized => Err(ClientError::Unauthorized),
            Response::Busy => Err(ClientError::Busy),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Ok(other),
        }
    }

    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        match self
            .send(Request::Hello {
                version: env!("CARGO_PKG_VERSION").to_string(),
            })
            .await?
        {
            Response::Hello { version } => Ok(version),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get daemon status
    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(Request::Status).await? {
            Response::Status {
                uptime_secs,
                world,
                cadence,
                next_fire,
                active_phase,
            } => Ok(DaemonStatus {
                uptime_secs,
                world,
                cadence,
                next_fire,
                active_phase,
            }),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get the armed schedule
    pub async fn schedule(&self) -> Result<(String, Option<String>, bool), ClientError> {
        match self.send(Request::Schedule).await? {
            Response::Schedule {
                cadence,
                next_fire,
                repeating,
            } => Ok((cadence, next_fire, repeating)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get the persisted settings
    pub async fn get_settings(&self) -> Result<Settings, ClientError> {
        match self.send(Request::GetSettings).await? {
            Response::Settings { settings } => Ok(settings),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Change one setting
    pub async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        match self
            .send(Request::Set {
                key: key.to_string(),
                value: value.to_string(),
                token: self.token(),
            })
            .await?
        {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Force a reset cycle now
    pub async fn reset(&self) -> Result<(), ClientError> {
        match self
            .send(Request::Reset {
                token: self.token(),
            })
            .await?
        {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Re-read the settings file and rearm the schedule
    pub async fn reload(&self) -> Result<(), ClientError> {
        match self
            .send(Request::Reload {
                token: self.token(),
            })
            .await?
        {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Create the configured world if it is absent
    pub async fn ensure_world(&self) -> Result<bool, ClientError> {
        match self
            .send(Request::EnsureWorld {
                token: self.token(),
            })
            .await?
        {
            Response::Created { created } => Ok(created),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self
            .send(Request::Shutdown {
                token: self.token(),
            })
            .await?
        {
            Response::Ok | Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background(config: &Config) -> Result<std::process::Child, ClientError> {
    let fallowd_path = find_fallowd_binary();

    Command::new(&fallowd_path)
        .arg(&config.state_dir)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if daemon was stopped, false if it wasn't running
pub async fn daemon_stop(config: &Config) -> Result<bool, ClientError> {
    let client = match DaemonClient::connect(config, None) {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            cleanup_stale_pid(config);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    // Try graceful shutdown (timeout handled by send())
    let shutdown_result = client.shutdown().await;

    if let Some(pid) = read_daemon_pid(config) {
        if shutdown_result.is_ok() {
            // Graceful shutdown succeeded, wait for process to exit
            wait_for_exit(pid, timeout_exit()).await;
        }

        // Force kill if still running
        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    cleanup_stale_pid(config);

    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the fallowd binary
fn find_fallowd_binary() -> PathBuf {
    // Explicit override (used by tests to ensure correct binary)
    if let Ok(path) = std::env::var("FALLOW_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    // First check if we're running from cargo (development)
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let dev_path = PathBuf::from(manifest_dir)
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.join("target/debug/fallowd"));
        if let Some(path) = dev_path {
            if path.exists() {
                return path;
            }
        }
    }

    // Check current executable's directory
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("fallowd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    // Fall back to PATH lookup
    PathBuf::from("fallowd")
}

/// Clean up orphaned PID file during shutdown.
///
/// Called by daemon_stop when the daemon is not running or after stopping it.
fn cleanup_stale_pid(config: &Config) {
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Get the PID from the daemon PID file, if it exists
pub fn read_daemon_pid(config: &Config) -> Option<u32> {
    let content = std::fs::read_to_string(&config.lock_path).ok()?;
    content.trim().parse::<u32>().ok()
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // Use kill -0 to check if process exists without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Read daemon log from startup marker, looking for errors.
/// Returns the error message if found, None otherwise.
pub fn read_startup_error(config: &Config) -> Option<String> {
    let content = std::fs::read_to_string(&config.log_path).ok()?;

    // Find the last startup marker
    let start_pos = content.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &content[start_pos..];

    // Look for ERROR lines
    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .collect();

    if errors.is_empty() {
        return None;
    }

    // Extract just the error messages (strip timestamp/level prefix)
    let error_messages: Vec<String> = errors
        .iter()
        .filter_map(|line| {
            // Format: "timestamp LEVEL target: message"
            // Find the message part after the last colon-space
            line.split_once(": ").map(|(_, msg)| msg.to_string())
        })
        .collect();

    if error_messages.is_empty() {
        Some(errors.join("\n"))
    } else {
        Some(error_messages.join("\n"))
    }
}

/// Wrap an error with startup log info if available.
/// If the daemon log contains errors, return DaemonStartFailed with that info.
/// Otherwise, return the original error.
fn wrap_with_startup_error(err: ClientError, config: &Config) -> ClientError {
    // Don't double-wrap
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    if let Some(startup_error) = read_startup_error(config) {
        ClientError::DaemonStartFailed(startup_error)
    } else {
        err
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
