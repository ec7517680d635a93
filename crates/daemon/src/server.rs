// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use tokio::net::UnixStream;
use tracing::{debug, error, info};

use crate::lifecycle::DaemonState;
use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use crate::settings::save_settings;
use fallow_core::Applied;
use fallow_engine::RuntimeError;

/// Handle a single client connection
pub async fn handle_connection(
    daemon: &mut DaemonState,
    stream: UnixStream,
) -> Result<(), ServerError> {
    // Split stream for reading/writing
    let (mut reader, mut writer) = stream.into_split();

    // Read request with timeout
    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    // Handle request
    let response = handle_request(daemon, request).await;

    debug!("Sending response: {:?}", response);

    // Write response with timeout
    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Check the presented token against the configured admin token.
///
/// No configured token means every caller is trusted (single-operator
/// hosts); a configured token gates every mutating request.
fn authorized(daemon: &DaemonState, token: &Option<String>) -> bool {
    let settings = daemon.settings.lock().unwrap_or_else(|e| e.into_inner());
    match &settings.admin_token {
        None => true,
        Some(required) => token.as_deref() == Some(required.as_str()),
    }
}

/// Handle a single request and return a response
async fn handle_request(daemon: &mut DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Status => {
            let uptime_secs = daemon.start_time.elapsed().as_secs();
            let world = {
                let settings = daemon.settings.lock().unwrap_or_else(|e| e.into_inner());
                settings.world_name.clone()
            };
            let summary = daemon.runtime.schedule_summary();

            Response::Status {
                uptime_secs,
                world,
                cadence: summary.cadence,
                next_fire: summary.next_fire.map(|at| at.to_string()),
                active_phase: daemon.runtime.active_phase(),
            }
        }

        Request::Schedule => {
            let summary = daemon.runtime.schedule_summary();
            Response::Schedule {
                cadence: summary.cadence,
                next_fire: summary.next_fire.map(|at| at.to_string()),
                repeating: summary.repeating,
            }
        }

        Request::GetSettings => {
            let settings = daemon.settings.lock().unwrap_or_else(|e| e.into_inner());
            Response::Settings {
                settings: settings.clone(),
            }
        }

        Request::Set { key, value, token } => {
            if !authorized(daemon, &token) {
                return Response::Unauthorized;
            }
            apply_setting(daemon, &key, &value).await
        }

        Request::Reset { token } => {
            if !authorized(daemon, &token) {
                return Response::Unauthorized;
            }
            match daemon.runtime.trigger_now().await {
                Ok(events) => {
                    info!("manual reset triggered");
                    for event in events {
                        if let Err(e) = daemon.process_event(event).await {
                            return Response::Error {
                                message: e.to_string(),
                            };
                        }
                    }
                    Response::Ok
                }
                Err(RuntimeError::CycleInProgress) => Response::Busy,
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }

        Request::Reload { token } => {
            if !authorized(daemon, &token) {
                return Response::Unauthorized;
            }
            let loaded = match crate::settings::load_settings(&daemon.config.settings_path) {
                Ok(settings) => settings,
                Err(e) => {
                    return Response::Error {
                        message: e.to_string(),
                    }
                }
            };
            {
                let mut settings = daemon.settings.lock().unwrap_or_else(|e| e.into_inner());
                *settings = loaded;
            }
            info!("settings reloaded from file");
            if let Err(e) = daemon.runtime.ensure_world().await {
                tracing::warn!(error = %e, "could not ensure target world after reload");
            }
            rearm(daemon).await
        }

        Request::EnsureWorld { token } => {
            if !authorized(daemon, &token) {
                return Response::Unauthorized;
            }
            match daemon.runtime.ensure_world().await {
                Ok(created) => Response::Created { created },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }

        Request::Shutdown { token } => {
            if !authorized(daemon, &token) {
                return Response::Unauthorized;
            }
            daemon.shutdown_requested = true;
            Response::ShuttingDown
        }
    }
}

/// Apply one setting, persist, and do whatever the change requires.
async fn apply_setting(daemon: &mut DaemonState, key: &str, value: &str) -> Response {
    let applied = {
        let mut settings = daemon.settings.lock().unwrap_or_else(|e| e.into_inner());
        match settings.apply(key, value) {
            Ok(applied) => applied,
            Err(e) => {
                return Response::Error {
                    message: e.to_string(),
                }
            }
        }
    };

    {
        let settings = daemon.settings.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = save_settings(&daemon.config.settings_path, &settings) {
            return Response::Error {
                message: e.to_string(),
            };
        }
    }
    info!(key, value, "setting changed");

    match applied {
        Applied::Rearm => rearm(daemon).await,
        Applied::EnsureWorld => match daemon.runtime.ensure_world().await {
            Ok(_) => Response::Ok,
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },
        Applied::Nothing => Response::Ok,
    }
}

async fn rearm(daemon: &mut DaemonState) -> Response {
    match daemon.runtime.start().await {
        Ok(events) => {
            for event in events {
                if let Err(e) = daemon.process_event(event).await {
                    return Response::Error {
                        message: e.to_string(),
                    };
                }
            }
            Response::Ok
        }
        Err(e) => Response::Error {
            message: e.to_string(),
        },
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}
