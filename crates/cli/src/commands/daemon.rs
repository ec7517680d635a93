// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon management commands

use crate::client::{self, daemon_stop, DaemonClient};
use anyhow::Result;
use clap::Subcommand;
use fallow_daemon::lifecycle::Config;
use std::time::Duration;

#[derive(clap::Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background
    Start,
    /// Stop the running daemon
    Stop,
    /// Show daemon status
    Status,
}

pub async fn daemon(args: DaemonArgs, config: &Config) -> Result<()> {
    match args.command {
        DaemonCommand::Start => {
            if DaemonClient::connect(config, None).is_ok() {
                println!("Daemon already running");
                return Ok(());
            }
            DaemonClient::connect_or_start(config, None).await?;
            println!("Daemon started");
        }

        DaemonCommand::Stop => {
            if daemon_stop(config).await? {
                println!("Daemon stopped");
            } else {
                println!("Daemon not running");
            }
        }

        DaemonCommand::Status => {
            let client = match DaemonClient::connect(config, None) {
                Ok(c) => c,
                Err(client::ClientError::DaemonNotRunning) => {
                    println!("Daemon not running");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let version = client.hello().await?;
            let status = client.status().await?;

            println!("Status: running");
            println!("Version: {}", version);
            println!(
                "Uptime: {}",
                humantime::format_duration(Duration::from_secs(status.uptime_secs))
            );
            println!("World: {}", status.world);
            println!("Cadence: {}", status.cadence);
            match status.next_fire {
                Some(at) => println!("Next reset: {}", at),
                None => println!("Next reset: not scheduled"),
            }
            match status.active_phase {
                Some(phase) => println!("Cycle: {}", phase),
                None => println!("Cycle: idle"),
            }
        }
    }

    Ok(())
}
