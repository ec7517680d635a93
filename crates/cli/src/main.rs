// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fallow - resource world reset CLI

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::daemon;
use std::path::PathBuf;

use crate::client::DaemonClient;
use fallow_daemon::lifecycle::Config;

#[derive(Parser)]
#[command(
    name = "fallow",
    version,
    about = "Scheduled resource world resets"
)]
struct Cli {
    /// State directory (default: $FALLOW_STATE_DIR or ~/.local/state/fallow)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Admin token for mutating commands
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daemon management
    Daemon(daemon::DaemonArgs),
    /// Show daemon status
    Status,
    /// Show the current settings
    Settings,
    /// Show the armed reset schedule
    Schedule,
    /// Change a setting (world, type, day, hour, warning, interval)
    Set { key: String, value: String },
    /// Force a reset cycle now
    Reset,
    /// Re-read the settings file and rearm the schedule
    Reload,
    /// Create the configured world if it is absent
    Ensure,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.state_dir.clone())?;

    // Handle daemon commands separately (start/stop don't need a connection)
    if let Commands::Daemon(args) = cli.command {
        return daemon::daemon(args, &config).await;
    }

    // All other commands go through the daemon
    let client = DaemonClient::connect_or_start(&config, cli.token.clone()).await?;

    match cli.command {
        Commands::Status => {
            daemon::daemon(
                daemon::DaemonArgs {
                    command: daemon::DaemonCommand::Status,
                },
                &config,
            )
            .await?;
        }

        Commands::Settings => {
            let settings = client.get_settings().await?;
            println!("world = {}", settings.world_name);
            println!("type = {}", settings.reset_type);
            println!("day = {}", settings.reset_day);
            println!("hour = {}", settings.restart_time);
            println!("warning = {}", settings.reset_warning_time);
            println!("interval = {}", settings.reset_interval);
        }

        Commands::Schedule => {
            let (cadence, next_fire, repeating) = client.schedule().await?;
            println!("Cadence: {}", cadence);
            match next_fire {
                Some(at) => println!("Next reset: {}", at),
                None => println!("Next reset: not scheduled"),
            }
            if repeating {
                println!("Repeating: yes");
            }
        }

        Commands::Set { key, value } => {
            client.set(&key, &value).await?;
            println!("Set {} = {}", key, value);
        }

        Commands::Reset => match client.reset().await {
            Ok(()) => println!("Reset started"),
            Err(client::ClientError::Busy) => {
                anyhow::bail!("A reset cycle is already in progress")
            }
            Err(e) => return Err(e.into()),
        },

        Commands::Reload => {
            client.reload().await?;
            println!("Settings reloaded");
        }

        Commands::Ensure => {
            if client.ensure_world().await? {
                println!("World created");
            } else {
                println!("World already exists");
            }
        }

        Commands::Daemon(_) => unreachable!(),
    }

    Ok(())
}
