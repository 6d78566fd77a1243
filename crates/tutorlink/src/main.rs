// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tutorlink - session coordination for seniors and volunteer helpers.
//!
//! This is the binary entry point for the Tutorlink service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod serve;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tutorlink_core::types::Role;

/// Tutorlink - session coordination for seniors and volunteer helpers.
#[derive(Parser, Debug)]
#[command(name = "tutorlink", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the default search path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Apply the timeout policy once and print what changed.
    Sweep {
        /// Only examine sessions this user takes part in.
        #[arg(long)]
        participant: Option<String>,
    },
    /// Manage the profile directory.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Show whether the gateway is running.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    /// Add or update a profile.
    Add {
        #[arg(long)]
        id: String,
        /// senior, volunteer or admin.
        #[arg(long)]
        role: Role,
        /// Display name shown to the other participant.
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => tutorlink_config::load_and_validate_path(path),
        None => tutorlink_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tutorlink_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Sweep { participant } => admin::run_sweep(&config, participant).await,
        Commands::Profile {
            action: ProfileCommands::Add { id, role, name },
        } => admin::run_profile_add(&config, id, role, name).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
