// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

//! # Access Request CLI
//!
//! The `access-request` binary is the terminal front end for requesting
//! plan-suggestion access as a franchisee.
//!
//! ## Commands
//!
//! - `access-request [form]` - Interactive request form (default)
//! - `access-request check <email>` - Validate an email without submitting
//! - `access-request units` - List active units
//! - `access-request config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use access_request_cli::commands::{self, ConfigCommand, FormArgs};

/// Franchisee access request form
#[derive(Parser)]
#[command(name = "access-request")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "ACCESS_REQUEST_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ACCESS_REQUEST_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in and submit an access request
    #[command(name = "form")]
    Form(FormArgs),

    /// Validate an email against the directory without submitting
    #[command(name = "check")]
    Check {
        /// Corporate email to validate
        email: String,
    },

    /// List active units
    #[command(name = "units")]
    Units,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Form(args)) => commands::form::execute(args, cli.config).await,
        Some(Commands::Check { email }) => commands::check::execute(email, cli.config).await,
        Some(Commands::Units) => commands::units::execute(cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => commands::form::execute(FormArgs::default(), cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
