//! # lifewatch CLI Module
//!
//! This module implements the CLI interface for lifewatch.
//!
//! ## Available Commands
//!
//! - `classify` - Classify one or more OS descriptors
//! - `inventory` - Classify every server of an inventory file
//! - `policy` - Show the lifecycle dates of a family
//! - `legacy` - List the static status table
//! - `server` - Start the HTTP server

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use lifewatch_core::{LifewatchError, OsFamily};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// lifewatch - OS support lifecycle classifier
///
/// Tells whether each server's operating system is Supported, in Extended
/// Support, End of Life, or Unknown.
#[derive(Parser, Debug)]
#[command(name = "lifewatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file (default: lifewatch.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify OS descriptors, e.g. "RHEL 7.9"
    Classify {
        /// Descriptors to classify
        #[arg(required = true)]
        descriptors: Vec<String>,

        /// Evaluate at this instant (YYYY-MM-DD or RFC 3339) instead of now
        #[arg(long)]
        now: Option<String>,

        /// Use the static legacy table instead of fetched lifecycle data
        #[arg(long)]
        legacy: bool,
    },

    /// Classify every server of an inventory file
    Inventory {
        /// Path to the inventory JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Evaluate at this instant (YYYY-MM-DD or RFC 3339) instead of now
        #[arg(long)]
        now: Option<String>,

        /// Use the static legacy table instead of fetched lifecycle data
        #[arg(long)]
        legacy: bool,
    },

    /// Show the lifecycle dates of a family (rhel, windows-server, ubuntu, oracle-linux)
    Policy {
        /// Family product key
        family: OsFamily,
    },

    /// List the static status table
    Legacy {
        /// Only this family
        family: Option<OsFamily>,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to (default: server.host from the configuration)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default: server.port from the configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), LifewatchError> {
    let config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Classify {
            descriptors,
            now,
            legacy,
        } => cmd_classify(&config, json_mode, &descriptors, now.as_deref(), legacy).await,
        Commands::Inventory { file, now, legacy } => {
            cmd_inventory(&config, json_mode, &file, now.as_deref(), legacy).await
        }
        Commands::Policy { family } => cmd_policy(&config, json_mode, family).await,
        Commands::Legacy { family } => cmd_legacy(json_mode, family),
        Commands::Server { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            cmd_server(&config, &host, port).await
        }
    }
}
