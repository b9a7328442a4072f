//! # lifewatch - OS Support Lifecycle Classifier
//!
//! The main binary for lifewatch.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for one-off classification and inventory reports
//! - Policy Store fetching lifecycle dates from the provider
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/lifewatch (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │  Policy Store    │    │
//! │  │  (clap)     │    │   (axum)    │    │  (reqwest)       │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │               │
//! │         └──────────────────┼────────────────────┘               │
//! │                            ▼                                    │
//! │                  ┌──────────────────┐                           │
//! │                  │  lifewatch-core  │                           │
//! │                  │   (THE LOGIC)    │                           │
//! │                  └──────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! lifewatch server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! lifewatch classify "RHEL 7.9" "Windows Server 2016"
//! lifewatch inventory -f servers.json --now 2026-01-01
//! lifewatch policy rhel
//! ```

use clap::Parser;
use lifewatch::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // LIFEWATCH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LIFEWATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lifewatch=info,tower_http=debug".into());

    // Logs go to stderr so --json-mode output stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    // Machine output never carries the banner.
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the lifewatch startup banner.
fn print_banner() {
    println!(
        r#"
  lifewatch v{}

  Supported • Extended Support • End of Life
"#,
        env!("CARGO_PKG_VERSION")
    );
}
