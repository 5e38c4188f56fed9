//! # Arbor CLI (`arbor`)
//!
//! The `arbor` binary migrates an exported HTML knowledge base — a
//! directory with an `index.html` navigation shell, per-page HTML files,
//! and `attachments/` folders — into Markdown files or a remote wiki.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `arbor markdown` | Convert the export to a mirrored Markdown directory tree |
//! | `arbor publish` | Create remote documents for every page, preserving hierarchy |
//! | `arbor collections` | List the remote instance's collections |
//!
//! ## Examples
//!
//! ```bash
//! # Convert an export to Markdown on disk
//! arbor markdown --input ./export --output ./wiki
//!
//! # Publish the export into a remote collection, reviewing each page
//! arbor publish --input ./export --output ./archive \
//!     --collection 6e9f-... --verify
//!
//! # Find a collection id to publish into
//! arbor collections --config ./arbor.toml
//! ```

mod attach;
mod config;
mod convert;
mod error;
mod export;
mod hierarchy;
mod publish;
mod rate;
mod remote;
mod review;
mod summary;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::rate::RateLimiter;
use crate::remote::RemoteClient;

/// Arbor — migrate an exported HTML knowledge base to Markdown or a
/// remote wiki.
///
/// Remote commands read connection settings from a TOML configuration
/// file; `markdown` needs none.
#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Migrate an exported HTML knowledge base to Markdown or a remote wiki",
    version,
    long_about = "Arbor recovers the page hierarchy from an HTML export's navigation \
    index and migrates every page exactly once, either to a mirrored Markdown \
    directory tree or to a remote document-management instance with parent/child \
    linkage preserved and API calls rate limited."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Required for `publish` and `collections`; see `arbor.example.toml`.
    #[arg(long, global = true, default_value = "./arbor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Convert the export to Markdown files on disk.
    ///
    /// Each page becomes a directory named after its sanitized title,
    /// holding the page's Markdown and a sibling `attachments/` directory
    /// when the page references files. The directory tree mirrors the
    /// navigation hierarchy.
    Markdown {
        /// Path to the HTML export (the directory holding `index.html`).
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output directory for the Markdown tree.
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Review each page's Markdown before it is written.
        #[arg(long, short = 'r')]
        verify: bool,
    },

    /// Publish the export into a remote collection.
    ///
    /// Creates one remote document per page, parent before child, and
    /// uploads referenced attachments. A local archive copy of each
    /// created document's Markdown is written under the output directory.
    Publish {
        /// Path to the HTML export (the directory holding `index.html`).
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Directory for local archive copies of the converted pages.
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Identifier of the remote collection to populate.
        #[arg(long, short = 'c')]
        collection: String,

        /// Review each page's Markdown before it is uploaded.
        #[arg(long, short = 'r')]
        verify: bool,
    },

    /// List the remote instance's collections as JSON.
    ///
    /// Useful for finding the `--collection` value for `publish`.
    Collections,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Markdown {
            input,
            output,
            verify,
        } => {
            let summary = export::run_export(&input, &output, verify)?;
            println!("conversion completed successfully: {}", summary);
        }
        Commands::Publish {
            input,
            output,
            collection,
            verify,
        } => {
            let cfg = config::load_config(&cli.config)?;
            let remote_cfg = cfg
                .remote
                .context("a [remote] section in the config file is required for publish")?;
            let limiter = RateLimiter::from_config(&cfg.rate_limit);
            let client = RemoteClient::new(&remote_cfg, limiter)?;
            let summary =
                publish::run_publish(&client, &input, &output, &collection, verify).await?;
            println!("processing completed successfully: {}", summary);
        }
        Commands::Collections => {
            let cfg = config::load_config(&cli.config)?;
            let remote_cfg = cfg
                .remote
                .context("a [remote] section in the config file is required for collections")?;
            let limiter = RateLimiter::from_config(&cfg.rate_limit);
            let client = RemoteClient::new(&remote_cfg, limiter)?;
            let collections = client.list_collections().await?;
            println!("{}", serde_json::to_string_pretty(&collections)?);
        }
    }

    Ok(())
}
