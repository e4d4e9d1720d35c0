//! FileRank MCP server: file rankings and import graph for AI agents.
//!
//! Runs a JSON-RPC 2.0 server over STDIO.
//!
//! Usage:
//!   filerank-mcp [project_root]
//!
//! If no project root is given, uses the current working directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use filerank::{FileRankConfig, FileRankService};
use tracing::info;

fn main() -> Result<()> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let project_root = match std::env::args().nth(1) {
        Some(root) => PathBuf::from(root),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let project_root = filerank::config::resolve_root(&project_root);

    let config = FileRankConfig::load(&FileRankConfig::path_for(&project_root));
    info!(
        root = %project_root.display(),
        data_file = %config.resolve_data_path(&project_root).display(),
        "FileRank MCP server starting"
    );

    let mut service = FileRankService::open(&project_root, &config)
        .context("failed to load rankings")?;

    info!("waiting for JSON-RPC requests on stdin");
    filerank::mcp::run(&mut service).context("stdio transport failed")?;
    Ok(())
}
