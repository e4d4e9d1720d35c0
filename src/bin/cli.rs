//! FileRank CLI - file rankings and import graph from the shell.
//!
//! Usage:
//!   filerank rank <file> <rank> [-s summary]   # Rank a file 1..=10
//!   filerank show <file>                       # Rank, summary, deps, importers
//!   filerank update <file>                     # Re-extract one file's imports
//!   filerank scan                              # Re-extract every ranked file
//!   filerank tree <file> [-d depth]            # Dependency tree
//!   filerank cycles                            # Import cycles

use anyhow::Result;
use clap::{Parser, Subcommand};
use filerank::{FileRankConfig, FileRankService};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filerank")]
#[command(about = "FileRank - file importance rankings and import dependency graph", long_about = None)]
struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Rankings document (overrides .filerank/config.toml)
    #[arg(long)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a file from 1 (most important) to 10 (least important)
    Rank {
        file: String,
        rank: i64,
        #[arg(short, long)]
        summary: Option<String>,
    },

    /// Show a ranked file with its dependencies and importers
    Show {
        /// File path, or a directory with --dir
        file: Option<String>,

        /// List every ranked file under this directory
        #[arg(long)]
        dir: Option<String>,
    },

    /// Forget a file's ranking and dependency entry
    Forget { file: String },

    /// Re-extract one file's imports
    Update { file: String },

    /// Re-extract imports for every ranked file
    Scan,

    /// Files a file imports
    Deps { file: String },

    /// Files that import a file
    Dependents { file: String },

    /// Print the dependency tree of a file
    Tree {
        file: String,

        #[arg(short, long)]
        depth: Option<usize>,

        /// Print the full structure as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List import cycles
    Cycles,

    /// Show graph statistics
    Stats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = filerank::config::resolve_root(&cli.root);
    let mut config = FileRankConfig::load(&FileRankConfig::path_for(&root));
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    let mut service = FileRankService::open(&root, &config)?;

    match cli.command {
        Commands::Rank {
            file,
            rank,
            summary,
        } => print_json(&service.rank_file(&file, rank, summary)?),

        Commands::Show { file, dir } => match (file, dir) {
            (_, Some(dir)) => print_json(&service.get_files_by_dir(&dir)),
            (Some(file), None) => print_json(&service.get_file(&file)?),
            (None, None) => print_json(&service.get_all_files()),
        },

        Commands::Forget { file } => print_json(&service.delete_node(&file)?),

        Commands::Update { file } => print_json(&service.update_dependencies(&file)?),

        Commands::Scan => {
            let report = service.scan_all_dependencies()?;
            for failure in &report.failures {
                eprintln!("skipped {}: {}", failure.file, failure.message);
            }
            print_json(&report)
        }

        Commands::Deps { file } => print_json(&service.get_dependencies(&file)?),

        Commands::Dependents { file } => print_json(&service.get_dependents(&file)?),

        Commands::Tree { file, depth, json } => {
            let view = service.visualize_dependencies(&file, depth)?;
            if json {
                return print_json(&view);
            }
            for line in &view.lines {
                println!("{}", line);
            }
            if !view.dependents.is_empty() {
                println!();
                println!("Imported by:");
                for dependent in &view.dependents {
                    match dependent.rank {
                        Some(rank) => println!("  {} [rank: {}]", dependent.file, rank),
                        None => println!("  {}", dependent.file),
                    }
                }
            }
            println!();
            println!(
                "{} certain, {} possible, {} dependents",
                view.stats.certain_dependencies,
                view.stats.possible_imports,
                view.stats.dependents_count
            );
            Ok(())
        }

        Commands::Cycles => {
            let cycles = service.find_cycles();
            if cycles.is_empty() {
                println!("No import cycles");
            }
            for (i, cycle) in cycles.iter().enumerate() {
                println!("Cycle {}:", i + 1);
                for file in cycle {
                    println!("  {}", file);
                }
            }
            Ok(())
        }

        Commands::Stats => print_json(&service.stats()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
