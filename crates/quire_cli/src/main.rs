//! Quire CLI for incremental compilation of JasperReports designs.
//!
//! Provides `quire build` to compile changed designs, `quire status` to show
//! what a build would do, and `quire clean` to remove outputs and snapshots.

#![warn(missing_docs)]

mod build;
mod clean;
mod pipeline;
mod status;

use std::process;

use clap::{Parser, Subcommand};

/// Quire, an incremental report-design compiler driver.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about = "Incremental JasperReports compiler driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `quire.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile added and modified designs, remove outputs of deleted ones.
    Build(BuildArgs),
    /// Show which designs are added, modified or removed.
    Status(TaskArgs),
    /// Delete the output tree and snapshot of the selected tasks.
    Clean(TaskArgs),
}

/// Arguments for the `quire build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Tasks to build, in order. Defaults to every task.
    pub tasks: Vec<String>,

    /// Ignore the snapshot and recompile every design.
    #[arg(short, long)]
    pub force: bool,

    /// Number of parallel jobs (overrides `worker.jobs`).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Task selection shared by `status` and `clean`.
#[derive(Parser, Debug)]
pub struct TaskArgs {
    /// Tasks to act on. Defaults to every task.
    pub tasks: Vec<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    pipeline::init_tracing(&global);

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Status(ref args) => status::run(args, &global),
        Command::Clean(ref args) => clean::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
