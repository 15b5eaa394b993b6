//! skiff — static site deployment CLI.
//!
//! # Usage
//!
//! ```text
//! skiff create                         interactive setup, creates buckets
//! skiff init                           interactive setup against existing buckets
//! skiff deploy [environment] [--force]
//! skiff promote <source> <destination> [--force]
//! skiff server [port]
//! ```
//!
//! Configuration lives in `skiff.yaml` in the current directory.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    create::CreateArgs, deploy::DeployArgs, init::InitArgs, promote::PromoteArgs,
    server::ServerArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "skiff",
    version,
    about = "Deploy a directory tree to versioned, hash-addressed site buckets",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set up a new app, creating one bucket per environment.
    Create(CreateArgs),

    /// Set up against buckets that already exist.
    Init(InitArgs),

    /// Reconcile the local tree into an environment's bucket.
    Deploy(DeployArgs),

    /// Mirror one environment's bucket into another's.
    Promote(PromoteArgs),

    /// Serve the configured root locally for development.
    Server(ServerArgs),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Create(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Deploy(args) => args.run(),
        Commands::Promote(args) => args.run(),
        Commands::Server(args) => args.run(),
    }
}
