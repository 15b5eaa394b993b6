//! `skiff promote <source> <destination> [--force]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use skiff_core::{config, Environment};
use skiff_engine::{promote, PromoteReport};
use skiff_store::NoopCdn;

use super::open_store;

/// Arguments for `skiff promote`.
#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Environment to copy from.
    pub source: Environment,

    /// Environment to copy into.
    pub destination: Environment,

    /// Re-copy every key even when stored digests match.
    #[arg(long)]
    pub force: bool,

    /// Object-store root directory (default: ~/.skiff/store).
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

impl PromoteArgs {
    pub fn run(self) -> Result<()> {
        let project_dir = std::env::current_dir().context("cannot determine working directory")?;
        let config = config::load_at(&project_dir)?;
        let store = open_store(self.store_dir)?;

        let report = promote(
            &store,
            &NoopCdn,
            &config,
            self.source,
            self.destination,
            self.force,
        )
        .with_context(|| format!("promote {} to {} failed", self.source, self.destination))?;

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &PromoteReport) {
    println!(
        "✓ promoted {} to {} ({} copied, {} unchanged, {} deleted)",
        report.source,
        report.destination,
        report.copied.len(),
        report.skipped.len(),
        report.deleted.len(),
    );
    for key in &report.copied {
        println!("  ✎  {key}");
    }
    for key in &report.skipped {
        println!("  ·  {key}");
    }
    for key in &report.deleted {
        println!("  ✗  {key}");
    }
    if !report.failed_deletes.is_empty() {
        println!(
            "! {} key(s) could not be removed from {}:",
            report.failed_deletes.len(),
            report.destination,
        );
        for key in &report.failed_deletes {
            println!("  ?  {key}");
        }
    }
}
