//! `skiff deploy [environment] [--force]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use skiff_core::{config, Environment};
use skiff_engine::{deploy, DeployReport};
use skiff_store::NoopCdn;

use super::open_store;

/// Arguments for `skiff deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Destination environment.
    #[arg(default_value = "development")]
    pub environment: Environment,

    /// Re-upload every file even when digests match.
    #[arg(long)]
    pub force: bool,

    /// Object-store root directory (default: ~/.skiff/store).
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

impl DeployArgs {
    pub fn run(self) -> Result<()> {
        let project_dir = std::env::current_dir().context("cannot determine working directory")?;
        let config = config::load_at(&project_dir)?;
        let store = open_store(self.store_dir)?;

        let report = deploy(
            &store,
            &NoopCdn,
            &config,
            &project_dir,
            self.environment,
            self.force,
        )
        .with_context(|| format!("deploy to {} failed", self.environment))?;

        print_report(&config.name, &report);
        Ok(())
    }
}

fn print_report(name: &str, report: &DeployReport) {
    println!(
        "✓ deployed '{}' to {} ({} uploaded, {} unchanged, {} deleted)",
        name,
        report.environment,
        report.uploaded.len(),
        report.skipped.len(),
        report.deleted.len(),
    );
    for key in &report.uploaded {
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
            "! {} key(s) could not be removed and remain in the bucket:",
            report.failed_deletes.len()
        );
        for key in &report.failed_deletes {
            println!("  ?  {key}");
        }
    }
}
