//! `skiff init` — interactive setup against buckets that already exist.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use dialoguer::Input;

use skiff_core::{config, types::BucketName, types::Buckets, Config, Environment};

use super::create::{default_bucket, prompt_name, prompt_root};

/// Arguments for `skiff init`.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let project_dir = std::env::current_dir().context("cannot determine working directory")?;

        let name = prompt_name(&project_dir)?;
        let root = prompt_root()?;

        let mut bucket_for = |env: Environment| -> Result<BucketName> {
            Ok(Input::<String>::new()
                .with_prompt(format!("Name of your existing {env} bucket"))
                .default(default_bucket(env, &name))
                .interact_text()?
                .into())
        };

        let config = Config {
            name: name.clone(),
            root: PathBuf::from(root),
            include: vec!["**".to_string()],
            ignore: vec![],
            buckets: Buckets {
                development: bucket_for(Environment::Development)?,
                staging: bucket_for(Environment::Staging)?,
                production: bucket_for(Environment::Production)?,
            },
            created_at: Utc::now(),
        };
        config::save_at(&project_dir, &config)?;
        println!("✓ wrote {} for '{name}'", config::CONFIG_FILE_NAME);
        Ok(())
    }
}
