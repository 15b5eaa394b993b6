//! `skiff create` — interactive first-run setup that also creates the
//! buckets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use dialoguer::Input;

use skiff_core::{config, types::BucketName, types::Buckets, Config, Environment};
use skiff_store::ObjectStore;

use super::open_store;

/// Arguments for `skiff create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Object-store root directory (default: ~/.skiff/store).
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

impl CreateArgs {
    pub fn run(self) -> Result<()> {
        let project_dir = std::env::current_dir().context("cannot determine working directory")?;
        let store = open_store(self.store_dir)?;

        let name = prompt_name(&project_dir)?;
        let root = prompt_root()?;

        let mut buckets = Vec::with_capacity(Environment::all().len());
        for env in Environment::all() {
            // Re-prompt until the bucket can actually be created.
            loop {
                let bucket: BucketName = Input::<String>::new()
                    .with_prompt(format!("Bucket name for your {env} environment"))
                    .default(default_bucket(*env, &name))
                    .interact_text()?
                    .into();
                match store.create_bucket(&bucket) {
                    Ok(()) => {
                        buckets.push(bucket);
                        break;
                    }
                    Err(err) => println!("could not create '{bucket}': {err}"),
                }
            }
        }
        let mut buckets = buckets.into_iter();
        let config = Config {
            name: name.clone(),
            root: PathBuf::from(root),
            include: vec!["**".to_string()],
            ignore: vec![],
            buckets: Buckets {
                development: buckets.next().expect("three buckets"),
                staging: buckets.next().expect("three buckets"),
                production: buckets.next().expect("three buckets"),
            },
            created_at: Utc::now(),
        };
        config::save_at(&project_dir, &config)?;
        println!("✓ created '{name}' and wrote {}", config::CONFIG_FILE_NAME);
        Ok(())
    }
}

pub(crate) fn prompt_name(project_dir: &std::path::Path) -> Result<String> {
    let default = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string());
    Ok(Input::new()
        .with_prompt("What is the name of your app?")
        .default(default)
        .interact_text()?)
}

pub(crate) fn prompt_root() -> Result<String> {
    Ok(Input::new()
        .with_prompt("What is the root directory to get files from?")
        .default(".".to_string())
        .interact_text()?)
}

pub(crate) fn default_bucket(env: Environment, name: &str) -> String {
    match env {
        Environment::Development => format!("dev-www.{name}.com"),
        Environment::Staging => format!("stg-www.{name}.com"),
        Environment::Production => format!("www.{name}.com"),
    }
}
