// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `imdf` - create, inspect and validate IMDF projects from the shell

mod lint;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use imdf_archive::{list_projects, Archive, Project};
use log::{debug, info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "imdf", version, about = "IMDF project tools")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty project directory
    New {
        path: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        client: Option<String>,
    },
    /// Print the manifest and per-category feature counts
    Info { path: PathBuf },
    /// Load a dataset and report structural problems
    Validate {
        /// Project directory or bare dataset directory
        path: PathBuf,
        /// Exit successfully even when lints are found
        #[arg(long, default_value_t = false)]
        allow_warnings: bool,
    },
    /// List projects in a workspace, newest first
    List { workspace: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::New {
            path,
            title,
            client,
        } => {
            let mut project = Project::create(&path, title)
                .with_context(|| format!("creating project at {}", path.display()))?;
            if client.is_some() {
                project.manifest_mut().client = client;
                project.save()?;
            }
            info!(
                "Created project {} at {}",
                project.manifest().uuid,
                path.display()
            );
        }
        Command::Info { path } => {
            let project = Project::open(&path)
                .with_context(|| format!("opening project at {}", path.display()))?;
            let manifest = project.manifest();
            println!("title:        {}", manifest.title);
            println!("uuid:         {}", manifest.uuid);
            println!("imdf version: {}", manifest.imdf_version);
            println!("updated:      {}", manifest.updated_at.to_rfc3339());
            if let Some(client) = &manifest.client {
                println!("client:       {}", client);
            }
            for (category, count) in project.archive().category_counts() {
                println!("{:>14}: {}", category, count);
            }
            if let Some(bounds) = project.archive().bounding_region() {
                let center = bounds.center();
                println!(
                    "center:       {:.6}, {:.6}",
                    center.latitude, center.longitude
                );
            }
        }
        Command::Validate {
            path,
            allow_warnings,
        } => {
            let archive = Archive::load(&path)
                .with_context(|| format!("loading dataset at {}", path.display()))?;
            debug!("Loaded {} features", archive.len());

            let findings = lint::lint(&archive);
            for finding in &findings {
                warn!("{}", finding);
            }
            info!(
                "{} features, {} warnings",
                archive.len(),
                findings.len()
            );
            if !findings.is_empty() && !allow_warnings {
                bail!("{} problems found in {}", findings.len(), path.display());
            }
        }
        Command::List { workspace } => {
            for entry in list_projects(&workspace)? {
                println!(
                    "{}  {}  {}",
                    entry.manifest.updated_at.format("%Y-%m-%d %H:%M"),
                    entry.manifest.title,
                    entry.root.display()
                );
            }
        }
    }

    Ok(())
}
