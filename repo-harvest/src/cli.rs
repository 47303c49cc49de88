//! # repo-harvest CLI Interface (Module)
//!
//! Command parsing and user-visible output. All pipeline logic lives in
//! `repo-harvest-core`; this module only wires arguments and config into it.
//!
//! - [`Cli`] defines the subcommands.
//! - [`run`] is the async entrypoint used by `main()` and by integration tests.
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repo_harvest_core::clone::GitCloner;
use repo_harvest_core::convert::{convert_repository, ConversionOutcome};
use repo_harvest_core::harvest::{harvest, ConversionStatus, HarvestReport};
use std::path::PathBuf;

/// CLI for repo-harvest: clone repositories and convert them to JSONL corpora.
#[derive(Parser)]
#[clap(
    name = "repo-harvest",
    version,
    about = "Clone source repositories from a manifest and convert them into line-delimited JSON"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone every repository in the manifest and convert all local clones
    Harvest {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Manifest to use instead of the one named in the config
        #[clap(long)]
        manifest: Option<PathBuf>,
        /// Process only the first N manifest entries
        #[clap(long)]
        limit: Option<usize>,
        /// Clones and conversions to run at once
        #[clap(long)]
        concurrency: Option<usize>,
    },
    /// Convert a single local directory without cloning anything
    Convert {
        /// Repository root to convert
        #[clap(long)]
        repo: PathBuf,
        /// Directory receiving the `<repo>.jsonl` artifact
        #[clap(long)]
        output_dir: PathBuf,
    },
}

fn print_report(report: &HarvestReport) {
    println!("Harvest complete.");
    println!(
        "  cloned: {}, already present: {}, clone failures: {}",
        report.cloned(),
        report.already_present(),
        report.clone_failures().len()
    );
    for identifier in report.clone_failures() {
        println!("  failed to clone: {identifier}");
    }
    for conversion in &report.conversions {
        match &conversion.status {
            ConversionStatus::Written { records, .. } => {
                println!("  converted {} ({records} records)", conversion.repository)
            }
            ConversionStatus::AlreadyConverted { .. } => {
                println!("  already converted {}", conversion.repository)
            }
            ConversionStatus::Failed { reason } => {
                println!("  failed to convert {}: {reason}", conversion.repository)
            }
        }
    }
    println!("Artifacts: {}", report.output_dir.display());
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Harvest {
            config,
            manifest,
            limit,
            concurrency,
        } => {
            let mut config = load_config(config)?;
            if let Some(manifest) = manifest {
                config.manifest_path = manifest;
            }
            if limit.is_some() {
                config = config.with_limit(limit);
            }
            if let Some(concurrency) = concurrency {
                config = config.with_concurrency(concurrency);
            }

            tracing::info!(command = "harvest", "Starting harvest");
            let report = harvest(&config, &GitCloner::new())
                .await
                .context("Harvest failed")?;
            print_report(&report);
            Ok(())
        }
        Commands::Convert { repo, output_dir } => {
            tracing::info!(command = "convert", repo = %repo.display(), "Starting conversion");
            let outcome = convert_repository(&repo, &output_dir)
                .with_context(|| format!("Failed to convert {}", repo.display()))?;
            match outcome {
                ConversionOutcome::Written { artifact, records } => {
                    println!("Wrote {records} records to {}", artifact.display())
                }
                ConversionOutcome::AlreadyConverted { artifact } => {
                    println!("Already converted: {}", artifact.display())
                }
            }
            Ok(())
        }
    }
}
