//! High-level pipeline: orchestrates manifest → clone → convert for a batch of repositories.
//!
//! [`harvest`] reads the manifest, makes sure every listed repository is present under
//! the clone root, then converts **every** repository found there (including ones
//! cloned by earlier runs) into its JSONL artifact.
//!
//! # Responsibilities
//! - Idempotent acquisition: an existing clone directory is never cloned again
//! - Failure isolation: a failed clone or a failed conversion is recorded in the
//!   [`HarvestReport`] and the batch carries on
//! - Resumability: existing artifacts are left alone, so rerunning picks up where an
//!   interrupted run stopped
//!
//! # Error Handling
//! Only preconditions are fatal: a missing or malformed manifest, or an unusable clone
//! root / output directory. Everything per-entry is reported, not returned as `Err`.
//!
//! # Concurrency
//! With [`HarvestConfig::concurrency`] above 1, up to that many clones run at once and
//! conversions run on blocking worker threads, the same number at a time. Manifest
//! entries sharing a derived name are collapsed so no two clones target one directory.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::HarvestConfig;
use crate::contract::{CloneOutcome, CloneRequest, Cloner};
use crate::convert::{self, ConversionOutcome};
use crate::manifest::{self, ManifestError, SourceManifestEntry};

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to prepare directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to list clone root {path}: {source}")]
    ListRepositories {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to one manifest entry during acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionStatus {
    AlreadyPresent,
    Cloned,
    CloneFailed { reason: String },
    /// The identifier is not a safe `owner/name` string; nothing was attempted.
    Invalid,
    /// Another entry earlier in the manifest already claimed the same directory.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionReport {
    pub identifier: String,
    pub status: AcquisitionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    Written { artifact: PathBuf, records: usize },
    AlreadyConverted { artifact: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub repository: String,
    pub status: ConversionStatus,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Where the artifacts live; the corpus handed to downstream stages.
    pub output_dir: PathBuf,
    /// One entry per manifest line, in manifest order.
    pub acquisitions: Vec<AcquisitionReport>,
    /// One entry per repository directory under the clone root, sorted by name.
    pub conversions: Vec<ConversionReport>,
}

impl HarvestReport {
    fn count_acquisitions(&self, pred: impl Fn(&AcquisitionStatus) -> bool) -> usize {
        self.acquisitions.iter().filter(|a| pred(&a.status)).count()
    }

    pub fn cloned(&self) -> usize {
        self.count_acquisitions(|s| matches!(s, AcquisitionStatus::Cloned))
    }

    pub fn already_present(&self) -> usize {
        self.count_acquisitions(|s| matches!(s, AcquisitionStatus::AlreadyPresent))
    }

    /// Identifiers whose clone failed, in manifest order.
    pub fn clone_failures(&self) -> Vec<&str> {
        self.acquisitions
            .iter()
            .filter(|a| matches!(a.status, AcquisitionStatus::CloneFailed { .. }))
            .map(|a| a.identifier.as_str())
            .collect()
    }

    pub fn written(&self) -> usize {
        self.conversions
            .iter()
            .filter(|c| matches!(c.status, ConversionStatus::Written { .. }))
            .count()
    }

    pub fn conversion_failures(&self) -> Vec<&str> {
        self.conversions
            .iter()
            .filter(|c| matches!(c.status, ConversionStatus::Failed { .. }))
            .map(|c| c.repository.as_str())
            .collect()
    }
}

fn prepare_dir(path: &Path) -> Result<(), HarvestError> {
    fs::create_dir_all(path).map_err(|source| HarvestError::Prepare {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the full pipeline described by `config`, cloning through `cloner`.
pub async fn harvest<C>(config: &HarvestConfig, cloner: &C) -> Result<HarvestReport, HarvestError>
where
    C: Cloner + ?Sized,
{
    info!("[HARVEST] Starting repository harvest");
    let entries = manifest::read_manifest(&config.manifest_path, config.limit)?;

    prepare_dir(&config.clone_root)?;
    prepare_dir(&config.output_dir)?;

    let acquisitions = acquire_all(config, cloner, entries).await;

    let repositories = list_repositories(&config.clone_root)?;
    info!(repositories = repositories.len(), "[HARVEST] Converting local repositories");
    let conversions = convert_all(&repositories, &config.output_dir, config.concurrency).await;

    let report = HarvestReport {
        output_dir: config.output_dir.clone(),
        acquisitions,
        conversions,
    };
    info!(
        cloned = report.cloned(),
        already_present = report.already_present(),
        clone_failures = report.clone_failures().len(),
        written = report.written(),
        conversion_failures = report.conversion_failures().len(),
        "[HARVEST] Harvest complete"
    );
    Ok(report)
}

async fn acquire_all<C>(
    config: &HarvestConfig,
    cloner: &C,
    entries: Vec<SourceManifestEntry>,
) -> Vec<AcquisitionReport>
where
    C: Cloner + ?Sized,
{
    let mut claimed = HashSet::new();
    let planned: Vec<(SourceManifestEntry, bool)> = entries
        .into_iter()
        .map(|entry| {
            let first = !entry.is_valid() || claimed.insert(entry.derived_name().to_string());
            (entry, first)
        })
        .collect();

    stream::iter(planned)
        .map(|(entry, first)| async move {
            let status = if first {
                acquire(config, cloner, &entry).await
            } else {
                warn!(
                    identifier = entry.identifier(),
                    "[HARVEST] Duplicate repository name in manifest, ignoring"
                );
                AcquisitionStatus::Duplicate
            };
            AcquisitionReport {
                identifier: entry.identifier().to_string(),
                status,
            }
        })
        .buffered(config.concurrency.max(1))
        .collect()
        .await
}

async fn acquire<C>(
    config: &HarvestConfig,
    cloner: &C,
    entry: &SourceManifestEntry,
) -> AcquisitionStatus
where
    C: Cloner + ?Sized,
{
    if !entry.is_valid() {
        warn!(
            identifier = entry.identifier(),
            "[HARVEST] Invalid repository identifier, skipping"
        );
        return AcquisitionStatus::Invalid;
    }

    let target = config.clone_root.join(entry.derived_name());
    if target.exists() {
        info!(
            identifier = entry.identifier(),
            "[HARVEST] Repository already exists, skipping clone"
        );
        return AcquisitionStatus::AlreadyPresent;
    }

    let request = CloneRequest {
        identifier: entry.identifier().to_string(),
        url: entry.source_url(&config.base_url),
        target,
    };
    match cloner.clone_repository(&request).await {
        CloneOutcome::Cloned => AcquisitionStatus::Cloned,
        CloneOutcome::Failed { reason } => {
            error!(
                identifier = entry.identifier(),
                url = %request.url,
                %reason,
                "[HARVEST] Failed to clone repository"
            );
            AcquisitionStatus::CloneFailed { reason }
        }
    }
}

/// Visible directories directly under `clone_root`, sorted by name.
pub fn list_repositories(clone_root: &Path) -> Result<Vec<PathBuf>, HarvestError> {
    let list_err = |source| HarvestError::ListRepositories {
        path: clone_root.to_path_buf(),
        source,
    };

    let mut repositories = Vec::new();
    for entry in fs::read_dir(clone_root).map_err(list_err)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "[HARVEST] Skipping unreadable clone root entry");
                continue;
            }
        };
        let hidden = entry.file_name().as_encoded_bytes().first() == Some(&b'.');
        if !hidden && entry.path().is_dir() {
            repositories.push(entry.path());
        }
    }
    repositories.sort();
    Ok(repositories)
}

async fn convert_all(
    repositories: &[PathBuf],
    output_dir: &Path,
    concurrency: usize,
) -> Vec<ConversionReport> {
    stream::iter(repositories.iter().cloned())
        .map(|repo| {
            let output_dir = output_dir.to_path_buf();
            async move {
                let repository = repo
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let result = tokio::task::spawn_blocking(move || {
                    convert::convert_repository(&repo, &output_dir)
                })
                .await;

                let status = match result {
                    Ok(Ok(ConversionOutcome::Written { artifact, records })) => {
                        ConversionStatus::Written { artifact, records }
                    }
                    Ok(Ok(ConversionOutcome::AlreadyConverted { artifact })) => {
                        ConversionStatus::AlreadyConverted { artifact }
                    }
                    Ok(Err(e)) => {
                        error!(repository = %repository, error = %e, "[HARVEST] Conversion failed");
                        ConversionStatus::Failed { reason: e.to_string() }
                    }
                    Err(e) => {
                        error!(
                            repository = %repository,
                            error = %e,
                            "[HARVEST] Conversion task aborted"
                        );
                        ConversionStatus::Failed { reason: e.to_string() }
                    }
                };
                ConversionReport { repository, status }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
