//! # convert: repository tree -> line-delimited JSON artifact
//!
//! One artifact per repository, named `<repo>.jsonl` inside the output directory.
//! An existing artifact marks the repository as converted and nothing is read.
//!
//! The walk skips every hidden entry (name starting with `.`), and with it everything
//! below a hidden directory such as `.git`. Records are buffered in memory and published
//! only once the walk has finished: they are written to a temp file in the output
//! directory and renamed into place without clobbering, so readers never see a partial
//! artifact and two concurrent writers cannot both publish.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::document::{self, DocumentRecord, FileOutcome};

pub const ARTIFACT_EXTENSION: &str = "jsonl";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("repository path {0} has no usable directory name")]
    InvalidRepository(PathBuf),
    #[error("failed to resolve repository path {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk repository {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("output directory {path} unavailable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialise record for {path}: {source}")]
    Serialise {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a call to [`convert_repository`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The artifact already existed; no file was read.
    AlreadyConverted { artifact: PathBuf },
    /// A new artifact was published with `records` lines.
    Written { artifact: PathBuf, records: usize },
}

/// Path of the artifact for the repository rooted at `repo_root`.
pub fn artifact_path(repo_root: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError> {
    let name = repo_root
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ConvertError::InvalidRepository(repo_root.to_path_buf()))?;
    Ok(output_dir.join(format!("{name}.{ARTIFACT_EXTENSION}")))
}

fn is_hidden(entry: &DirEntry) -> bool {
    // The root itself is never filtered, whatever it is called.
    entry.depth() > 0 && entry.file_name().as_encoded_bytes().first() == Some(&b'.')
}

/// Walk `repo_root` and collect a record for every eligible visible file.
///
/// A file that cannot be read is logged and left out. A directory that cannot be
/// listed (the root included) fails the whole walk, so no incomplete artifact is
/// ever published for the repository.
///
/// Symbolic links are not followed. A link to a file or a directory yields no record,
/// so nothing outside `repo_root` is read.
pub fn collect_documents(repo_root: &Path) -> Result<Vec<DocumentRecord>, ConvertError> {
    let mut records = Vec::new();

    let walker = WalkDir::new(repo_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|source| ConvertError::Walk {
            path: repo_root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        match document::build_document(entry.path()) {
            Ok(FileOutcome::Eligible(record)) => records.push(record),
            Ok(FileOutcome::Excluded(_)) => {}
            Err(e) => {
                warn!(error = %e, path = %entry.path().display(), "Failed to read file, excluding");
            }
        }
    }

    Ok(records)
}

/// Convert one repository into its artifact unless it has been converted already.
pub fn convert_repository(
    repo_root: &Path,
    output_dir: &Path,
) -> Result<ConversionOutcome, ConvertError> {
    // Record ids are full paths, whatever form the caller used.
    let repo_root = std::path::absolute(repo_root).map_err(|source| ConvertError::Resolve {
        path: repo_root.to_path_buf(),
        source,
    })?;
    let artifact = artifact_path(&repo_root, output_dir)?;

    if artifact.exists() {
        info!(artifact = %artifact.display(), "Repository already converted, skipping");
        return Ok(ConversionOutcome::AlreadyConverted { artifact });
    }

    info!(repo = %repo_root.display(), "Converting repository to JSONL");
    let records = collect_documents(&repo_root)?;

    fs::create_dir_all(output_dir).map_err(|source| ConvertError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    if publish(&records, &artifact, output_dir)? {
        info!(artifact = %artifact.display(), records = records.len(), "Wrote artifact");
        Ok(ConversionOutcome::Written {
            artifact,
            records: records.len(),
        })
    } else {
        debug!(artifact = %artifact.display(), "Artifact published concurrently, discarding ours");
        Ok(ConversionOutcome::AlreadyConverted { artifact })
    }
}

/// Write `records` to a temp file and rename it to `artifact` without replacing an
/// existing file. Returns `false` when another writer got there first.
fn publish(
    records: &[DocumentRecord],
    artifact: &Path,
    output_dir: &Path,
) -> Result<bool, ConvertError> {
    let write_err = |source: io::Error| ConvertError::Write {
        path: artifact.to_path_buf(),
        source,
    };

    let tmp = NamedTempFile::new_in(output_dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        for record in records {
            serde_json::to_writer(&mut writer, record).map_err(|source| {
                ConvertError::Serialise {
                    path: record.path.clone(),
                    source,
                }
            })?;
            writer.write_all(b"\n").map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;
    }
    tmp.as_file().sync_all().map_err(write_err)?;

    match tmp.persist_noclobber(artifact) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(write_err(e.error)),
    }
}
