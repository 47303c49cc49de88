//! # document: one structured record per eligible file
//!
//! [`build_document`] combines the classifier, the decoder and filesystem metadata.
//! Ineligible files come back as [`FileOutcome::Excluded`]; only failures to stat or
//! read the file surface as `Err`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::classify::{self, Category};
use crate::decode::{self, DecodeError};

/// The unit of output: one JSON line in a repository's artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub text: String,
    pub file_extension: String,
    pub category: Category,
    pub line_count: u64,
    pub size_in_bytes: u64,
    pub path: String,
}

/// Why a file produced no record.
#[derive(Debug, PartialEq, Eq)]
pub enum Exclusion {
    /// Neither the extension nor the file name is in the classifier tables.
    Unsupported,
    /// The bytes did not decode under the inferred encoding.
    Undecodable(DecodeError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Eligible(DocumentRecord),
    Excluded(Exclusion),
}

/// Newline separators plus one, so empty text counts as a single line.
pub fn line_count(text: &str) -> u64 {
    text.bytes().filter(|b| *b == b'\n').count() as u64 + 1
}

/// Build the record for the file at `path`.
pub fn build_document(path: &Path) -> io::Result<FileOutcome> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(category) = classify::classify(&file_name) else {
        debug!(path = %path.display(), "Unsupported file type, excluding");
        return Ok(FileOutcome::Excluded(Exclusion::Unsupported));
    };

    let bytes = fs::read(path)?;
    let decoded = match decode::decode_bytes(&bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Undecodable file, excluding");
            return Ok(FileOutcome::Excluded(Exclusion::Undecodable(e)));
        }
    };

    // Size comes from the filesystem so it reflects the original bytes, not the decoded text.
    let size_in_bytes = fs::metadata(path)?.len();
    let full_path = path.to_string_lossy().into_owned();

    Ok(FileOutcome::Eligible(DocumentRecord {
        id: full_path.clone(),
        line_count: line_count(&decoded.text),
        text: decoded.text,
        file_extension: classify::extension_of(&file_name),
        category,
        size_in_bytes,
        path: full_path,
    }))
}
