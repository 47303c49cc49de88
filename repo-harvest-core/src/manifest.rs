//! # manifest: repository identifiers driving a harvest
//!
//! A manifest is line-delimited JSON where every non-blank line is a string such as
//! `"owner/repo"`. It is read in full before any work starts, so a missing or
//! malformed manifest aborts the run up front.

use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest {path} not found")]
    NotFound { path: PathBuf },
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("manifest {path} line {line}: expected a JSON string: {source}")]
    InvalidLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+(/[A-Za-z0-9_.-]+)*$").expect("identifier pattern is valid")
});

/// A repository identifier in `owner/name` form, taken verbatim from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceManifestEntry {
    identifier: String,
}

impl SourceManifestEntry {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Local directory name for the clone: the last `/`-separated segment.
    pub fn derived_name(&self) -> &str {
        self.identifier
            .rsplit('/')
            .next()
            .unwrap_or(&self.identifier)
    }

    /// Whether the identifier is safe to turn into a URL and a directory name.
    pub fn is_valid(&self) -> bool {
        IDENTIFIER.is_match(&self.identifier)
            && self
                .identifier
                .split('/')
                .all(|segment| segment != "." && segment != "..")
    }

    /// `<base_url>/<identifier>`, tolerating a trailing slash on the base.
    pub fn source_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.identifier)
    }
}

/// Parse manifest text. `path` is only used in error messages.
pub fn parse_manifest(
    content: &str,
    path: &Path,
) -> Result<Vec<SourceManifestEntry>, ManifestError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<String>(line)
                .map(SourceManifestEntry::new)
                .map_err(|source| ManifestError::InvalidLine {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                })
        })
        .collect()
}

/// Read the manifest at `path`, keeping at most `limit` entries.
pub fn read_manifest(
    path: &Path,
    limit: Option<usize>,
) -> Result<Vec<SourceManifestEntry>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = parse_manifest(&content, path)?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    info!(manifest = %path.display(), entries = entries.len(), "Loaded manifest");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_name_is_last_segment() {
        assert_eq!(SourceManifestEntry::new("octocat/hello-world").derived_name(), "hello-world");
        assert_eq!(SourceManifestEntry::new("solo").derived_name(), "solo");
    }

    #[test]
    fn validation_rejects_traversal_and_shell_characters() {
        assert!(SourceManifestEntry::new("NVIDIA/NeMo-Curator").is_valid());
        assert!(SourceManifestEntry::new("owner/repo.rs").is_valid());
        assert!(!SourceManifestEntry::new("owner/..").is_valid());
        assert!(!SourceManifestEntry::new("owner/repo; rm -rf /").is_valid());
        assert!(!SourceManifestEntry::new("owner/").is_valid());
        assert!(!SourceManifestEntry::new("").is_valid());
    }

    #[test]
    fn source_url_trims_trailing_slash() {
        let entry = SourceManifestEntry::new("octocat/hello-world");
        assert_eq!(
            entry.source_url("https://github.com/"),
            "https://github.com/octocat/hello-world"
        );
    }

    #[test]
    fn parse_reports_line_numbers_and_skips_blanks() {
        let entries = parse_manifest("\"a/b\"\n\n\"c/d\"\n", Path::new("m.jsonl")).unwrap();
        assert_eq!(entries.len(), 2);

        let err = parse_manifest("\"a/b\"\nnot-json\n", Path::new("m.jsonl")).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidLine { line: 2, .. }));
    }
}
