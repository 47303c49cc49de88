use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://github.com";

/// Everything a harvest run needs to know.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Line-delimited JSON list of repository identifiers.
    pub manifest_path: PathBuf,
    /// Directory holding one clone per repository.
    pub clone_root: PathBuf,
    /// Directory receiving one `.jsonl` artifact per repository.
    pub output_dir: PathBuf,
    /// Only the first `limit` manifest entries are processed.
    pub limit: Option<usize>,
    pub base_url: String,
    /// Clones and conversions in flight at once. 1 keeps the run sequential.
    pub concurrency: usize,
}

impl HarvestConfig {
    pub fn new(manifest_path: PathBuf, clone_root: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            manifest_path,
            clone_root,
            output_dir,
            limit: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            concurrency: 1,
        }
    }

    /// Lay out clones under `<data_dir>/repos` and artifacts under `<data_dir>/jsonl`.
    pub fn from_data_dir(manifest_path: PathBuf, data_dir: &Path) -> Self {
        Self::new(manifest_path, data_dir.join("repos"), data_dir.join("jsonl"))
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn trace_loaded(&self) {
        info!(
            manifest = %self.manifest_path.display(),
            clone_root = %self.clone_root.display(),
            output_dir = %self.output_dir.display(),
            limit = ?self.limit,
            concurrency = self.concurrency,
            "Loaded HarvestConfig"
        );
        debug!(?self, "HarvestConfig loaded (full debug)");
    }
}
