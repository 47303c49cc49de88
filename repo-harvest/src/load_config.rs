/// `load_config` module: Loads a static YAML config, applies environment overrides and
/// adapts it into the core [`HarvestConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into type-safe structs
/// - Resolve the directory layout (`data_dir`, or explicit `clone_root` + `output_dir`)
/// - Apply `REPO_HARVEST_BASE_URL` / `REPO_HARVEST_LIMIT` from the environment
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{bail, Context, Result};
use repo_harvest_core::config::{HarvestConfig, DEFAULT_BASE_URL};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const BASE_URL_ENV: &str = "REPO_HARVEST_BASE_URL";
pub const LIMIT_ENV: &str = "REPO_HARVEST_LIMIT";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub manifest: PathBuf,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub clone_root: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl FileConfig {
    fn into_harvest_config(self) -> Result<HarvestConfig> {
        let config = match (self.data_dir, self.clone_root, self.output_dir) {
            (_, Some(clone_root), Some(output_dir)) => {
                HarvestConfig::new(self.manifest, clone_root, output_dir)
            }
            (Some(data_dir), None, None) => HarvestConfig::from_data_dir(self.manifest, &data_dir),
            _ => bail!("config must set either data_dir, or both clone_root and output_dir"),
        };
        Ok(config
            .with_limit(self.limit)
            .with_base_url(self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
            .with_concurrency(self.concurrency.unwrap_or(1)))
    }
}

fn apply_env_overrides(mut config: HarvestConfig) -> Result<HarvestConfig> {
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        info!(base_url = %base_url, "Base URL overridden from environment");
        config = config.with_base_url(base_url);
    }
    if let Ok(raw) = std::env::var(LIMIT_ENV) {
        let limit = raw
            .parse::<usize>()
            .with_context(|| format!("{LIMIT_ENV} must be a non-negative integer, got {raw:?}"))?;
        info!(limit, "Limit overridden from environment");
        config = config.with_limit(Some(limit));
    }
    Ok(config)
}

/// Loads a YAML config file and returns the merged [`HarvestConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HarvestConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: FileConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let config = apply_env_overrides(raw.into_harvest_config()?)?;
    config.trace_loaded();
    Ok(config)
}
