use async_trait::async_trait;
use std::fs;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::contract::{CloneOutcome, CloneRequest, Cloner};

/// Clones with the `git` command-line client.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: String,
}

impl GitCloner {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cloner for GitCloner {
    async fn clone_repository(&self, request: &CloneRequest) -> CloneOutcome {
        debug!(url = %request.url, target = %request.target.display(), "Launching git clone");

        // `git clone <url> <target>`
        let status = Command::new(&self.program)
            .arg("clone")
            .arg("--quiet")
            .arg(&request.url)
            .arg(&request.target)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .status()
            .await;

        match status {
            Ok(s) if s.success() => {
                info!(
                    identifier = %request.identifier,
                    path = %request.target.display(),
                    "Successfully cloned git repository"
                );
                CloneOutcome::Cloned
            }
            Ok(s) => {
                error!(
                    identifier = %request.identifier,
                    url = %request.url,
                    "Git exited with non-zero code: {}", s
                );
                // git normally cleans up after itself; make sure a retry is not mistaken for a hit.
                if request.target.exists() {
                    if let Err(e) = fs::remove_dir_all(&request.target) {
                        error!(
                            error = ?e,
                            path = %request.target.display(),
                            "Failed to remove partial clone"
                        );
                    }
                }
                CloneOutcome::Failed {
                    reason: format!("git exited with {s}"),
                }
            }
            Err(e) => {
                error!(
                    error = ?e,
                    identifier = %request.identifier,
                    "Failed to launch git process"
                );
                CloneOutcome::Failed {
                    reason: format!("failed to launch {}: {e}", self.program),
                }
            }
        }
    }
}
