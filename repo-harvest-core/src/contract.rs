//! # contract: collaborator interfaces for the harvest pipeline
//!
//! The orchestrator never shells out directly. Cloning goes through the [`Cloner`]
//! trait so tests can substitute a double that simulates successes and failures
//! without touching the network.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; with the `test-export-mocks` feature the
//!   generated `MockCloner` is exported for integration tests of dependent crates.

use async_trait::async_trait;
use std::path::PathBuf;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// One clone to perform: where from, and which directory to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    /// Manifest identifier, e.g. `octocat/hello-world`.
    pub identifier: String,
    /// Source URL constructed from the base URL and the identifier.
    pub url: String,
    /// Directory the clone must create. It does not exist when the request is made.
    pub target: PathBuf,
}

/// Typed result of a clone. A failure is a value, not an error: the batch carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    Cloned,
    Failed { reason: String },
}

/// Trait for materialising a remote repository into a local directory.
/// Implemented by [`crate::clone::GitCloner`] and by mocks in testing.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Cloner: Send + Sync {
    /// Clone `request.url` into `request.target`.
    ///
    /// A failed clone is expected to leave no directory behind so that a later run
    /// retries it.
    async fn clone_repository(&self, request: &CloneRequest) -> CloneOutcome;
}
