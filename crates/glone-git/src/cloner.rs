//! The clone primitive used by the orchestrator.

use std::future::Future;
use std::path::Path;

use crate::errors::GitError;

/// Clones repositories and recognises existing clones.
///
/// [`GitClient`](crate::GitClient) implements this by running `git`; tests
/// substitute a stub.
pub trait Cloner {
    /// Whether `path` is the root of an existing local clone.
    ///
    /// `Ok(false)` means `path` is missing or definitely not a clone, so it
    /// may be replaced. Anything git cannot decide is an error.
    fn is_repository(&self, path: &Path) -> impl Future<Output = Result<bool, GitError>> + Send;

    /// Clone `url` into `dest`, which must not exist yet.
    fn clone_repository(
        &self,
        url: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<(), GitError>> + Send;
}
