//! # Companion Repository Checkout
//!
//! The native libraries come with headers that live in a separate source
//! repository. This module keeps a shallow checkout of that repository next to
//! the extracted libraries.
//!
//! ## Design
//!
//! Git access goes through the **`GitOperations`** trait. The application uses
//! `DefaultGitOperations`, which shells out to the `git` binary via
//! [`crate::git`]; tests swap in a mock that records clone calls without any
//! network access.
//!
//! [`CompanionRepository::ensure_checkout`] is idempotent: an existing
//! checkout is reused as-is and only a missing one triggers a clone. A clone
//! that fails part way (including its sparse path selection) removes what it
//! wrote, so the next run clones again instead of reusing an incomplete
//! checkout.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Shallow-clones `branch` of `url` into `target_dir`, optionally
    /// restricted to `sparse_paths`.
    fn clone_shallow(
        &self,
        url: &str,
        branch: &str,
        target_dir: &Path,
        sparse_paths: &[String],
    ) -> Result<()>;

    /// Whether `dir` already holds a checkout.
    fn is_checkout(&self, dir: &Path) -> bool;

    /// Branch currently checked out in `dir`.
    fn current_branch(&self, dir: &Path) -> Result<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_shallow(
        &self,
        url: &str,
        branch: &str,
        target_dir: &Path,
        sparse_paths: &[String],
    ) -> Result<()> {
        crate::git::clone_shallow(url, branch, target_dir, sparse_paths)
    }

    fn is_checkout(&self, dir: &Path) -> bool {
        crate::git::is_checkout(dir)
    }

    fn current_branch(&self, dir: &Path) -> Result<String> {
        crate::git::current_branch(dir)
    }
}

/// Which repository to check out, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionSpec {
    pub url: String,
    pub branch: String,
    pub dir: PathBuf,
    /// Restrict the checkout to these paths (empty means everything)
    pub sparse_paths: Vec<String>,
}

/// Result of [`CompanionRepository::ensure_checkout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CheckoutStatus {
    /// A fresh shallow clone was made
    Cloned { dir: PathBuf },
    /// An existing checkout was left untouched
    Reused { dir: PathBuf },
}

impl CheckoutStatus {
    pub fn dir(&self) -> &Path {
        match self {
            CheckoutStatus::Cloned { dir } | CheckoutStatus::Reused { dir } => dir,
        }
    }
}

/// Keeps the companion checkout in place.
pub struct CompanionRepository {
    git_ops: Box<dyn GitOperations>,
}

impl CompanionRepository {
    /// Creates a `CompanionRepository` backed by the system `git`.
    pub fn new() -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations),
        }
    }

    /// Creates a `CompanionRepository` with a custom `GitOperations`
    /// implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Clone the companion repository unless a checkout already exists.
    ///
    /// Reusing a checkout never touches the network. If the existing checkout
    /// is on a different branch a warning is logged; the checkout is still
    /// reused.
    pub fn ensure_checkout(&self, spec: &CompanionSpec) -> Result<CheckoutStatus> {
        if self.git_ops.is_checkout(&spec.dir) {
            match self.git_ops.current_branch(&spec.dir) {
                Ok(branch) if branch != spec.branch => log::warn!(
                    "{} is on branch {} but {} was requested; remove it to refetch",
                    spec.dir.display(),
                    branch,
                    spec.branch
                ),
                Ok(_) => {}
                Err(e) => log::debug!("Could not read branch of {}: {}", spec.dir.display(), e),
            }
            log::info!("Reusing existing checkout at {}", spec.dir.display());
            return Ok(CheckoutStatus::Reused {
                dir: spec.dir.clone(),
            });
        }

        log::info!(
            "Cloning {}@{} into {}",
            spec.url,
            spec.branch,
            spec.dir.display()
        );
        self.git_ops
            .clone_shallow(&spec.url, &spec.branch, &spec.dir, &spec.sparse_paths)?;
        Ok(CheckoutStatus::Cloned {
            dir: spec.dir.clone(),
        })
    }
}

impl Default for CompanionRepository {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::MockGitOperations;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spec(dir: PathBuf) -> CompanionSpec {
        CompanionSpec {
            url: "https://github.com/rapidsai/cudf.git".to_string(),
            branch: "branch-24.12".to_string(),
            dir,
            sparse_paths: vec![],
        }
    }

    #[test]
    fn test_clones_when_missing() {
        let temp = TempDir::new().unwrap();
        let git_ops = MockGitOperations::new();
        let clone_calls = git_ops.clone_calls.clone();
        let repo = CompanionRepository::with_operations(Box::new(git_ops));

        let dir = temp.path().join("cudf-repo");
        let status = repo.ensure_checkout(&spec(dir.clone())).unwrap();

        assert_eq!(status, CheckoutStatus::Cloned { dir: dir.clone() });
        let calls = clone_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "branch-24.12");
        assert_eq!(calls[0].2, dir);
    }

    #[test]
    fn test_second_call_reuses_checkout() {
        let temp = TempDir::new().unwrap();
        let git_ops = MockGitOperations::new();
        let clone_calls = git_ops.clone_calls.clone();
        let repo = CompanionRepository::with_operations(Box::new(git_ops));
        let s = spec(temp.path().join("cudf-repo"));

        repo.ensure_checkout(&s).unwrap();
        let second = repo.ensure_checkout(&s).unwrap();

        assert!(matches!(second, CheckoutStatus::Reused { .. }));
        assert_eq!(clone_calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_existing_checkout_never_clones() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("cudf-repo");
        fs::create_dir_all(dir.join(".git")).unwrap();

        let git_ops = MockGitOperations::failing();
        let clone_calls = git_ops.clone_calls.clone();
        let repo = CompanionRepository::with_operations(Box::new(git_ops));

        let status = repo.ensure_checkout(&spec(dir.clone())).unwrap();
        assert_eq!(status.dir(), dir.as_path());
        assert!(clone_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_directory_without_git_is_recloned() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("cudf-repo");
        fs::create_dir_all(dir.join("cpp")).unwrap();

        let git_ops = MockGitOperations::new();
        let clone_calls = git_ops.clone_calls.clone();
        let repo = CompanionRepository::with_operations(Box::new(git_ops));

        let status = repo.ensure_checkout(&spec(dir)).unwrap();
        assert!(matches!(status, CheckoutStatus::Cloned { .. }));
        assert_eq!(clone_calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_clone_error_propagates() {
        let temp = TempDir::new().unwrap();
        let repo = CompanionRepository::with_operations(Box::new(MockGitOperations::failing()));

        let result = repo.ensure_checkout(&spec(temp.path().join("cudf-repo")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Network error"));
    }
}
