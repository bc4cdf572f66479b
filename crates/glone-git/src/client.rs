//! Git client that wraps the git command-line tool.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::cloner::Cloner;
use crate::errors::GitError;

/// Name of the git directory or gitlink file in a checkout.
const DOT_GIT: &str = ".git";

/// Client for executing git commands.
#[derive(Debug, Clone)]
pub struct GitClient {
    /// Path to the git binary.
    git_path: PathBuf,
}

impl GitClient {
    /// Create a new git client using the system git.
    ///
    /// # Errors
    ///
    /// Returns an error if git is not found in PATH.
    pub fn new() -> Result<Self, GitError> {
        let git_path = which::which("git").map_err(|_| GitError::NotFound)?;
        Ok(Self { git_path })
    }

    /// Use a specific git binary.
    pub fn with_git_path(path: impl Into<PathBuf>) -> Self {
        Self {
            git_path: path.into(),
        }
    }

    /// Path of the git binary in use.
    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    /// Execute a git command in `dir` and return trimmed stdout.
    ///
    /// Runs with `LC_ALL=C` so failures can be classified by message, and
    /// with `safe.directory=*` so repositories owned by another user are
    /// still inspected.
    #[instrument(skip(self), fields(dir = %dir.display(), args = ?args))]
    async fn run_in(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new(&self.git_path)
            .args(["-c", "safe.directory=*"])
            .args(args)
            .current_dir(dir)
            .env("LC_ALL", "C")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let command = args.first().copied().unwrap_or("").to_string();
            return Err(GitError::CommandFailed {
                command,
                message: stderr.trim().to_string(),
                exit_code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Root of the repository enclosing `dir`.
    ///
    /// For a checkout this is the work tree, which also covers linked
    /// worktrees, submodules and clones with a separate git directory. For a
    /// bare repository it is the git directory itself.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not inside a repository or git cannot
    /// inspect it.
    pub async fn repository_root(&self, dir: &Path) -> Result<PathBuf, GitError> {
        let bare = self
            .run_in(dir, &["rev-parse", "--is-bare-repository"])
            .await?;
        let root = if bare == "true" {
            self.run_in(dir, &["rev-parse", "--absolute-git-dir"]).await?
        } else {
            self.run_in(dir, &["rev-parse", "--show-toplevel"]).await?
        };
        Ok(PathBuf::from(root))
    }
}

impl Cloner for GitClient {
    async fn is_repository(&self, path: &Path) -> Result<bool, GitError> {
        let dir = match tokio::fs::canonicalize(path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if !tokio::fs::metadata(&dir).await?.is_dir() {
            return Ok(false);
        }

        match self.repository_root(&dir).await {
            Ok(root) => Ok(tokio::fs::canonicalize(&root).await? == dir),
            Err(e) if e.is_not_repository() => {
                // A `.git` entry git cannot open, such as a dangling gitlink.
                if tokio::fs::symlink_metadata(dir.join(DOT_GIT)).await.is_ok() {
                    return Err(e);
                }
                debug!(path = %dir.display(), "not a git repository");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // The URL may carry a token, so it is kept out of spans and logs.
    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        debug!(dest = %dest.display(), "running git clone");

        let status = Command::new(&self.git_path)
            .arg("clone")
            .arg("--progress")
            .arg(url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(GitError::CommandFailed {
                command: "clone".to_string(),
                message: status.to_string(),
                exit_code: status.code(),
            });
        }

        Ok(())
    }
}
