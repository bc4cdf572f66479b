//! Git-related error types.

/// Errors from git operations.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// Git command failed with an exit code.
    #[error("git {command} failed: {message}")]
    CommandFailed {
        /// The git subcommand that failed.
        command: String,
        /// Error message from stderr or the exit status.
        message: String,
        /// Process exit code, if available.
        exit_code: Option<i32>,
    },

    /// Git binary not found.
    #[error("git executable not found in PATH")]
    NotFound,

    /// I/O error from subprocess.
    #[error("git IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Whether git refused because the directory is not inside a repository.
    ///
    /// Relies on git's message, so commands must run with `LC_ALL=C`.
    pub fn is_not_repository(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { message, .. } if message.contains("not a git repository")
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_should_display_command_failed() {
        let err = GitError::CommandFailed {
            command: "clone".to_string(),
            message: "exit status: 128".to_string(),
            exit_code: Some(128),
        };
        assert_eq!(err.to_string(), "git clone failed: exit status: 128");
    }

    #[test]
    fn test_should_display_not_found() {
        assert!(GitError::NotFound.to_string().contains("not found"));
    }

    #[rstest]
    #[case("fatal: not a git repository (or any of the parent directories): .git", true)]
    #[case("fatal: not a git repository: /srv/main/.git/worktrees/wt", true)]
    #[case("fatal: detected dubious ownership in repository at '/srv/g/p'", false)]
    #[case("fatal: this operation must be run in a work tree", false)]
    fn test_should_recognise_not_a_repository(#[case] stderr: &str, #[case] expected: bool) {
        let err = GitError::CommandFailed {
            command: "rev-parse".to_string(),
            message: stderr.to_string(),
            exit_code: Some(128),
        };
        assert_eq!(err.is_not_repository(), expected);
    }

    #[test]
    fn test_should_not_treat_io_error_as_not_a_repository() {
        let err: GitError = std::io::Error::other("spawn failed").into();
        assert!(!err.is_not_repository());
    }

    #[test]
    fn test_should_convert_io_error() {
        let git_err: GitError = std::io::Error::other("test").into();
        assert!(matches!(git_err, GitError::Io(_)));
    }
}
