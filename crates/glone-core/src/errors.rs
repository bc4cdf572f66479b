//! Core error types for glone.

use std::path::PathBuf;

/// Configuration-specific errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required setting is still empty after merging all sources.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// The home directory could not be determined.
    #[error("failed to determine the home directory of the current user")]
    NoHomeDir,

    /// The credentials file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadNetrc {
        /// Path of the credentials file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The credentials file could not be tokenized.
    #[error("invalid .netrc at line {line}: {reason}")]
    InvalidNetrc {
        /// One-based line number.
        line: usize,
        /// What is wrong with the line.
        reason: &'static str,
    },

    /// The selected credentials entry lacks a login or password.
    #[error("incomplete credentials for {machine} in .netrc")]
    IncompleteNetrc {
        /// Machine label of the entry.
        machine: String,
    },
}
