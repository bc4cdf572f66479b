//! Core types and utilities for glone.
//!
//! This crate provides the foundational pieces used across all glone crates:
//! - [`Config`] and the [`CredentialResolver`] that builds it from flags,
//!   environment variables, and `~/.netrc`
//! - [`IOStreams`] for capturable terminal output
//! - GitLab host helpers in [`instance`]

pub mod config;
pub mod errors;
pub mod instance;
pub mod iostreams;
#[cfg(test)]
pub mod test_utils;

pub use config::{Config, CredentialResolver, Credentials};
pub use errors::ConfigError;
pub use iostreams::IOStreams;
