//! Git command wrapper and clone primitive for glone.

pub mod auth_url;
pub mod client;
pub mod cloner;
pub mod errors;

pub use client::GitClient;
pub use cloner::Cloner;
pub use errors::GitError;
