//! GitLab API resource types and endpoint paths.

pub mod group;
pub mod project;
pub mod user;
