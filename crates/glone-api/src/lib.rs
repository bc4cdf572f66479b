//! GitLab REST client and project enumeration for glone.

pub mod client;
pub mod errors;
pub mod gitlab;
pub mod http;
pub mod queries;

pub use errors::ApiError;
pub use gitlab::{GitLab, GitLabOptions};
pub use queries::project::Project;
