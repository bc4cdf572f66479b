//! Group-related API queries.

use serde::{Deserialize, Serialize};

/// A GitLab group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Numeric group id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Full path including parent groups, e.g. `platform/infra`.
    pub full_path: String,
}

/// Endpoint for a group looked up by id or path.
///
/// Nested paths are percent-encoded as a single segment, as GitLab requires.
pub fn group_path(group: &str) -> String {
    format!("groups/{}", urlencoding::encode(group))
}

/// Endpoint listing a group's projects.
pub fn group_projects_path(group_id: u64) -> String {
    format!("groups/{group_id}/projects")
}
