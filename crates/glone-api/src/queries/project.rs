//! Project-related API queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Endpoint listing every project visible to the token.
pub const PROJECTS_PATH: &str = "projects";

/// A GitLab project, as returned by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Numeric project id, unique per instance.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Namespaced path, e.g. `group/subgroup/repo`.
    pub path_with_namespace: String,
    /// HTTP(S) clone URL.
    pub http_url_to_repo: String,
}

/// Append the projects from `extra` whose id is not already in `projects`.
///
/// Order is preserved and the first occurrence of an id wins. Returns the
/// number of projects added.
pub fn merge_unique(projects: &mut Vec<Project>, extra: Vec<Project>) -> usize {
    let mut seen: HashSet<u64> = projects.iter().map(|p| p.id).collect();
    let before = projects.len();
    projects.extend(extra.into_iter().filter(|p| seen.insert(p.id)));
    projects.len() - before
}
