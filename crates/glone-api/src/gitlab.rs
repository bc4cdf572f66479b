//! GitLab facade used by the clone command.
//!
//! Authenticates once, then enumerates either one group's projects
//! (subgroups included) or every project the token can see.

use secrecy::SecretString;
use tracing::{info, warn};

use crate::client::Client;
use crate::errors::ApiError;
use crate::queries::group::{self, Group};
use crate::queries::project::{self, PROJECTS_PATH, Project};
use crate::queries::user::{CURRENT_USER_PATH, CurrentUser};

/// Below this many projects the full listing is topped up with a
/// `membership=true` pass.
pub const MEMBERSHIP_THRESHOLD: usize = 200;

/// Options for [`GitLab::connect`].
#[derive(Debug, Clone, Default)]
pub struct GitLabOptions {
    /// Overrides `https://{host}/api/v4/`.
    pub base_url: Option<String>,
    /// Skip the `GET /user` identity check.
    pub skip_auth: bool,
}

/// Authenticated access to the GitLab endpoints glone needs.
#[derive(Debug, Clone)]
pub struct GitLab {
    client: Client,
}

impl GitLab {
    /// Wrap an existing client without checking credentials.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for `host` and verify the token against `GET /user`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] if the identity check fails.
    pub async fn connect(
        http: reqwest::Client,
        host: &str,
        token: SecretString,
        opts: GitLabOptions,
    ) -> Result<Self, ApiError> {
        let mut client = Client::new(http, host, token);
        if let Some(url) = opts.base_url {
            client = client.with_url_override(url);
        }
        let gitlab = Self::new(client);

        if !opts.skip_auth {
            let user = gitlab
                .current_user()
                .await
                .map_err(ApiError::authentication)?;
            info!(
                "Authenticated as: {} ({})",
                user.username,
                user.display_email()
            );
        }

        Ok(gitlab)
    }

    /// Fetch the authenticated user.
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.client.get(CURRENT_USER_PATH, &[]).await
    }

    /// Look up a group by full path, name, or id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::GroupNotFound`] when the API answers 404.
    pub async fn group(&self, name: &str) -> Result<Group, ApiError> {
        self.client
            .get(&group::group_path(name), &[])
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ApiError::GroupNotFound(name.to_string())
                } else {
                    e
                }
            })
    }

    /// List projects for `group`, or every accessible project when `None`.
    ///
    /// Projects come back in API order; nothing is re-sorted.
    pub async fn enumerate(&self, group: Option<&str>) -> Result<Vec<Project>, ApiError> {
        match group {
            Some(name) => self.group_projects(name).await,
            None => self.all_projects().await,
        }
    }

    async fn group_projects(&self, name: &str) -> Result<Vec<Project>, ApiError> {
        let group = self.group(name).await?;
        info!(
            "Found group: {} (ID: {}, Path: {})",
            group.name, group.id, group.full_path
        );

        let path = group::group_projects_path(group.id);
        info!(
            "Fetching projects for group ID: {} (include_subgroups: true)",
            group.id
        );
        let mut projects: Vec<Project> = self
            .client
            .paginate(&path, &[("include_subgroups", "true")])
            .await?;
        info!(
            "Total projects found in group (including subgroups): {}",
            projects.len()
        );

        if projects.is_empty() {
            warn!("No projects found with subgroups, trying without include_subgroups...");
            let (direct, err) = self
                .client
                .paginate_partial(&path, &[("include_subgroups", "false")])
                .await;
            if let Some(e) = err {
                warn!("Error getting projects without subgroups: {e}");
            }
            projects.extend(direct);
            info!(
                "Total projects found in group (without subgroups): {}",
                projects.len()
            );
        }

        Ok(projects)
    }

    async fn all_projects(&self) -> Result<Vec<Project>, ApiError> {
        info!("Fetching all accessible projects...");
        let mut projects: Vec<Project> = self.client.paginate(PROJECTS_PATH, &[]).await?;
        info!("No more pages. Total projects: {}", projects.len());

        if projects.len() < MEMBERSHIP_THRESHOLD {
            warn!(
                "Only found {} projects, trying with membership=true to get member projects...",
                projects.len()
            );
            let (members, err) = self
                .client
                .paginate_partial(PROJECTS_PATH, &[("membership", "true")])
                .await;
            if let Some(e) = err {
                warn!("Error getting member projects: {e}");
            }
            project::merge_unique(&mut projects, members);
            info!(
                "After adding member projects: {} total projects",
                projects.len()
            );
        }

        Ok(projects)
    }
}
