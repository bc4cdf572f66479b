//! Per-project clone logic.

use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use glone_api::Project;
use glone_git::Cloner;
use glone_git::auth_url::authenticated_url;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

/// Result of processing one project.
#[derive(Debug)]
pub enum CloneOutcome {
    /// A valid clone was already present; nothing was touched.
    Skipped,
    /// The project was cloned.
    Cloned,
    /// The project could not be cloned.
    Failed(anyhow::Error),
}

/// Local path for a project: `target` joined with its namespaced path.
///
/// # Errors
///
/// Returns an error if the namespaced path is absolute or climbs out of
/// `target`.
pub fn destination(target: &Path, project: &Project) -> Result<PathBuf> {
    let relative = Path::new(&project.path_with_namespace);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !contained || relative.as_os_str().is_empty() {
        bail!(
            "refusing to clone {} outside the target directory",
            project.path_with_namespace
        );
    }
    Ok(target.join(relative))
}

/// Clone one project under `target`, skipping existing clones.
///
/// Every failure is folded into [`CloneOutcome::Failed`].
pub async fn clone_project<C: Cloner>(
    cloner: &C,
    project: &Project,
    target: &Path,
    token: &SecretString,
) -> CloneOutcome {
    match try_clone(cloner, project, target, token).await {
        Ok(outcome) => outcome,
        Err(e) => CloneOutcome::Failed(e),
    }
}

async fn try_clone<C: Cloner>(
    cloner: &C,
    project: &Project,
    target: &Path,
    token: &SecretString,
) -> Result<CloneOutcome> {
    let dest = destination(target, project)?;

    let existing = cloner
        .is_repository(&dest)
        .await
        .with_context(|| format!("failed to inspect {}", dest.display()))?;
    if existing {
        warn!(
            "Project {} already exists in {}, skipping",
            project.name,
            dest.display()
        );
        return Ok(CloneOutcome::Skipped);
    }

    if tokio::fs::symlink_metadata(&dest).await.is_ok() {
        warn!(
            "Directory {} exists but is not a git repository, removing",
            dest.display()
        );
        remove_path(&dest)
            .await
            .with_context(|| format!("failed to remove {}", dest.display()))?;
    }

    let url = authenticated_url(&project.http_url_to_repo, token.expose_secret());

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create parent directory {}", parent.display()))?;
    }

    info!("Cloning {} to {}", project.name, dest.display());
    if let Err(e) = cloner.clone_repository(&url, &dest).await {
        if let Err(cleanup) = remove_path(&dest).await
            && cleanup.kind() != io::ErrorKind::NotFound
        {
            warn!("Failed to remove partial clone {}: {cleanup}", dest.display());
        }
        return Err(anyhow::Error::new(e).context(format!("error cloning {}", project.name)));
    }

    info!("Successfully cloned: {}", project.name);
    Ok(CloneOutcome::Cloned)
}

/// Remove a directory tree or a single file.
async fn remove_path(path: &Path) -> io::Result<()> {
    let meta = tokio::fs::symlink_metadata(path).await?;
    if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    }
}
