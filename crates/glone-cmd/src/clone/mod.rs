//! `glone clone` command.
//!
//! Enumerates GitLab projects and clones each one under the target
//! directory, mirroring the group hierarchy.

pub mod orchestrator;
pub mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use glone_api::Project;
use glone_core::config::{Config, resolve_target_dir};
use glone_core::ios_println;
use glone_git::Cloner;
use tracing::{error, info};

use crate::factory::Factory;
use orchestrator::{CloneOutcome, clone_project};
use summary::CloneSummary;

/// Clone every accessible project, or one group's projects.
#[derive(Debug, Args)]
pub struct CloneArgs {
    /// Directory to clone into (defaults to the current directory).
    #[arg(value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Clone repositories only from the specified group (full path, name, or ID).
    #[arg(long)]
    group: Option<String>,
}

/// Projects to clone and the configuration they were enumerated with.
#[derive(Debug)]
struct ClonePlan {
    config: Config,
    projects: Vec<Project>,
}

impl CloneArgs {
    /// Create arguments for a run.
    pub fn new(directory: Option<PathBuf>, group: Option<String>) -> Self {
        Self { directory, group }
    }

    /// Run the clone command with the system git.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let plan = self.prepare(factory).await?;
        let git = factory.git_client()?;
        clone_all(factory, &plan, git).await;
        Ok(())
    }

    /// Run the clone command with a given clone primitive and return the tally.
    ///
    /// # Errors
    ///
    /// Returns an error for anything that fails before the first clone:
    /// configuration, authentication, enumeration, or creating the target
    /// directory. Per-project failures are only counted.
    pub async fn execute<C: Cloner>(&self, factory: &Factory, cloner: &C) -> Result<CloneSummary> {
        let plan = self.prepare(factory).await?;
        Ok(clone_all(factory, &plan, cloner).await)
    }

    async fn prepare(&self, factory: &Factory) -> Result<ClonePlan> {
        let target =
            resolve_target_dir(self.directory.clone()).context("failed to get current directory")?;
        let config = factory.config(self.group.clone(), target)?;
        let gitlab = factory.gitlab(&config).await?;

        info!("Getting project list...");
        let projects = gitlab.enumerate(config.group()).await?;
        info!("Found projects: {}", projects.len());

        tokio::fs::create_dir_all(config.target_dir())
            .await
            .with_context(|| {
                format!(
                    "failed to create target directory {}",
                    config.target_dir().display()
                )
            })?;

        Ok(ClonePlan { config, projects })
    }
}

async fn clone_all<C: Cloner>(factory: &Factory, plan: &ClonePlan, cloner: &C) -> CloneSummary {
    let mut summary = CloneSummary::default();

    for project in &plan.projects {
        let outcome = clone_project(
            cloner,
            project,
            plan.config.target_dir(),
            plan.config.token(),
        )
        .await;
        if let CloneOutcome::Failed(ref e) = outcome {
            error!("{e:#}");
        }
        summary.record(&outcome);
    }

    info!("{summary}");
    let ios = &factory.io;
    ios_println!(ios, "{}", summary.render(&ios.color_scheme()));
    summary
}
