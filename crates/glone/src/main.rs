//! glone - clone GitLab projects in bulk.
//!
//! Lists every project the token can see (or one group's projects) and
//! clones each under a target directory, mirroring the group hierarchy.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use glone_api::ApiError;
use glone_cmd::factory::Factory;
use glone_core::config::Credentials;

/// Exit codes.
mod exit_codes {
    pub const OK: i32 = 0;
    pub const ERROR: i32 = 1;
    pub const AUTH: i32 = 4;
}

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "GLONE_LOG";

/// glone - clone GitLab projects in bulk.
#[derive(Debug, Parser)]
#[command(
    name = "glone",
    version,
    about = "Clone GitLab projects in bulk",
    long_about = "Clone every GitLab project you can reach, or one group's projects, \
                  into a directory tree that mirrors the group hierarchy."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Connection settings shared by all commands.
#[derive(Debug, Args)]
struct GlobalArgs {
    /// GitLab host, e.g. gitlab.com.
    #[arg(long, env = "GITLAB_HOST", global = true)]
    gitlab_host: Option<String>,

    /// GitLab user name.
    #[arg(long, env = "GITLAB_USER", global = true)]
    gitlab_user: Option<String>,

    /// GitLab personal access token.
    #[arg(long, env = "GITLAB_TOKEN", global = true, hide_env_values = true)]
    gitlab_token: Option<String>,

    /// Credentials file used when a setting above is missing.
    #[arg(long, env = "GLONE_NETRC", global = true, value_name = "PATH")]
    netrc_file: Option<PathBuf>,
}

impl GlobalArgs {
    fn credentials(&self) -> Credentials {
        Credentials::new(
            self.gitlab_host.clone().unwrap_or_default(),
            self.gitlab_user.clone().unwrap_or_default(),
            self.gitlab_token.clone().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clone GitLab projects into a directory.
    Clone(glone_cmd::clone::CloneArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut factory = Factory::new(env!("CARGO_PKG_VERSION").to_string())
        .with_credentials(cli.global.credentials());
    if let Some(ref path) = cli.global.netrc_file {
        factory = factory.with_netrc_path(path);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(factory.io.is_stderr_tty())
        .init();

    let exit_code = if let Some(cmd) = cli.command {
        match run_command(cmd, &factory).await {
            Ok(()) => exit_codes::OK,
            Err(e) => {
                tracing::error!("{e:#}");
                exit_code_for(&e)
            }
        }
    } else {
        use clap::CommandFactory;
        Cli::command().print_help().ok();
        println!();
        exit_codes::OK
    };

    std::process::exit(exit_code);
}

async fn run_command(cmd: Commands, factory: &Factory) -> anyhow::Result<()> {
    match cmd {
        Commands::Clone(args) => args.run(factory).await,
    }
}

fn exit_code_for(e: &anyhow::Error) -> i32 {
    let auth_failed = e.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ApiError>(),
            Some(ApiError::Authentication { .. })
        )
    });
    if auth_failed {
        exit_codes::AUTH
    } else {
        exit_codes::ERROR
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn test_should_map_authentication_error_to_auth_exit_code() {
        let err = anyhow::Error::new(ApiError::authentication(ApiError::Http {
            status: 401,
            message: "401 Unauthorized".to_string(),
        }));
        assert_eq!(exit_code_for(&err), exit_codes::AUTH);
    }

    #[test]
    fn test_should_map_wrapped_authentication_error() {
        let err: anyhow::Result<()> =
            Err(ApiError::authentication(ApiError::GroupNotFound("x".to_string())).into());
        let err = err.context("connecting").unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::AUTH);
    }

    #[test]
    fn test_should_map_other_errors_to_generic_exit_code() {
        let err = anyhow::Error::new(ApiError::GroupNotFound("platform".to_string()));
        assert_eq!(exit_code_for(&err), exit_codes::ERROR);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), exit_codes::ERROR);
    }

    #[test]
    fn test_should_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "glone",
            "clone",
            "out",
            "--group",
            "platform/infra",
            "--gitlab-host",
            "gitlab.example.com",
        ])
        .unwrap();
        assert_eq!(cli.global.gitlab_host.as_deref(), Some("gitlab.example.com"));
        assert!(matches!(cli.command, Some(Commands::Clone(_))));
    }

    #[test]
    fn test_should_verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
