//! Factory for shared command dependencies.
//!
//! Holds the I/O streams, the explicit credentials from flags or the
//! environment, and the `.netrc` loader. Supports test mode with dependency
//! injection for isolated testing.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Context;
use glone_api::{GitLab, GitLabOptions};
use glone_core::config::{Config, CredentialResolver, Credentials, NetrcLoader};
use glone_core::iostreams::{IOStreams, TestOutput};
use glone_git::GitClient;

/// Shared factory providing dependencies to commands.
///
/// In production mode, dependencies are created from the real system.
/// In test mode, dependencies can be injected for isolated testing.
pub struct Factory {
    /// Application version.
    pub app_version: String,
    /// I/O streams.
    pub io: IOStreams,
    /// Explicit credentials from flags or environment (possibly incomplete).
    credentials: Credentials,
    /// `.netrc` fallback loader.
    netrc: NetrcLoader,
    /// Git client (lazily loaded).
    git_client: OnceLock<GitClient>,

    // Test overrides
    http_override: Option<reqwest::Client>,
    api_url_override: Option<String>,
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("app_version", &self.app_version)
            .field("netrc", &self.netrc)
            .finish_non_exhaustive()
    }
}

impl Factory {
    /// Create a new factory with the given version.
    pub fn new(app_version: String) -> Self {
        Self::with_io(app_version, IOStreams::system())
    }

    fn with_io(app_version: String, io: IOStreams) -> Self {
        Self {
            app_version,
            io,
            credentials: Credentials::empty(),
            netrc: NetrcLoader::new(),
            git_client: OnceLock::new(),
            http_override: None,
            api_url_override: None,
        }
    }

    /// Create a test factory with captured I/O.
    ///
    /// Returns the factory and a `TestOutput` for reading captured
    /// stdout/stderr.
    pub fn test() -> (Self, TestOutput) {
        let (io, output) = IOStreams::test_with_output();
        (Self::with_io("test".to_string(), io), output)
    }

    /// Set the explicit credentials taken from flags or the environment.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Read the `.netrc` fallback from a custom path.
    #[must_use]
    pub fn with_netrc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.netrc = self.netrc.with_path(path);
        self
    }

    /// Set a custom reqwest HTTP client (e.g., backed by wiremock).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_override = Some(client);
        self
    }

    /// Set an API URL override (wiremock server URI with trailing slash).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url_override = Some(url.into());
        self
    }

    /// Merge explicit credentials with `.netrc` and validate them into a
    /// run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `.netrc` cannot be used or a required value is
    /// still missing.
    pub fn config(&self, group: Option<String>, target_dir: PathBuf) -> anyhow::Result<Config> {
        let resolver = CredentialResolver::new(self.netrc.clone());
        let credentials = resolver
            .resolve(self.credentials.clone())
            .context("error loading .netrc")?;
        Config::new(credentials, group, target_dir).context(
            "configuration error (set --gitlab-host, --gitlab-user and --gitlab-token or configure .netrc)",
        )
    }

    /// Get the git client.
    ///
    /// # Errors
    ///
    /// Returns an error if git is not available.
    pub fn git_client(&self) -> anyhow::Result<&GitClient> {
        if let Some(client) = self.git_client.get() {
            return Ok(client);
        }
        let client = GitClient::new()?;
        let _ = self.git_client.set(client);
        self.git_client
            .get()
            .ok_or_else(|| anyhow::anyhow!("failed to initialize git client"))
    }

    /// Build an authenticated GitLab client for the configured host.
    ///
    /// In test mode, uses the injected HTTP client and URL override.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or authentication fails.
    pub async fn gitlab(&self, config: &Config) -> anyhow::Result<GitLab> {
        let http = if let Some(ref client) = self.http_override {
            client.clone()
        } else {
            let opts = glone_api::http::HttpClientOptions {
                app_version: self.app_version.clone(),
            };
            glone_api::http::build_client(&opts)?
        };

        let opts = GitLabOptions {
            base_url: self.api_url_override.clone(),
            skip_auth: false,
        };
        let gitlab = GitLab::connect(http, config.host(), config.token().clone(), opts).await?;
        Ok(gitlab)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use glone_core::errors::ConfigError;
    use secrecy::ExposeSecret;

    use super::*;

    fn netrc_file(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".netrc");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_should_build_config_from_explicit_credentials() {
        let (dir, path) = netrc_file("");
        let (factory, _output) = Factory::test();
        let factory = factory
            .with_credentials(Credentials::new("GitLab.example.com", "alice", "tok"))
            .with_netrc_path(&path);

        let config = factory
            .config(Some("platform".to_string()), dir.path().to_path_buf())
            .unwrap();
        assert_eq!(config.host(), "gitlab.example.com");
        assert_eq!(config.group(), Some("platform"));
        assert_eq!(config.target_dir(), dir.path());
    }

    #[test]
    fn test_should_fill_gaps_from_netrc() {
        let (_dir, path) = netrc_file("machine gitlab.corp.io login bob password glpat-x\n");
        let (factory, _output) = Factory::test();
        let factory = factory
            .with_credentials(Credentials::new("", "alice", ""))
            .with_netrc_path(&path);

        let config = factory.config(None, PathBuf::from("out")).unwrap();
        assert_eq!(config.host(), "gitlab.corp.io");
        assert_eq!(config.user(), "alice");
        assert_eq!(config.token().expose_secret(), "glpat-x");
        assert_eq!(config.target_dir(), Path::new("out"));
    }

    #[test]
    fn test_should_fail_when_required_value_missing() {
        let (_dir, path) = netrc_file("machine github.com login a password b\n");
        let (factory, _output) = Factory::test();
        let factory = factory.with_netrc_path(&path);

        let err = factory.config(None, PathBuf::from(".")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Missing("GitLab host"))
        ));
        assert!(format!("{err:#}").contains("missing required configuration: GitLab host"));
    }

    #[test]
    fn test_should_redact_debug_output() {
        let (factory, _output) = Factory::test();
        let factory = factory.with_credentials(Credentials::new("h", "u", "glpat-secret"));
        assert!(!format!("{factory:?}").contains("glpat-secret"));
    }
}
