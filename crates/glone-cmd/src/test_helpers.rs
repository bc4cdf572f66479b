//! Shared test utilities for command testing.
//!
//! Provides a factory wired to a wiremock GitLab, a recording clone stub,
//! and fixture builders.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glone_api::Project;
use glone_core::config::Credentials;
use glone_core::iostreams::TestOutput;
use glone_git::{Cloner, GitError};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::factory::Factory;

/// Token every harness request is authenticated with.
pub const TEST_TOKEN: &str = "glpat-test-token";

/// A fully-configured test harness with factory, output capture, and mock server.
#[derive(Debug)]
pub struct TestHarness {
    /// The factory configured for testing.
    pub factory: Factory,
    /// Captured stdout/stderr output.
    pub output: TestOutput,
    /// Wiremock mock server for API requests.
    pub server: MockServer,
    /// Scratch directory holding the (absent) `.netrc` and clone targets.
    pub dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a wiremock server and complete credentials.
    ///
    /// `.netrc` points at a file that does not exist, so the host machine's
    /// credentials never leak into tests.
    pub async fn new() -> Self {
        Self::with_credentials(Credentials::new("gitlab.example.com", "alice", TEST_TOKEN)).await
    }

    /// Create a test harness with custom explicit credentials.
    pub async fn with_credentials(credentials: Credentials) -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().expect("create temp dir");
        let (factory, output) = Factory::test();
        let factory = factory
            .with_credentials(credentials)
            .with_netrc_path(dir.path().join("missing.netrc"))
            .with_http_client(reqwest::Client::new())
            .with_api_url(format!("{}/api/v4/", server.uri()));

        Self {
            factory,
            output,
            server,
            dir,
        }
    }

    /// Get captured stdout as a string.
    pub fn stdout(&self) -> String {
        self.output.stdout()
    }

    /// Clone target inside the scratch directory.
    pub fn target(&self) -> PathBuf {
        self.dir.path().join("repos")
    }
}

// --- Fixtures ---

/// A project under the `acme` namespace.
pub fn project(id: u64, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        path_with_namespace: format!("acme/{name}"),
        http_url_to_repo: format!("https://gitlab.example.com/acme/{name}.git"),
    }
}

/// JSON for [`project`].
pub fn project_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "path_with_namespace": format!("acme/{name}"),
        "http_url_to_repo": format!("https://gitlab.example.com/acme/{name}.git"),
    })
}

// --- Wiremock helpers ---

/// Mount a successful `GET /user`.
pub async fn mock_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .and(header("PRIVATE-TOKEN", TEST_TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"username": "alice", "email": "alice@example.com"})),
        )
        .mount(server)
        .await;
}

/// Mount a group lookup and its project listing (subgroups included).
pub async fn mock_group(server: &MockServer, group_path: &str, group_id: u64, projects: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/groups/{group_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": group_id,
            "name": group_path,
            "full_path": group_path,
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v4/groups/{group_id}/projects")))
        .and(query_param("include_subgroups", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(projects))
        .mount(server)
        .await;
}

/// Mount a REST GET response mock that returns a specific status code with a JSON body.
pub async fn mock_rest_get_status(server: &MockServer, url_path: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

// --- Clone stub ---

/// In-memory [`Cloner`] that records calls instead of running git.
///
/// A successful "clone" creates the destination directory. A failing one
/// creates it too, to leave a partial clone behind for cleanup checks.
#[derive(Debug, Default)]
pub struct StubCloner {
    repositories: HashSet<PathBuf>,
    uninspectable: HashSet<PathBuf>,
    failing: HashSet<String>,
    cloned: Mutex<Vec<(String, PathBuf)>>,
}

impl StubCloner {
    /// Report `path` as an existing clone.
    #[must_use]
    pub fn with_repository(mut self, path: &Path) -> Self {
        self.repositories.insert(path.to_path_buf());
        self
    }

    /// Fail the existing-clone check for `path`, as git does for a
    /// repository with dubious ownership.
    #[must_use]
    pub fn uninspectable(mut self, path: &Path) -> Self {
        self.uninspectable.insert(path.to_path_buf());
        self
    }

    /// Fail clones whose destination directory is named `name`.
    #[must_use]
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Successful clone calls as `(url, destination)`.
    pub fn cloned(&self) -> Vec<(String, PathBuf)> {
        self.cloned
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Cloner for StubCloner {
    async fn is_repository(&self, path: &Path) -> Result<bool, GitError> {
        if self.uninspectable.contains(path) {
            return Err(GitError::CommandFailed {
                command: "rev-parse".to_string(),
                message: "fatal: detected dubious ownership in repository".to_string(),
                exit_code: Some(128),
            });
        }
        Ok(self.repositories.contains(path))
    }

    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        std::fs::create_dir_all(dest)?;

        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.failing.contains(&name) {
            return Err(GitError::CommandFailed {
                command: "clone".to_string(),
                message: "exit status: 128".to_string(),
                exit_code: Some(128),
            });
        }

        self.cloned
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((url.to_string(), dest.to_path_buf()));
        Ok(())
    }
}
