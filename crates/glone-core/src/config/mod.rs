//! Run configuration for glone.
//!
//! Credentials are merged from explicit values (flags or environment
//! variables) and a `~/.netrc` fallback. Explicit values always win, field by
//! field. The merged result is validated once into an immutable [`Config`].

pub mod netrc;

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

pub use netrc::{NetrcCredential, NetrcLoader};

use crate::errors::ConfigError;
use crate::instance;

/// GitLab credentials from a single source. Empty fields are unset.
#[derive(Debug, Clone)]
pub struct Credentials {
    host: String,
    user: String,
    token: SecretString,
}

impl Credentials {
    /// Create credentials from possibly-empty values.
    pub fn new(host: impl Into<String>, user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into().trim().to_string(),
            user: user.into().trim().to_string(),
            token: SecretString::from(token.into().trim().to_string()),
        }
    }

    /// Credentials with every field unset.
    pub fn empty() -> Self {
        Self::new("", "", "")
    }

    /// GitLab host, possibly empty.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// GitLab user, possibly empty.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Access token, possibly empty.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// The first required field that is still empty.
    pub fn missing(&self) -> Option<&'static str> {
        if self.host.is_empty() {
            Some("GitLab host")
        } else if self.user.is_empty() {
            Some("GitLab user")
        } else if self.token.expose_secret().is_empty() {
            Some("GitLab token")
        } else {
            None
        }
    }

    /// Whether host, user and token are all set.
    pub fn is_complete(&self) -> bool {
        self.missing().is_none()
    }

    /// Fill only the empty fields from a `.netrc` entry.
    ///
    /// Returns `true` if at least one field was taken from the fallback.
    pub fn fill_from(&mut self, fallback: NetrcCredential) -> bool {
        let mut used = false;
        if self.host.is_empty() {
            self.host = fallback.host;
            used = true;
        }
        if self.user.is_empty() {
            self.user = fallback.login;
            used = true;
        }
        if self.token.expose_secret().is_empty() {
            self.token = fallback.password;
            used = true;
        }
        used
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    host: String,
    user: String,
    token: SecretString,
    group: Option<String>,
    target_dir: PathBuf,
}

impl Config {
    /// Validate merged credentials into a run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first empty requirement.
    pub fn new(
        credentials: Credentials,
        group: Option<String>,
        target_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        if let Some(field) = credentials.missing() {
            return Err(ConfigError::Missing(field));
        }

        Ok(Self {
            host: instance::normalize_hostname(&credentials.host),
            user: credentials.user,
            token: credentials.token,
            group: group
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
            target_dir,
        })
    }

    /// Normalized GitLab hostname.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// GitLab user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Access token. Callers must not log the exposed value.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Group scope, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Root directory for cloned projects.
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }
}

/// Merges explicit credentials with the `.netrc` fallback.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    netrc: NetrcLoader,
}

impl CredentialResolver {
    /// Create a resolver using the given `.netrc` loader.
    pub fn new(netrc: NetrcLoader) -> Self {
        Self { netrc }
    }

    /// Merge explicit credentials with `.netrc`.
    ///
    /// `.netrc` is only read when a field is missing. A file without a GitLab
    /// entry leaves the gaps in place.
    pub fn resolve(&self, explicit: Credentials) -> Result<Credentials, ConfigError> {
        if explicit.is_complete() {
            return Ok(explicit);
        }

        let Some(fallback) = self.netrc.load()? else {
            return Ok(explicit);
        };

        let mut merged = explicit;
        if merged.fill_from(fallback) {
            info!("Using credentials from .netrc");
        }
        Ok(merged)
    }
}

/// Use the explicit directory, or the current working directory.
pub fn resolve_target_dir(explicit: Option<PathBuf>) -> std::io::Result<PathBuf> {
    match explicit {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir),
        _ => std::env::current_dir(),
    }
}
