//! `.netrc` credentials file support.
//!
//! Parses the `machine`/`login`/`password` format used by curl, git and ftp,
//! and selects the GitLab entry used as a credentials fallback.

use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::instance;

/// Default file name inside the home directory.
pub const NETRC_FILE_NAME: &str = ".netrc";

/// A single entry from a `.netrc` file.
#[derive(Debug, Default)]
pub struct Machine {
    /// Machine label. `None` for the `default` entry.
    pub name: Option<String>,
    /// Login name.
    pub login: Option<String>,
    /// Password or access token.
    pub password: Option<SecretString>,
}

/// Parsed contents of a `.netrc` file.
#[derive(Debug, Default)]
pub struct Netrc {
    machines: Vec<Machine>,
}

#[derive(Debug, Clone, Copy)]
enum Key {
    Name,
    Login,
    Password,
    Account,
}

impl Netrc {
    /// Parse `.netrc` content.
    ///
    /// Unknown tokens are ignored. `#` starts a comment that runs to the end
    /// of the line, and `macdef` bodies are skipped up to the next blank line.
    /// Values may be double-quoted to hold whitespace, with `\` escaping the
    /// next character.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNetrc`] for a quoted value that is not
    /// closed on its line.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let mut machines = Vec::new();
        let mut current: Option<Machine> = None;
        let mut pending: Option<Key> = None;
        let mut in_macdef = false;

        for (index, line) in input.lines().enumerate() {
            if in_macdef {
                if line.trim().is_empty() {
                    in_macdef = false;
                }
                continue;
            }

            for token in Tokens::new(line) {
                let token = token.map_err(|reason| ConfigError::InvalidNetrc {
                    line: index + 1,
                    reason,
                })?;

                if let Some(key) = pending.take() {
                    if let Some(ref mut machine) = current {
                        match key {
                            Key::Name => machine.name = Some(token.text),
                            Key::Login => machine.login = Some(token.text),
                            Key::Password => {
                                machine.password = Some(SecretString::from(token.text));
                            }
                            Key::Account => {}
                        }
                    }
                    continue;
                }

                if !token.quoted && token.text.starts_with('#') {
                    break;
                }

                match token.text.as_str() {
                    "machine" | "default" => {
                        machines.extend(current.take());
                        current = Some(Machine::default());
                        if token.text == "machine" {
                            pending = Some(Key::Name);
                        }
                    }
                    "login" => pending = Some(Key::Login),
                    "password" => pending = Some(Key::Password),
                    "account" => pending = Some(Key::Account),
                    "macdef" => {
                        in_macdef = true;
                        break;
                    }
                    other => debug!(token = other, "ignoring unknown .netrc token"),
                }
            }
        }

        machines.extend(current);
        Ok(Self { machines })
    }

    /// All entries in file order.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Entries whose label contains `gitlab` (case-insensitive), in file order.
    pub fn gitlab_machines(&self) -> Vec<&Machine> {
        self.machines
            .iter()
            .filter(|m| m.name.as_deref().is_some_and(instance::is_gitlab_label))
            .collect()
    }
}

struct Token {
    text: String,
    quoted: bool,
}

/// Lazily splits one line, so a comment is never scanned for quotes.
struct Tokens<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            chars: line.chars().peekable(),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, &'static str>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
        let first = *self.chars.peek()?;

        let mut text = String::new();
        if first != '"' {
            while let Some(c) = self.chars.next_if(|c| !c.is_whitespace()) {
                text.push(c);
            }
            return Some(Ok(Token {
                text,
                quoted: false,
            }));
        }

        self.chars.next();
        while let Some(c) = self.chars.next() {
            match c {
                '"' => return Some(Ok(Token { text, quoted: true })),
                '\\' => text.extend(self.chars.next()),
                c => text.push(c),
            }
        }
        Some(Err("unterminated quoted value"))
    }
}

/// Credentials selected from `.netrc` for the GitLab fallback.
#[derive(Debug)]
pub struct NetrcCredential {
    /// GitLab host (the machine label).
    pub host: String,
    /// Login name.
    pub login: String,
    /// Access token.
    pub password: SecretString,
}

/// Loads the GitLab credential fallback from a `.netrc` file.
#[derive(Debug, Clone, Default)]
pub struct NetrcLoader {
    path: Option<PathBuf>,
}

impl NetrcLoader {
    /// Create a loader reading `~/.netrc`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read credentials from a custom path instead of `~/.netrc`.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Path of the file this loader reads.
    pub fn path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.path {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(NETRC_FILE_NAME))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Load the first GitLab entry.
    ///
    /// Returns `Ok(None)` when the file does not exist or has no GitLab entry.
    pub fn load(&self) -> Result<Option<NetrcCredential>, ConfigError> {
        let path = self.path()?;
        let Some(content) = read_optional(&path)? else {
            debug!(path = %path.display(), "no .netrc file found");
            return Ok(None);
        };

        select_gitlab_credential(&Netrc::parse(&content)?)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::ReadNetrc {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Pick the first GitLab entry, warning when there are several candidates.
pub fn select_gitlab_credential(netrc: &Netrc) -> Result<Option<NetrcCredential>, ConfigError> {
    let candidates = netrc.gitlab_machines();
    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    if candidates.len() > 1 {
        warn!("Found multiple GitLab entries in .netrc, will use the first one");
        for (i, machine) in candidates.iter().enumerate() {
            info!("  {}. {}", i + 1, machine.name.as_deref().unwrap_or_default());
        }
    }

    let host = first.name.clone().unwrap_or_default();
    let login = first
        .login
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());
    let password = first
        .password
        .as_ref()
        .filter(|p| !p.expose_secret().trim().is_empty());

    match (login, password) {
        (Some(login), Some(password)) => Ok(Some(NetrcCredential {
            host,
            login: login.to_string(),
            password: password.clone(),
        })),
        _ => Err(ConfigError::IncompleteNetrc { machine: host }),
    }
}
