//! Cached login credentials
//!
//! The CLI keeps the username, password and the tokens of the last login so
//! later invocations can reuse the bearer token, or silently log in again
//! once it expired.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::common::redact::mask;
use crate::hub::{LadderCredentials, LoginTokens, is_token_expired};

/// Cached credentials of one account
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Bearer token of the last login
    #[serde(default)]
    pub token: String,
    /// Only set after a second factor login
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>, tokens: LoginTokens) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token: tokens.access_token,
            refresh_token: tokens.refresh_token.unwrap_or_default(),
        }
    }

    /// Malformed, missing and soon expiring tokens all count as expired
    pub fn token_expired(&self) -> bool {
        is_token_expired(&self.token)
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
    }

    /// Secrets handed to the rate-limit ladder
    pub fn ladder(&self) -> LadderCredentials {
        LadderCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
            refresh_token: self.refresh_token.clone(),
            access_token: self.token.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("token", &mask(&self.token))
            .field("refresh_token", &mask(&self.refresh_token))
            .finish()
    }
}

/// Storage for [`Credentials`]
pub trait CredentialStore: Send + Sync {
    /// Stored credentials, empty when nothing was stored
    fn get_auth(&self) -> anyhow::Result<Credentials>;

    fn store(&self, credentials: &Credentials) -> anyhow::Result<()>;

    fn erase(&self) -> anyhow::Result<()>;
}

/// Credentials kept as a JSON file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Get default credentials file path
    pub fn default_credentials_path() -> &'static str {
        "credentials.json"
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_auth(&self) -> anyhow::Result<Credentials> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Credentials::default()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read credentials file: {}", self.path.display())
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Credentials::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {}", self.path.display()))
    }

    fn store(&self, credentials: &Credentials) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(credentials).context("Failed to serialize credentials")?;
        write_private(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write credentials file: {}", self.path.display()))?;
        tracing::debug!("Wrote credentials to file: {}", self.path.display());
        Ok(())
    }

    fn erase(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove credentials file: {}", self.path.display())),
        }
    }
}

/// Owner read/write only; the file holds the password in clear
#[cfg(unix)]
const CREDENTIALS_FILE_MODE: u32 = 0o600;

/// Write `contents` to `path`, readable by the owner only
///
/// `mode` only applies when the file is created, so an existing file is
/// narrowed explicitly before anything is written to it.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CREDENTIALS_FILE_MODE);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(CREDENTIALS_FILE_MODE))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}
