//! Persisted access token and endpoint.
//!
//! Stored as pretty JSON in `<config dir>/streamprobe/credentials.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::client::ClientError;

/// The directory name under the platform config directory.
const CREDENTIALS_DIR: &str = "streamprobe";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Token/endpoint pair remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl StoredCredentials {
    /// Trimmed values; blank ones count as absent.
    pub fn new(endpoint: Option<&str>, access_token: Option<&str>) -> Self {
        Self {
            endpoint: non_blank(endpoint),
            access_token: non_blank(access_token),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.endpoint.is_none() && self.access_token.is_none()
    }

    /// Fill whatever is missing here from `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            endpoint: self.endpoint.or(fallback.endpoint),
            access_token: self.access_token.or(fallback.access_token),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Resolve the endpoint/token pair for a run.
///
/// `given` (flags and environment) wins. The store is only read when
/// `persist` is set; an unreadable file is logged and skipped.
pub fn resolve_credentials(
    given: StoredCredentials,
    store: Option<&CredentialsStore>,
    persist: bool,
) -> StoredCredentials {
    let Some(store) = store.filter(|_| persist) else {
        return given;
    };

    match store.load() {
        Ok(stored) => given.or(StoredCredentials::new(
            stored.endpoint.as_deref(),
            stored.access_token.as_deref(),
        )),
        Err(e) => {
            warn!(error = %e, path = %store.path().display(), "ignoring unreadable credentials file");
            given
        }
    }
}

/// Loads and saves [`StoredCredentials`].
#[derive(Debug, Clone)]
pub struct CredentialsStore {
    path: PathBuf,
}

impl CredentialsStore {
    /// Store at the default location.
    ///
    /// Returns `None` if the platform config directory cannot be determined.
    pub fn new() -> Option<Self> {
        let dir = dirs::config_dir()?;
        Some(Self::with_path(dir.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE)))
    }

    /// Store at an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored credentials. A missing file loads as empty.
    pub fn load(&self) -> Result<StoredCredentials, ClientError> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }

        let json = fs::read_to_string(&self.path)?;
        let credentials = serde_json::from_str(&json)?;
        debug!(path = %self.path.display(), "loaded stored credentials");
        Ok(credentials)
    }

    /// Save credentials, creating the parent directory if needed.
    pub fn save(&self, credentials: &StoredCredentials) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, json)?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }

    /// Remove the stored file. Succeeds if there was nothing stored.
    pub fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
