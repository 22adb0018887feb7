//! Credential persistence: load/save with atomic writes

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{AuthError, Credentials, TokenSource};

pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// `credentials.json` inside the state directory
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(state_dir: &Path) -> Self {
        Self { path: state_dir.join(CREDENTIALS_FILE_NAME) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored credentials
    ///
    /// Returns `None` if the file is missing, empty or unreadable as JSON; the caller
    /// treats all of these as "logged out".
    pub fn load(&self) -> Result<Option<Credentials>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| AuthError::Store(format!("read {}: {e}", self.path.display())))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Credentials>(&raw) {
            Ok(creds) if !creds.access_token.trim().is_empty() => Ok(Some(creds)),
            Ok(_) => Ok(None),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "ignoring malformed credentials file");
                Ok(None)
            }
        }
    }

    /// Save credentials atomically (temp file + rename), readable by the owner only
    pub fn save(&self, creds: &Credentials) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AuthError::Store(format!("mkdir {}: {e}", parent.display())))?;
        }

        let json = serde_json::to_string_pretty(creds)
            .map_err(|e| AuthError::Store(format!("serialize credentials: {e}")))?;
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, json)
            .map_err(|e| AuthError::Store(format!("write {}: {e}", temp.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp, fs::Permissions::from_mode(0o600))
                .map_err(|e| AuthError::Store(format!("chmod {}: {e}", temp.display())))?;
        }

        fs::rename(&temp, &self.path)
            .map_err(|e| AuthError::Store(format!("rename {}: {e}", temp.display())))?;
        debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    /// Delete stored credentials; returns whether a file was removed
    pub fn delete(&self) -> Result<bool, AuthError> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .map_err(|e| AuthError::Store(format!("delete {}: {e}", self.path.display())))?;
        Ok(true)
    }

    /// Active credentials. Priority: `token_override` (from `QSTUDIO_TOKEN`) → file.
    pub fn resolve(
        &self,
        token_override: Option<&str>,
    ) -> Result<Option<(Credentials, TokenSource)>, AuthError> {
        if let Some(token) = token_override.map(str::trim)
            && !token.is_empty()
        {
            return Ok(Some((Credentials::from_token(token), TokenSource::Environment)));
        }
        Ok(self.load()?.map(|creds| (creds, TokenSource::File)))
    }
}
