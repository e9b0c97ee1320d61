use crate::client::SessionToken;
use crate::error::Result;
use std::fs;
use std::path::PathBuf;

const SESSION_FILENAME: &str = "session_token.json";

/// Per-profile storage for the Garmin Connect session token.
/// File-based, with restrictive permissions on Unix.
#[derive(Debug)]
pub struct CredentialStore {
    profile: String,
    base_dir: PathBuf,
}

impl CredentialStore {
    /// Create a new credential store for the given profile
    pub fn new(profile: Option<String>) -> Result<Self> {
        let profile = profile.unwrap_or_else(|| "default".to_string());
        let base_dir = super::data_dir()?.join(&profile);
        super::ensure_dir(&base_dir)?;

        Ok(Self { profile, base_dir })
    }

    /// Create a credential store with a custom base directory (for testing)
    pub fn with_dir(profile: impl Into<String>, base_dir: PathBuf) -> Result<Self> {
        let profile = profile.into();
        let dir = base_dir.join(&profile);
        super::ensure_dir(&dir)?;

        Ok(Self {
            profile,
            base_dir: dir,
        })
    }

    /// Get the profile name
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Save the session token to storage
    pub fn save_token(&self, token: &SessionToken) -> Result<()> {
        let path = self.base_dir.join(SESSION_FILENAME);
        let json = serde_json::to_string_pretty(token)?;
        fs::write(&path, json)?;

        // Token grants account access; keep it owner-readable only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Load the session token from storage
    pub fn load_token(&self) -> Result<Option<SessionToken>> {
        let path = self.base_dir.join(SESSION_FILENAME);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let token: SessionToken = serde_json::from_str(&json)?;
        Ok(Some(token))
    }

    /// Whether a stored token exists for this profile
    pub fn has_credentials(&self) -> bool {
        self.base_dir.join(SESSION_FILENAME).exists()
    }

    /// Remove stored credentials
    pub fn clear(&self) -> Result<()> {
        let path = self.base_dir.join(SESSION_FILENAME);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
