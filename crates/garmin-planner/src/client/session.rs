//! Scoped Connect session
//!
//! The session is a single shared resource: acquired once per run, reused
//! for every request, and released (persisted back to the credential
//! store) on every exit path, including early aborts. Drop is the safety
//! net; callers should prefer the explicit [`Session::close`].

use tracing::debug;

use crate::client::{GarminClient, SessionToken};
use crate::config::CredentialStore;
use crate::error::{PlannerError, Result};

#[derive(Debug)]
pub struct Session {
    token: SessionToken,
    store: CredentialStore,
    /// Token changed since load and still needs persisting
    dirty: bool,
}

impl Session {
    /// Acquire a session from stored credentials, refreshing the access
    /// token through the token-exchange endpoint when it has expired.
    pub async fn acquire(store: CredentialStore, client: &GarminClient) -> Result<Self> {
        let token = store.load_token()?.ok_or(PlannerError::NotAuthenticated)?;

        if !token.is_expired() {
            debug!("resumed stored session");
            return Ok(Self {
                token,
                store,
                dirty: false,
            });
        }

        if token.is_refresh_expired() {
            return Err(PlannerError::NotAuthenticated);
        }

        debug!("access token expired, refreshing");
        let token = client.refresh_session(&token.refresh_token).await?;
        Ok(Self {
            token,
            store,
            dirty: true,
        })
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Release the session, persisting a refreshed token back to the
    /// store. Always call this on the success path so persistence errors
    /// surface instead of being swallowed by Drop.
    pub fn close(mut self) -> Result<()> {
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        if self.dirty {
            self.store.save_token(&self.token)?;
            self.dirty = false;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.persist() {
                tracing::warn!("failed to persist refreshed session token: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn store_with_token(dir: &TempDir, expires_at: i64, refresh_expires_at: i64) -> CredentialStore {
        let store = CredentialStore::with_dir("test", dir.path().to_path_buf()).unwrap();
        store
            .save_token(&SessionToken {
                token_type: "Bearer".to_string(),
                access_token: "access123".to_string(),
                refresh_token: "refresh123".to_string(),
                expires_at,
                refresh_token_expires_at: refresh_expires_at,
            })
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_acquire_with_valid_token() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now().timestamp();
        let store = store_with_token(&dir, now + 3600, now + 86400);
        let client = GarminClient::new("garmin.com");

        let session = Session::acquire(store, &client).await.unwrap();
        assert_eq!(session.token().access_token, "access123");
    }

    #[tokio::test]
    async fn test_acquire_without_credentials() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::with_dir("empty", dir.path().to_path_buf()).unwrap();
        let client = GarminClient::new("garmin.com");

        let err = Session::acquire(store, &client).await.unwrap_err();
        assert!(matches!(err, PlannerError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_acquire_with_everything_expired() {
        let dir = TempDir::new().unwrap();
        let store = store_with_token(&dir, 0, 0);
        let client = GarminClient::new("garmin.com");

        let err = Session::acquire(store, &client).await.unwrap_err();
        assert!(matches!(err, PlannerError::NotAuthenticated));
    }
}
