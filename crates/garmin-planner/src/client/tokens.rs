use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Bearer session token for Connect API requests.
/// Short-lived; refreshed through the token-exchange endpoint using the
/// long-lived refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionToken {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default)]
    pub refresh_token_expires_at: i64,
}

impl SessionToken {
    /// Check if the access token has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now().timestamp()
    }

    /// Check if the refresh token has expired.
    pub fn is_refresh_expired(&self) -> bool {
        self.refresh_token_expires_at < Utc::now().timestamp()
    }

    /// Returns the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: i64, refresh_expires_at: i64) -> SessionToken {
        SessionToken {
            token_type: "Bearer".to_string(),
            access_token: "access123".to_string(),
            refresh_token: "refresh123".to_string(),
            expires_at,
            refresh_token_expires_at: refresh_expires_at,
        }
    }

    #[test]
    fn test_expired_token() {
        let t = token(0, Utc::now().timestamp() + 86400);
        assert!(t.is_expired());
        assert!(!t.is_refresh_expired());
    }

    #[test]
    fn test_valid_token() {
        let now = Utc::now().timestamp();
        let t = token(now + 3600, now + 86400);
        assert!(!t.is_expired());
    }

    #[test]
    fn test_refresh_expired() {
        let t = token(Utc::now().timestamp() + 3600, 0);
        assert!(t.is_refresh_expired());
    }

    #[test]
    fn test_authorization_header() {
        let t = token(0, 0);
        assert_eq!(t.authorization_header(), "Bearer access123");
    }

    #[test]
    fn test_serialization_round_trip() {
        let t = token(1700000000, 1700086400);
        let json = serde_json::to_string(&t).unwrap();
        let back: SessionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
