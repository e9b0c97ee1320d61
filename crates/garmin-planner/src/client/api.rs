//! Garmin Connect API client for authenticated requests
//!
//! Wraps a reqwest client and maps HTTP statuses onto the error taxonomy:
//! 401/403 are authentication failures, 408/429/5xx are transient and may
//! be retried, 400/422 are permanent schema rejections.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::client::tokens::SessionToken;
use crate::error::{PlannerError, Result};
use crate::models::wire::{WorkoutCreated, WorkoutPayload};
use crate::upload::SubmitWorkout;

/// User agent for Connect API requests
const API_USER_AGENT: &str = "GCM-iOS-5.7.2.1";

/// Workout creation endpoint
const WORKOUT_PATH: &str = "/workout-service/workout";

/// Garmin Connect API client
pub struct GarminClient {
    client: Client,
    base_url: String,
}

impl GarminClient {
    /// Create a new API client for the given domain
    pub fn new(domain: &str) -> Self {
        Self::with_base_url(format!("https://connectapi.{}", domain))
    }

    /// Create a new API client with a custom base URL (for testing)
    #[doc(hidden)]
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self::with_base_url(base_url.to_string())
    }

    fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
        }
    }

    /// Build the full URL for a given path
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build headers with authorization
    fn build_headers(&self, token: &SessionToken) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(API_USER_AGENT));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.authorization_header())
                .map_err(|_| PlannerError::auth("Token contains invalid header characters"))?,
        );
        Ok(headers)
    }

    /// Make an authenticated GET request and deserialize the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        token: &SessionToken,
        path: &str,
    ) -> Result<T> {
        let url = self.build_url(path);
        let headers = self.build_headers(token)?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(PlannerError::Http)?;

        let response = self.handle_response_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| PlannerError::permanent(format!("Failed to parse JSON response: {}", e)))
    }

    /// Make an authenticated POST request with a JSON body and deserialize
    /// the JSON response
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        token: &SessionToken,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let headers = self.build_headers(token)?;

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(PlannerError::Http)?;

        let response = self.handle_response_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| PlannerError::permanent(format!("Failed to parse JSON response: {}", e)))
    }

    /// Exchange email/password for a session token through the delegated
    /// token endpoint
    pub async fn exchange_credentials(&self, email: &str, password: &str) -> Result<SessionToken> {
        let url = self.build_url("/auth/token");
        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, API_USER_AGENT)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(PlannerError::Http)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(PlannerError::auth("Invalid email or password"));
        }
        let response = self.handle_response_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| PlannerError::auth(format!("Malformed token response: {}", e)))
    }

    /// Refresh an expired session token
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<SessionToken> {
        let url = self.build_url("/auth/token/refresh");
        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, API_USER_AGENT)
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(PlannerError::Http)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(PlannerError::NotAuthenticated);
        }
        let response = self.handle_response_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| PlannerError::auth(format!("Malformed token response: {}", e)))
    }

    /// Create a structured workout, returning its remote id
    pub async fn create_workout(
        &self,
        token: &SessionToken,
        payload: &WorkoutPayload,
    ) -> Result<u64> {
        let created: WorkoutCreated = self.post_json(token, WORKOUT_PATH, payload).await?;
        Ok(created.workout_id)
    }

    /// Bind this client to a session token, yielding the submitter used by
    /// the upload orchestrator
    pub fn workout_submitter<'a>(&'a self, token: &'a SessionToken) -> WorkoutService<'a> {
        WorkoutService {
            client: self,
            token,
        }
    }

    /// Handle response status codes and convert to errors
    async fn handle_response_status(&self, response: Response) -> Result<Response> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                Ok(response)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PlannerError::auth(format!(
                "Garmin Connect rejected the session ({})",
                status
            ))),
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                Err(PlannerError::transient(format!("HTTP {}", status)))
            }
            s if s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(PlannerError::transient(format!("HTTP {}: {}", s, body)))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(PlannerError::permanent(format!("HTTP {}: {}", status, body)))
            }
        }
    }
}

/// A client/token pair that can submit workouts
pub struct WorkoutService<'a> {
    client: &'a GarminClient,
    token: &'a SessionToken,
}

impl SubmitWorkout for WorkoutService<'_> {
    async fn submit(&self, payload: &WorkoutPayload) -> Result<u64> {
        self.client.create_workout(self.token, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let client = GarminClient::new("garmin.com");
        assert_eq!(
            client.build_url("/workout-service/workout"),
            "https://connectapi.garmin.com/workout-service/workout"
        );
    }

    #[test]
    fn test_client_creation() {
        let client = GarminClient::new("garmin.com");
        assert_eq!(client.base_url, "https://connectapi.garmin.com");
    }
}
