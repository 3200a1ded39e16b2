use crate::config::ApiConfig;
use crate::types::*;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// REST client for the session service
pub struct SessionApiClient {
    config: ApiConfig,
    client: Client,
}

impl SessionApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Session summary (no messages)
    pub async fn get_session(&self, uuid: &str) -> Result<SessionDto> {
        let url = self.config.endpoint("get-session");
        self.execute(self.client.get(&url).query(&[("uuid", uuid)]), "get session")
            .await
    }

    /// Create a session owned by `user_id`
    pub async fn create_session(&self, title: &str, user_id: &str) -> Result<SessionDto> {
        let url = self.config.endpoint("create-session");
        let request = self
            .client
            .post(&url)
            .query(&[("title", title), ("user_id", user_id)]);
        self.execute(request, "create session").await
    }

    /// Every session with its messages
    pub async fn all_sessions(&self) -> Result<Vec<Session>> {
        let url = self.config.endpoint("all-sessions");
        self.execute(self.client.get(&url), "list sessions").await
    }

    /// Sessions waiting for an answer from someone other than `answerer_id`
    pub async fn all_unanswered_sessions(&self, answerer_id: &str) -> Result<Vec<SessionDto>> {
        let url = self.config.endpoint("all-unanswered-sessions");
        let request = self.client.get(&url).query(&[("answerer_id", answerer_id)]);
        self.execute(request, "list unanswered sessions").await
    }

    /// Create a temporary guest user
    pub async fn guest_user(&self) -> Result<UserPublic> {
        let url = self.config.endpoint("guest-user");
        self.execute(self.client.post(&url), "create guest user").await
    }

    pub async fn get_user(&self, uuid: &str) -> Result<UserPublic> {
        let url = self.config.endpoint("get-user");
        self.execute(self.client.get(&url).query(&[("uuid", uuid)]), "get user")
            .await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        debug!("Request: {}", what);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::ApiError(format!(
                "Failed to {}: {} {}",
                what, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::DeserializeFailed(e.to_string()))
    }
}
