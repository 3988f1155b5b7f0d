//! `reqwest` implementation of the remote resource traits.
//!
//! Endpoints (relative to the configured base URL):
//!
//! | Call                          | Request                              |
//! |-------------------------------|--------------------------------------|
//! | `ProdigeApi::list`            | `GET /prodiges?userId={owner}`       |
//! | `ProdigeApi::create`          | `POST /prodiges`                     |
//! | `ProdigeApi::update`          | `PUT /prodiges/{id}`                 |
//! | `ProdigeApi::delete`          | `DELETE /prodiges/{id}`              |
//! | `VideoApi::list_for_prodige`  | `GET /videos?prodigeId={id}`         |
//! | `VideoApi::list_by_status`    | `GET /videos?status={STATUS}`        |
//! | `VideoApi::create`            | `POST /videos`                       |
//! | `VideoApi::delete`            | `DELETE /videos/{id}`                |
//! | `ModerationApi::moderate`     | `PATCH /videos/{id}/moderation`      |

use std::time::Duration;

use async_trait::async_trait;
use caviar_core::moderation::{ModerationRequest, ModerationStatus};
use caviar_core::prodige::{ProdigePayload, ProdigeRecord};
use caviar_core::video::{VideoPayload, VideoRecord};
use reqwest::{Method, RequestBuilder, Url};

use crate::api::{ModerationApi, ProdigeApi, VideoApi};
use crate::error::ApiError;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the CaviarScout backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpBackend {
    /// Create a backend client with its own connection pool.
    ///
    /// * `base_url` - API root, e.g. `http://localhost:8080/api/v1`.
    /// * `timeout`  - per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create a backend client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            bearer_token: None,
        })
    }

    /// Attach the access token issued by the identity provider.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ---- private helpers ----

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(%method, %url, request_id = %request_id, "Backend request");

        let builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().clone();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), %url, "Backend rejected request");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ProdigeApi for HttpBackend {
    async fn list(&self, owner_id: &str) -> Result<Vec<ProdigeRecord>, ApiError> {
        let response = self
            .request(Method::GET, &["prodiges"])
            .query(&[("userId", owner_id)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create(&self, payload: &ProdigePayload) -> Result<ProdigeRecord, ApiError> {
        let response = self
            .request(Method::POST, &["prodiges"])
            .json(payload)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update(
        &self,
        id: &str,
        payload: &ProdigePayload,
    ) -> Result<ProdigeRecord, ApiError> {
        let response = self
            .request(Method::PUT, &["prodiges", id])
            .json(payload)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &["prodiges", id])
            .send()
            .await?;
        Self::check_status(response).await
    }
}

#[async_trait]
impl VideoApi for HttpBackend {
    async fn list_for_prodige(&self, prodige_id: &str) -> Result<Vec<VideoRecord>, ApiError> {
        let response = self
            .request(Method::GET, &["videos"])
            .query(&[("prodigeId", prodige_id)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn list_by_status(
        &self,
        status: ModerationStatus,
    ) -> Result<Vec<VideoRecord>, ApiError> {
        let response = self
            .request(Method::GET, &["videos"])
            .query(&[("status", status.as_str())])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create(&self, payload: &VideoPayload) -> Result<VideoRecord, ApiError> {
        let response = self
            .request(Method::POST, &["videos"])
            .json(payload)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &["videos", id])
            .send()
            .await?;
        Self::check_status(response).await
    }
}

#[async_trait]
impl ModerationApi for HttpBackend {
    async fn moderate(
        &self,
        id: &str,
        request: &ModerationRequest,
    ) -> Result<VideoRecord, ApiError> {
        let response = self
            .request(Method::PATCH, &["videos", id, "moderation"])
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
