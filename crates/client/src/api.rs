//! Remote resource contracts.
//!
//! The store layer only ever talks to the backend through these traits, so
//! it can be driven by [`HttpBackend`](crate::HttpBackend) in production and
//! by in-memory fakes in tests.

use std::sync::Arc;

use async_trait::async_trait;
use caviar_core::moderation::{ModerationRequest, ModerationStatus};
use caviar_core::prodige::{ProdigePayload, ProdigeRecord};
use caviar_core::video::{VideoPayload, VideoRecord};

use crate::error::ApiError;

/// CRUD resource for prodigy profiles.
#[async_trait]
pub trait ProdigeApi: Send + Sync {
    /// List the prodigies owned by `owner_id`.
    async fn list(&self, owner_id: &str) -> Result<Vec<ProdigeRecord>, ApiError>;

    async fn create(&self, payload: &ProdigePayload) -> Result<ProdigeRecord, ApiError>;

    async fn update(&self, id: &str, payload: &ProdigePayload)
        -> Result<ProdigeRecord, ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

/// Resource for videos attached to prodigies.
#[async_trait]
pub trait VideoApi: Send + Sync {
    async fn list_for_prodige(&self, prodige_id: &str) -> Result<Vec<VideoRecord>, ApiError>;

    /// Videos across all prodigies in a given moderation status.
    async fn list_by_status(&self, status: ModerationStatus)
        -> Result<Vec<VideoRecord>, ApiError>;

    async fn create(&self, payload: &VideoPayload) -> Result<VideoRecord, ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

/// Privileged moderation resource.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// Apply a moderation decision and return the authoritative record.
    async fn moderate(&self, id: &str, request: &ModerationRequest)
        -> Result<VideoRecord, ApiError>;
}

#[async_trait]
impl<T: ProdigeApi + ?Sized> ProdigeApi for Arc<T> {
    async fn list(&self, owner_id: &str) -> Result<Vec<ProdigeRecord>, ApiError> {
        (**self).list(owner_id).await
    }

    async fn create(&self, payload: &ProdigePayload) -> Result<ProdigeRecord, ApiError> {
        (**self).create(payload).await
    }

    async fn update(
        &self,
        id: &str,
        payload: &ProdigePayload,
    ) -> Result<ProdigeRecord, ApiError> {
        (**self).update(id, payload).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<T: VideoApi + ?Sized> VideoApi for Arc<T> {
    async fn list_for_prodige(&self, prodige_id: &str) -> Result<Vec<VideoRecord>, ApiError> {
        (**self).list_for_prodige(prodige_id).await
    }

    async fn list_by_status(
        &self,
        status: ModerationStatus,
    ) -> Result<Vec<VideoRecord>, ApiError> {
        (**self).list_by_status(status).await
    }

    async fn create(&self, payload: &VideoPayload) -> Result<VideoRecord, ApiError> {
        (**self).create(payload).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<T: ModerationApi + ?Sized> ModerationApi for Arc<T> {
    async fn moderate(
        &self,
        id: &str,
        request: &ModerationRequest,
    ) -> Result<VideoRecord, ApiError> {
        (**self).moderate(id, request).await
    }
}
