//! Orchestration of video lists (per prodigy, or a moderation queue).

use std::sync::Arc;

use caviar_client::{ApiError, VideoApi};
use caviar_core::moderation::ModerationStatus;
use caviar_core::video::{Video, VideoDraft};

use crate::error::ServiceError;
use crate::list_store::{EntityListStore, Flag};

pub const LOAD_FAILED: &str = "Unable to load videos. Please try again.";
pub const SAVE_FAILED: &str = "Unable to add this video. Please try again.";
pub const DELETE_FAILED: &str = "Unable to delete this video. Please try again.";

pub struct VideoService<A> {
    api: A,
    store: Arc<EntityListStore<Video>>,
}

impl<A: VideoApi> VideoService<A> {
    pub fn new(api: A, store: Arc<EntityListStore<Video>>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<EntityListStore<Video>> {
        &self.store
    }

    /// Replace the collection with the videos of one prodigy.
    pub async fn load_for_prodige(&self, prodige_id: &str) -> Result<usize, ServiceError> {
        let _loading = self.store.begin(Flag::Loading);

        match self.api.list_for_prodige(prodige_id).await {
            Ok(records) => {
                let count = records.len();
                self.store.set_all(records);
                tracing::debug!(%prodige_id, count, "Videos loaded");
                Ok(count)
            }
            Err(err) => Err(self.fail(LOAD_FAILED, err)),
        }
    }

    /// Replace the collection with every video in `status`, e.g. the
    /// pending moderation queue.
    pub async fn load_queue(&self, status: ModerationStatus) -> Result<usize, ServiceError> {
        let _loading = self.store.begin(Flag::Loading);

        match self.api.list_by_status(status).await {
            Ok(records) => {
                let count = records.len();
                self.store.set_all(records);
                tracing::debug!(%status, count, "Moderation queue loaded");
                Ok(count)
            }
            Err(err) => Err(self.fail(LOAD_FAILED, err)),
        }
    }

    pub async fn create(&self, draft: VideoDraft) -> Result<Arc<Video>, ServiceError> {
        let payload = draft.into_payload()?;
        let _saving = self.store.begin(Flag::Saving);

        let record = self
            .api
            .create(&payload)
            .await
            .map_err(|err| self.fail(SAVE_FAILED, err))?;

        let video = self.store.add(record);
        tracing::debug!(video_id = %video.id, prodige_id = %video.prodige_id, "Video created");
        Ok(video)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let _deleting = self.store.begin(Flag::Deleting);

        match self.api.delete(id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                tracing::debug!(video_id = %id, "Video already gone on the backend");
            }
            Err(err) => return Err(self.fail(DELETE_FAILED, err)),
        }

        self.store.remove(id);
        Ok(())
    }

    /// Record the client-resolved playback URL of a video.
    pub fn set_display_url(&self, id: &str, url: impl Into<String>) -> Option<Arc<Video>> {
        let url = url.into();
        self.store.modify(id, move |video| video.set_display_url(url))
    }

    fn fail(&self, message: &str, err: ApiError) -> ServiceError {
        tracing::warn!(error = %err, "{message}");
        self.store.set_error(Some(message.to_string()));
        ServiceError::Remote {
            message: message.to_string(),
            source: err,
        }
    }
}
