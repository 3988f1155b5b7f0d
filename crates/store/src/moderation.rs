//! Privileged review actions on videos.
//!
//! A transition is validated locally (permission, state machine, comment)
//! before exactly one remote call is made. The store only changes once the
//! backend has answered; on failure the video keeps its previous status.

use std::sync::Arc;

use caviar_client::ModerationApi;
use caviar_core::error::CoreError;
use caviar_core::moderation::{build_moderation_request, ModerationStatus};
use caviar_core::video::Video;

use crate::error::ServiceError;
use crate::list_store::{EntityListStore, Flag};
use crate::session::SessionContext;

pub const MODERATION_FAILED: &str = "Unable to update the moderation status. Please try again.";

pub struct ModerationWorkflow<M> {
    api: M,
    store: Arc<EntityListStore<Video>>,
}

impl<M: ModerationApi> ModerationWorkflow<M> {
    pub fn new(api: M, store: Arc<EntityListStore<Video>>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<EntityListStore<Video>> {
        &self.store
    }

    /// Move `video` to `target`.
    ///
    /// The transition is checked against the entry currently held in the
    /// store, not the caller's copy; a video absent from the store is
    /// `NotFound` and nothing is sent. Returns the reconciled entry, or `None`
    /// when the answer was not applied (the video left the list meanwhile, or
    /// a later decision already landed).
    pub async fn transition(
        &self,
        session: &SessionContext,
        video: &Video,
        target: ModerationStatus,
        comment: Option<&str>,
    ) -> Result<Option<Arc<Video>>, ServiceError> {
        if !session.can_moderate() {
            return Err(CoreError::Forbidden(format!(
                "User {} ({:?}) may not moderate videos",
                session.user_id, session.role
            ))
            .into());
        }

        let current = self.store.get(&video.id).ok_or_else(|| CoreError::NotFound {
            entity: "video",
            id: video.id.clone(),
        })?;
        let request = build_moderation_request(current.status, target, comment)?;

        let ticket = self.store.begin_write(&current.id);
        let _saving = self.store.begin(Flag::Saving);

        let record = match self.api.moderate(&current.id, &request).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(video_id = %current.id, %target, error = %err, "Moderation call failed");
                self.store.set_error(Some(MODERATION_FAILED.to_string()));
                return Err(ServiceError::Remote {
                    message: MODERATION_FAILED.to_string(),
                    source: err,
                });
            }
        };

        tracing::info!(
            video_id = %current.id,
            moderator = %session.user_id,
            from = %current.status,
            to = %target,
            commented = request.comment.is_some(),
            "Moderation decision recorded"
        );
        Ok(self.store.commit_update(ticket, record))
    }

    pub async fn approve(
        &self,
        session: &SessionContext,
        video: &Video,
    ) -> Result<Option<Arc<Video>>, ServiceError> {
        self.transition(session, video, ModerationStatus::Approved, None)
            .await
    }

    pub async fn reject(
        &self,
        session: &SessionContext,
        video: &Video,
        comment: &str,
    ) -> Result<Option<Arc<Video>>, ServiceError> {
        self.transition(session, video, ModerationStatus::Rejected, Some(comment))
            .await
    }

    /// Send an approved or rejected video back to the queue.
    pub async fn revert(
        &self,
        session: &SessionContext,
        video: &Video,
    ) -> Result<Option<Arc<Video>>, ServiceError> {
        self.transition(session, video, ModerationStatus::Pending, None)
            .await
    }
}
