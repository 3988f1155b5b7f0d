//! Prodigy videos: wire record, normalized record and create draft.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::moderation::ModerationStatus;
use crate::normalize::{text_or_empty, ListEntity, NormalizeDefaults};
use crate::types::{EntityId, Timestamp};

/// Maximum length of a video title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// A video as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: EntityId,
    pub prodige_id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub status: Option<ModerationStatus>,
    pub moderation_comment: Option<String>,
    pub created_at: Option<Timestamp>,
    pub modified_at: Option<Timestamp>,
}

/// A normalized video.
///
/// `display_url` is resolved on the client (signed or proxied URL) and is
/// never sent by the backend; it survives reconciliation with server records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: EntityId,
    pub prodige_id: EntityId,
    pub title: String,
    pub description: String,
    pub url: String,
    pub status: ModerationStatus,
    pub moderation_comment: Option<String>,
    created_at: Timestamp,
    modified_at: Timestamp,
    #[serde(skip)]
    display_url: Option<String>,
}

impl Video {
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn modified_at(&self) -> Timestamp {
        self.modified_at
    }

    pub fn display_url(&self) -> Option<&str> {
        self.display_url.as_deref()
    }

    pub fn set_display_url(&mut self, url: impl Into<String>) {
        self.display_url = Some(url.into());
    }

    /// URL to hand to a player: the resolved one when known, else the raw one.
    pub fn playback_url(&self) -> &str {
        self.display_url.as_deref().unwrap_or(&self.url)
    }
}

pub fn normalize_video(record: VideoRecord, defaults: &NormalizeDefaults) -> Video {
    let created_at = record.created_at.unwrap_or(defaults.now);
    Video {
        id: record.id,
        prodige_id: record.prodige_id.unwrap_or_default(),
        title: text_or_empty(record.title),
        description: text_or_empty(record.description),
        url: text_or_empty(record.url),
        status: record.status.unwrap_or_default(),
        moderation_comment: record
            .moderation_comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        created_at,
        modified_at: record.modified_at.unwrap_or(created_at),
        display_url: None,
    }
}

impl ListEntity for Video {
    type Record = VideoRecord;

    const ENTITY: &'static str = "video";

    fn id(&self) -> &str {
        &self.id
    }

    fn record_id(record: &VideoRecord) -> &str {
        &record.id
    }

    fn normalize(record: VideoRecord, defaults: &NormalizeDefaults) -> Self {
        normalize_video(record, defaults)
    }

    /// Server fields win; the client-resolved display URL is kept when the
    /// incoming record has none.
    fn reconcile(&self, incoming: Self) -> Self {
        Video {
            display_url: incoming.display_url.or_else(|| self.display_url.clone()),
            ..incoming
        }
    }
}

/// Body of a video create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPayload {
    pub prodige_id: EntityId,
    pub title: String,
    pub description: String,
    pub url: String,
    pub status: ModerationStatus,
}

/// Caller input for attaching a video to a prodigy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDraft {
    pub prodige_id: EntityId,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Initial status; `Pending` when unset.
    pub status: Option<ModerationStatus>,
}

impl VideoDraft {
    pub fn into_payload(self) -> Result<VideoPayload, CoreError> {
        if self.prodige_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "A video must belong to a prodigy".to_string(),
            ));
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("Video title must not be blank".into()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Video title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
            )));
        }

        let url = self.url.trim();
        if url.is_empty() {
            return Err(CoreError::Validation("Video url must not be blank".into()));
        }

        Ok(VideoPayload {
            prodige_id: self.prodige_id.trim().to_string(),
            title: title.to_string(),
            description: self.description.trim().to_string(),
            url: url.to_string(),
            status: self.status.unwrap_or_default(),
        })
    }
}
