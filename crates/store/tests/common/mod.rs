#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use caviar_client::{ApiError, ModerationApi, ProdigeApi, VideoApi};
use caviar_core::codes::{Gender, Sport, TraitTag};
use caviar_core::moderation::{ModerationRequest, ModerationStatus};
use caviar_core::prodige::{ProdigeDraft, ProdigePayload, ProdigeRecord};
use caviar_core::video::{Video, VideoPayload, VideoRecord};
use caviar_store::list_store::{EntityListStore, WritePolicy};
use caviar_store::session::{SessionContext, UserRole};
use tokio::sync::Notify;

/// In-memory backend implementing every remote resource.
///
/// Each call is appended to `calls` as `"<resource>.<op> <arg>"` before any
/// failure or gate is applied, so tests can assert exactly what was sent.
#[derive(Default)]
pub struct FakeBackend {
    pub prodiges: Mutex<Vec<ProdigeRecord>>,
    pub videos: Mutex<Vec<VideoRecord>>,
    pub calls: Mutex<Vec<String>>,
    pub moderation_requests: Mutex<Vec<(String, ModerationRequest)>>,
    /// When set, every call fails with this HTTP status.
    pub fail_status: Mutex<Option<u16>>,
    /// Gates consumed in order by remote writes; a gated call waits until
    /// its `Notify` is signalled.
    write_gates: Mutex<VecDeque<Arc<Notify>>>,
    next_id: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_prodiges(records: Vec<ProdigeRecord>) -> Arc<Self> {
        let backend = Self::default();
        *backend.prodiges.lock().unwrap() = records;
        Arc::new(backend)
    }

    pub fn with_videos(records: Vec<VideoRecord>) -> Arc<Self> {
        let backend = Self::default();
        *backend.videos.lock().unwrap() = records;
        Arc::new(backend)
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn recover(&self) {
        *self.fail_status.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Hold the next remote write until the returned handle is notified.
    pub fn hold_next_write(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.write_gates.lock().unwrap().push_back(Arc::clone(&gate));
        gate
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(ApiError::Status {
                status,
                body: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn pass_gate(&self) {
        let gate = self.write_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn prodige_record(id: String, payload: &ProdigePayload) -> ProdigeRecord {
    ProdigeRecord {
        id,
        user_id: Some(payload.user_id.clone()),
        first_name: Some(payload.first_name.clone()),
        last_name: Some(payload.last_name.clone()),
        age: Some(payload.age),
        sport: Some(payload.sport),
        description: Some(payload.description.clone()),
        tags: Some(payload.tags.clone()),
        country: Some(payload.country.clone()),
        gender: Some(payload.gender),
        ..Default::default()
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        body: "not found".to_string(),
    }
}

#[async_trait]
impl ProdigeApi for FakeBackend {
    async fn list(&self, owner_id: &str) -> Result<Vec<ProdigeRecord>, ApiError> {
        self.record(format!("prodiges.list {owner_id}"))?;
        Ok(self
            .prodiges
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id.as_deref() == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn create(&self, payload: &ProdigePayload) -> Result<ProdigeRecord, ApiError> {
        self.record(format!("prodiges.create {}", payload.first_name))?;
        self.pass_gate().await;
        let record = prodige_record(self.fresh_id("p"), payload);
        self.prodiges.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, payload: &ProdigePayload) -> Result<ProdigeRecord, ApiError> {
        self.record(format!("prodiges.update {id}"))?;
        self.pass_gate().await;
        let mut prodiges = self.prodiges.lock().unwrap();
        let existing = prodiges.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
        *existing = prodige_record(id.to_string(), payload);
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("prodiges.delete {id}"))?;
        let mut prodiges = self.prodiges.lock().unwrap();
        let before = prodiges.len();
        prodiges.retain(|p| p.id != id);
        if prodiges.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl VideoApi for FakeBackend {
    async fn list_for_prodige(&self, prodige_id: &str) -> Result<Vec<VideoRecord>, ApiError> {
        self.record(format!("videos.list_for_prodige {prodige_id}"))?;
        Ok(self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.prodige_id.as_deref() == Some(prodige_id))
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: ModerationStatus) -> Result<Vec<VideoRecord>, ApiError> {
        self.record(format!("videos.list_by_status {status}"))?;
        Ok(self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.status.unwrap_or_default() == status)
            .cloned()
            .collect())
    }

    async fn create(&self, payload: &VideoPayload) -> Result<VideoRecord, ApiError> {
        self.record(format!("videos.create {}", payload.title))?;
        let record = VideoRecord {
            id: self.fresh_id("v"),
            prodige_id: Some(payload.prodige_id.clone()),
            title: Some(payload.title.clone()),
            description: Some(payload.description.clone()),
            url: Some(payload.url.clone()),
            status: Some(payload.status),
            ..Default::default()
        };
        self.videos.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("videos.delete {id}"))?;
        let mut videos = self.videos.lock().unwrap();
        let before = videos.len();
        videos.retain(|v| v.id != id);
        if videos.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl ModerationApi for FakeBackend {
    async fn moderate(&self, id: &str, request: &ModerationRequest) -> Result<VideoRecord, ApiError> {
        self.record(format!("videos.moderate {id} {}", request.status))?;
        self.moderation_requests
            .lock()
            .unwrap()
            .push((id.to_string(), request.clone()));
        self.pass_gate().await;

        let mut videos = self.videos.lock().unwrap();
        let video = videos.iter_mut().find(|v| v.id == id).ok_or_else(not_found)?;
        video.status = Some(request.status);
        video.moderation_comment = request.comment.clone();
        Ok(video.clone())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn owner() -> SessionContext {
    SessionContext::new("u1", UserRole::Prodige)
}

pub fn admin() -> SessionContext {
    SessionContext::new("admin-1", UserRole::Admin)
}

pub fn prodige(id: &str, first_name: &str, tags: &[u8]) -> ProdigeRecord {
    ProdigeRecord {
        id: id.to_string(),
        user_id: Some("u1".to_string()),
        first_name: Some(first_name.to_string()),
        last_name: Some("Lopes".to_string()),
        age: Some(15),
        sport: Some(2),
        description: Some("Point guard".to_string()),
        tags: Some(tags.to_vec()),
        country: Some("PT".to_string()),
        gender: Some(2),
        ..Default::default()
    }
}

pub fn video(id: &str, status: ModerationStatus) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        prodige_id: Some("p1".to_string()),
        title: Some(format!("Highlights {id}")),
        url: Some(format!("videos/{id}.mp4")),
        status: Some(status),
        ..Default::default()
    }
}

pub fn draft(first_name: &str, tags: Vec<TraitTag>) -> ProdigeDraft {
    ProdigeDraft {
        first_name: first_name.to_string(),
        last_name: "Lopes".to_string(),
        age: 15,
        sport: Sport::Basketball,
        description: "Point guard".to_string(),
        tags,
        country: "PT".to_string(),
        gender: Gender::Female,
    }
}

pub fn three_tags() -> Vec<TraitTag> {
    TraitTag::ALL[..3].to_vec()
}

pub fn prodige_store(policy: WritePolicy) -> Arc<EntityListStore<caviar_core::prodige::Prodige>> {
    Arc::new(EntityListStore::new(Default::default(), policy))
}

pub fn video_store(records: Vec<VideoRecord>) -> Arc<EntityListStore<Video>> {
    let store = Arc::new(EntityListStore::<Video>::default());
    store.set_all(records);
    store
}
