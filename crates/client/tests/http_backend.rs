//! `HttpBackend` against an in-process axum backend bound to an ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use caviar_client::{ApiError, HttpBackend, ModerationApi, ProdigeApi, VideoApi};
use caviar_core::moderation::{ModerationRequest, ModerationStatus};
use caviar_core::prodige::{ProdigePayload, ProdigeRecord};
use caviar_core::video::{VideoPayload, VideoRecord};

#[derive(Default)]
struct Backend {
    prodiges: Mutex<Vec<ProdigeRecord>>,
    videos: Mutex<Vec<VideoRecord>>,
    seen_headers: Mutex<Vec<HeaderMap>>,
    last_moderation: Mutex<Option<ModerationRequest>>,
}

type Shared = Arc<Backend>;

fn record_from(id: String, payload: &ProdigePayload) -> ProdigeRecord {
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

async fn list_prodiges(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<ProdigeRecord>> {
    backend.seen_headers.lock().unwrap().push(headers);
    let owner = query.get("userId").cloned();
    let items = backend
        .prodiges
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.user_id == owner)
        .cloned()
        .collect();
    Json(items)
}

async fn create_prodige(
    State(backend): State<Shared>,
    Json(payload): Json<ProdigePayload>,
) -> impl IntoResponse {
    let mut prodiges = backend.prodiges.lock().unwrap();
    let record = record_from(format!("p{}", prodiges.len() + 1), &payload);
    prodiges.push(record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn update_prodige(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(payload): Json<ProdigePayload>,
) -> impl IntoResponse {
    let mut prodiges = backend.prodiges.lock().unwrap();
    match prodiges.iter_mut().find(|p| p.id == id) {
        Some(existing) => {
            *existing = record_from(id, &payload);
            (StatusCode::OK, Json(serde_json::to_value(&*existing).unwrap()))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not found" })),
        ),
    }
}

async fn delete_prodige(State(backend): State<Shared>, Path(id): Path<String>) -> StatusCode {
    backend.prodiges.lock().unwrap().retain(|p| p.id != id);
    StatusCode::NO_CONTENT
}

async fn list_videos(
    State(backend): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<VideoRecord>> {
    let videos = backend.videos.lock().unwrap();
    let items = videos
        .iter()
        .filter(|v| match query.get("prodigeId") {
            Some(pid) => v.prodige_id.as_deref() == Some(pid.as_str()),
            None => true,
        })
        .filter(|v| match query.get("status") {
            Some(status) => v.status.map(|s| s.as_str()) == Some(status.as_str()),
            None => true,
        })
        .cloned()
        .collect();
    Json(items)
}

async fn create_video(
    State(backend): State<Shared>,
    Json(payload): Json<VideoPayload>,
) -> impl IntoResponse {
    let mut videos = backend.videos.lock().unwrap();
    let record = VideoRecord {
        id: format!("v{}", videos.len() + 1),
        prodige_id: Some(payload.prodige_id),
        title: Some(payload.title),
        description: Some(payload.description),
        url: Some(payload.url),
        status: Some(payload.status),
        ..Default::default()
    };
    videos.push(record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn delete_video(State(backend): State<Shared>, Path(id): Path<String>) -> StatusCode {
    backend.videos.lock().unwrap().retain(|v| v.id != id);
    StatusCode::NO_CONTENT
}

async fn moderate_video(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(request): Json<ModerationRequest>,
) -> impl IntoResponse {
    *backend.last_moderation.lock().unwrap() = Some(request.clone());
    let mut videos = backend.videos.lock().unwrap();
    match videos.iter_mut().find(|v| v.id == id) {
        Some(video) => {
            video.status = Some(request.status);
            video.moderation_comment = request.comment;
            (StatusCode::OK, Json(serde_json::to_value(&*video).unwrap()))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "video not found" })),
        ),
    }
}

async fn spawn_backend(backend: Shared) -> String {
    let app = Router::new()
        .route("/api/v1/prodiges", get(list_prodiges).post(create_prodige))
        .route(
            "/api/v1/prodiges/{id}",
            put(update_prodige).delete(delete_prodige),
        )
        .route("/api/v1/videos", get(list_videos).post(create_video))
        .route("/api/v1/videos/{id}", axum::routing::delete(delete_video))
        .route("/api/v1/videos/{id}/moderation", patch(moderate_video))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

fn payload(owner: &str) -> ProdigePayload {
    ProdigePayload {
        user_id: owner.to_string(),
        first_name: "Ana".to_string(),
        last_name: "Lopes".to_string(),
        age: 15,
        sport: 2,
        description: "Point guard".to_string(),
        tags: vec![1, 4, 5],
        country: "PT".to_string(),
        gender: 2,
    }
}

async fn client(backend: &Shared) -> HttpBackend {
    let base = spawn_backend(Arc::clone(backend)).await;
    HttpBackend::new(&base, Duration::from_secs(5))
        .unwrap()
        .with_bearer_token("token-123")
}

#[tokio::test]
async fn prodige_crud_round_trip() {
    let backend = Shared::default();
    let http = client(&backend).await;

    let created = ProdigeApi::create(&http, &payload("u1")).await.unwrap();
    assert_eq!(created.id, "p1");
    assert_eq!(created.tags, Some(vec![1, 4, 5]));

    let mut changed = payload("u1");
    changed.first_name = "Ana Maria".to_string();
    let updated = ProdigeApi::update(&http, "p1", &changed).await.unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Ana Maria"));

    let listed = ProdigeApi::list(&http, "u1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(ProdigeApi::list(&http, "someone-else").await.unwrap().is_empty());

    ProdigeApi::delete(&http, "p1").await.unwrap();
    assert!(ProdigeApi::list(&http, "u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn requests_carry_bearer_token_and_request_id() {
    let backend = Shared::default();
    let http = client(&backend).await;

    ProdigeApi::list(&http, "u1").await.unwrap();

    let headers = backend.seen_headers.lock().unwrap();
    let first = &headers[0];
    assert_eq!(first.get("authorization").unwrap(), "Bearer token-123");
    let request_id = first.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(request_id.len(), 36);
}

#[tokio::test]
async fn non_success_status_becomes_status_error() {
    let backend = Shared::default();
    let http = client(&backend).await;

    let err = ProdigeApi::update(&http, "missing", &payload("u1"))
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::Status { status: 404, ref body } if body.contains("not found"));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn videos_filter_by_parent_and_status() {
    let backend = Shared::default();
    let http = client(&backend).await;

    for (parent, title) in [("p1", "Dribbles"), ("p1", "Goals"), ("p2", "Sprint")] {
        VideoApi::create(
            &http,
            &VideoPayload {
                prodige_id: parent.to_string(),
                title: title.to_string(),
                description: String::new(),
                url: format!("videos/{title}.mp4"),
                status: ModerationStatus::Pending,
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(http.list_for_prodige("p1").await.unwrap().len(), 2);

    let approved = http
        .moderate(
            "v3",
            &ModerationRequest {
                status: ModerationStatus::Approved,
                comment: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.status, Some(ModerationStatus::Approved));

    let pending = http.list_by_status(ModerationStatus::Pending).await.unwrap();
    let ids: Vec<_> = pending.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2"]);

    VideoApi::delete(&http, "v1").await.unwrap();
    assert_eq!(http.list_for_prodige("p1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejection_sends_status_and_comment() {
    let backend = Shared::default();
    backend.videos.lock().unwrap().push(VideoRecord {
        id: "v9".to_string(),
        prodige_id: Some("p1".to_string()),
        status: Some(ModerationStatus::Pending),
        ..Default::default()
    });
    let http = client(&backend).await;

    let record = http
        .moderate(
            "v9",
            &ModerationRequest {
                status: ModerationStatus::Rejected,
                comment: Some("poor quality".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(record.moderation_comment.as_deref(), Some("poor quality"));
    assert_eq!(
        backend.last_moderation.lock().unwrap().clone(),
        Some(ModerationRequest {
            status: ModerationStatus::Rejected,
            comment: Some("poor quality".to_string()),
        })
    );
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let http = HttpBackend::new(&format!("http://{addr}/api/v1"), Duration::from_secs(2)).unwrap();
    let err = ProdigeApi::list(&http, "u1").await.unwrap_err();
    assert_matches!(err, ApiError::Request(_));
}
