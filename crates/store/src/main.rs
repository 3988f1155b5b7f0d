use std::sync::Arc;

use anyhow::Context;
use caviar_client::HttpBackend;
use caviar_core::moderation::ModerationStatus;
use caviar_store::config::ClientConfig;
use caviar_store::{EntityListStore, ProdigeService, SessionContext, VideoService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caviar_store=debug,caviar_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().context("Invalid client configuration")?;
    let session = SessionContext::from_env().context("Invalid session")?;
    tracing::info!(
        api_url = %config.api_url,
        user_id = %session.user_id,
        role = ?session.role,
        policy = ?config.write_policy,
        "Starting sync"
    );

    let mut backend = HttpBackend::new(&config.api_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    if let Ok(token) = std::env::var("CAVIAR_ACCESS_TOKEN") {
        backend = backend.with_bearer_token(token);
    }
    let backend = Arc::new(backend);

    let defaults = config.normalize_defaults();

    let prodiges = ProdigeService::new(
        Arc::clone(&backend),
        Arc::new(EntityListStore::new(defaults.clone(), config.write_policy)),
    );
    let count = prodiges
        .load(&session)
        .await
        .context("Failed to load prodigies")?;
    tracing::info!(count, "Prodigies synced");

    for prodige in prodiges.store().items() {
        let sport = prodige
            .sport
            .map(|s| s.label(session.language))
            .unwrap_or("-");
        tracing::info!(
            id = %prodige.id,
            name = %prodige.full_name(),
            sport,
            tags = ?prodige.display_tags(session.language),
            "Prodige"
        );
    }

    if session.can_moderate() {
        let videos = VideoService::new(
            Arc::clone(&backend),
            Arc::new(EntityListStore::new(defaults, config.write_policy)),
        );
        let pending = videos
            .load_queue(ModerationStatus::Pending)
            .await
            .context("Failed to load the moderation queue")?;
        tracing::info!(pending, "Moderation queue synced");
    }

    Ok(())
}
