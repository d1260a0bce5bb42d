use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivianight::{
    auth,
    config::{ScoringConfig, ServerConfig},
    state::AppState,
    types::Actor,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trivianight=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trivia Night...");

    let server_config = ServerConfig::from_env();
    let auth_config = Arc::new(auth::AuthConfig::from_env());
    let state = Arc::new(AppState::with_scoring(ScoringConfig::from_env()));

    if let Some(path) = &server_config.import_file {
        match state.import_game_file(&Actor::staff(), path, None).await {
            Ok(summary) => tracing::info!(
                "Loaded '{}' from {}",
                summary.game.title,
                path.display()
            ),
            Err(e) => tracing::error!("Could not load {}: {}", path.display(), e),
        }
    }

    let app = trivianight::build_router(state, auth_config);

    let addr = server_config.addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
