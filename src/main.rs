use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vlmquiz::state::AppState;
use vlmquiz::types::SessionConfig;
use vlmquiz::upstream::{ChallengeClient, TraceClient, UpstreamConfig};
use vlmquiz::{responder, ws};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vlmquiz=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VLM Quiz...");

    let upstream_config = UpstreamConfig::from_env();

    // Fetch the challenge list once; a failed fetch degrades to an empty
    // list rather than refusing to start
    let challenge_client = ChallengeClient::new(&upstream_config);
    let challenges = match challenge_client.fetch_challenges().await {
        Ok(challenges) => {
            tracing::info!("Loaded {} challenges", challenges.len());
            challenges
        }
        Err(e) => {
            tracing::warn!(
                "Failed to fetch challenges: {}. Sessions will start without one.",
                e
            );
            Vec::new()
        }
    };

    // Initialize reply providers (remote VLM endpoint when configured,
    // canned keyword replies as the last resort)
    let responder_config = responder::ResponderConfig::from_env();
    let responder = responder_config.build_manager();
    tracing::info!(
        "Reply providers: {}",
        responder
            .providers
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let trace_client = TraceClient::new(&upstream_config);
    let state = Arc::new(AppState::new(
        challenges,
        responder,
        trace_client,
        SessionConfig::default(),
    ));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = std::env::var("QUIZ_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
