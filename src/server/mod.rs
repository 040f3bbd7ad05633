//! JSON API over the shared tutor state

pub mod http;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::flashcards::{FallbackChain, SeedFile};
use crate::store::{FileStorage, TutorState};
use crate::vr::VrBridge;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub tutor: TutorState,
    pub bridge: VrBridge,
    /// Seed data served at `/vr/seeds.json` and `/api/flashcards`
    pub seeds: Arc<SeedFile>,
}

impl ServerState {
    /// Build from config, using its flashcard sources
    pub fn new(config: Config, tutor: TutorState) -> Result<Self> {
        let chain = FallbackChain::from_config(&config, Client::new());
        Self::with_chain(config, tutor, chain)
    }

    pub fn with_chain(config: Config, tutor: TutorState, chain: FallbackChain) -> Result<Self> {
        let seeds = load_seeds(&config)?;
        let bridge = VrBridge::from_config(tutor.clone(), chain, &config);
        Ok(Self {
            config: Arc::new(config),
            tutor,
            bridge,
            seeds: Arc::new(seeds),
        })
    }
}

fn load_seeds(config: &Config) -> Result<SeedFile> {
    match &config.flashcards.seeds_path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read seed file {}", path.display()))?;
            SeedFile::parse(&contents).context("Failed to parse seed file")
        }
        None => SeedFile::bundled().context("Bundled seed file is malformed"),
    }
}

/// All routes, without CORS or tracing layers
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/status", get(http::status_handler))
        .route("/api/topics", get(http::topics_handler))
        .route("/api/flashcards", get(http::flashcards_handler))
        .route("/vr/seeds.json", get(http::seeds_handler))
        .route("/api/auth/sign-in", post(http::sign_in_handler))
        .route("/api/auth/sign-up", post(http::sign_up_handler))
        .route("/api/auth/logout", post(http::logout_handler))
        .route("/api/state", get(http::state_handler))
        .route("/api/navigate", get(http::navigate_handler))
        .route("/api/onboarding", post(http::onboarding_handler))
        .route("/api/learn", get(http::learn_handler))
        .route("/api/learn/complete", post(http::learn_complete_handler))
        .route("/api/dashboard", get(http::dashboard_handler))
        .route(
            "/api/profile",
            get(http::profile_handler).put(http::profile_update_handler),
        )
        .route("/api/settings/vr-mode", post(http::toggle_vr_mode_handler))
        .route("/api/settings/demo-mode", post(http::demo_mode_handler))
        .route("/api/vr/scene", get(http::vr_scene_handler))
        .route("/api/vr/state", get(http::vr_state_handler))
        .route("/api/vr/message", post(http::vr_message_handler))
        .route("/api/vr/topic", post(http::vr_topic_handler))
        .route("/api/vr/complete", post(http::vr_complete_handler))
        .route("/api/vr/open-video", post(http::vr_open_video_handler))
        .route("/api/vr/hotspot", post(http::vr_hotspot_handler))
        .with_state(state)
}

/// Start the web server
pub async fn start(config: Config, host: &str, port: u16) -> Result<()> {
    let storage = FileStorage::from_config(&config)?;
    let tutor = TutorState::load(Arc::new(storage));
    let state = ServerState::new(config, tutor)?;

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid server address")?;

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let storage_location = state.tutor.storage_location();
    let app = router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    println!("NEET Tutor server");
    println!("  State: {}", storage_location);
    println!("  Listening on http://{}", addr);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
