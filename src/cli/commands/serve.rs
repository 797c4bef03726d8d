//! HTTP API server for integration with other systems.
//!
//! Mirrors the CLI read/ask surface as a small JSON API.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::store::Episode;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(&settings)?;

    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/episodes", get(list_episodes))
        .route("/episodes/{episode_number}", get(get_episode))
        .route("/episodes/{episode_number}/summary", post(summary))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("List Episodes", "GET  /episodes?processed=true");
    Output::kv("Get Episode", "GET  /episodes/:episode_number");
    Output::kv("Summary", "POST /episodes/:episode_number/summary");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct EpisodesQuery {
    /// When true, list only processed episodes.
    #[serde(default)]
    processed: bool,
}

#[derive(Serialize)]
struct EpisodeInfo {
    episode_number: i64,
    title: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_date: Option<String>,
    processed: bool,
    has_transcript: bool,
    has_summary: bool,
}

impl From<&Episode> for EpisodeInfo {
    fn from(episode: &Episode) -> Self {
        Self {
            episode_number: episode.episode_number,
            title: episode.title.clone(),
            url: episode.url.clone(),
            published_date: episode.published_date.clone(),
            processed: episode.processed,
            has_transcript: episode.has_transcript(),
            has_summary: episode.summary.is_some(),
        }
    }
}

#[derive(Serialize)]
struct EpisodeListResponse {
    episodes: Vec<EpisodeInfo>,
    total: usize,
}

#[derive(Deserialize)]
struct AskRequest {
    episode_number: i64,
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    episode_number: i64,
    question: String,
    answer: String,
}

#[derive(Serialize)]
struct SummaryResponse {
    episode_number: i64,
    summary: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EpisodesQuery>,
) -> impl IntoResponse {
    let episodes = if query.processed {
        state.pipeline.tracker().list_processed().await
    } else {
        state.pipeline.tracker().list_all().await
    };

    Json(EpisodeListResponse {
        total: episodes.len(),
        episodes: episodes.iter().map(EpisodeInfo::from).collect(),
    })
}

async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path(episode_number): Path<i64>,
) -> impl IntoResponse {
    match state.pipeline.tracker().get(episode_number).await {
        Some(episode) => Json(EpisodeInfo::from(&episode)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Episode {} not found", episode_number),
            }),
        )
            .into_response(),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    // The synthesizer never fails past its boundary; missing or
    // unprocessed episodes come back as explanatory text.
    let answer = state.pipeline.answer(&req.question, req.episode_number).await;

    Json(AskResponse {
        episode_number: req.episode_number,
        question: req.question,
        answer,
    })
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Path(episode_number): Path<i64>,
) -> impl IntoResponse {
    match state.pipeline.summarize(episode_number).await {
        Some(summary) => Json(SummaryResponse {
            episode_number,
            summary,
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!(
                    "No summary available for episode {}; it may not exist or is not processed",
                    episode_number
                ),
            }),
        )
            .into_response(),
    }
}
