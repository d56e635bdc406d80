//! HTTP API for the Lumina web UI.
//!
//! Sessions are in-memory only: created on demand, dropped after idle
//! timeout or explicit delete, never persisted. Model calls run outside
//! the session lock so one slow generation does not stall the server.

use anyhow::Result;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::catalog::{CLOTHING_ITEMS, ClothingItem, SCENES, Scene};
use crate::config::Config;
use crate::gemini::{GeminiClient, GenerativeBackend};
use crate::studio::{
    AnalysisData, ChatMessage, GenerationSettings, Segment, StudioError, StudioSession, advisor,
    analysis, markup, tryon,
};

pub struct Server {
    config: Config,
}

struct SessionEntry {
    session: StudioSession,
    last_accessed: Instant,
}

struct AppState {
    config: Config,
    backend: Arc<dyn GenerativeBackend>,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl Server {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let backend = GeminiClient::new(&self.config.gemini)?;
        if !backend.is_configured() {
            warn!("Gemini API key is not configured; model calls will fail");
        }

        let state = Arc::new(AppState {
            config: self.config.clone(),
            backend: Arc::new(backend),
            sessions: Mutex::new(HashMap::new()),
        });

        // Drop sessions that have been idle past the configured timeout.
        let cleanup_state = state.clone();
        let timeout = Duration::from_secs(self.config.studio.session_timeout_minutes * 60);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                cleanup_expired_sessions(&cleanup_state, timeout).await;
            }
        });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .route("/health", get(health_check))
            .route("/api/status", get(status))
            .route("/api/catalog", get(get_catalog))
            .route("/api/scenes", get(get_scenes))
            .route("/api/sessions", post(create_session))
            .route("/api/sessions", get(list_sessions))
            .route("/api/sessions/{session_id}", get(get_session))
            .route("/api/sessions/{session_id}", delete(delete_session))
            .route("/api/sessions/{session_id}/photo", post(set_photo))
            .route("/api/sessions/{session_id}/wardrobe", post(upload_wardrobe))
            .route("/api/sessions/{session_id}/studio", post(update_studio))
            .route("/api/sessions/{session_id}/analyze", post(analyze))
            .route("/api/sessions/{session_id}/tryon", post(try_on))
            .route("/api/sessions/{session_id}/chat", post(chat))
            .route("/api/sessions/{session_id}/reset", post(reset_session))
            .layer(cors)
            .with_state(state);

        let addr: SocketAddr =
            format!("{}:{}", self.config.server.bind, self.config.server.port).parse()?;

        info!("Starting HTTP server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

// Error response type
struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({"error": self.1}))).into_response()
    }
}

impl AppError {
    fn not_found() -> Self {
        Self(StatusCode::NOT_FOUND, "Session not found".to_string())
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, message.into())
    }
}

impl From<StudioError> for AppError {
    fn from(e: StudioError) -> Self {
        // Generation failures are retryable upstream problems.
        Self(StatusCode::BAD_GATEWAY, e.to_string())
    }
}

async fn cleanup_expired_sessions(state: &Arc<AppState>, timeout: Duration) {
    let mut sessions = state.sessions.lock().await;
    let before_count = sessions.len();

    sessions.retain(|id, entry| {
        let expired = entry.last_accessed.elapsed() > timeout;
        if expired {
            debug!("Expiring session: {}", id);
        }
        !expired
    });

    let removed = before_count - sessions.len();
    if removed > 0 {
        info!("Cleaned up {} expired sessions", removed);
    }
}

/// Run a closure against a live session, bumping its access time.
async fn with_session<T>(
    state: &Arc<AppState>,
    session_id: &str,
    f: impl FnOnce(&mut StudioSession) -> T,
) -> Result<T, AppError> {
    let mut sessions = state.sessions.lock().await;
    let entry = sessions.get_mut(session_id).ok_or_else(AppError::not_found)?;
    entry.last_accessed = Instant::now();
    Ok(f(&mut entry.session))
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct StatusResponse {
    version: String,
    text_model: String,
    image_model: String,
    active_sessions: usize,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let sessions = state.sessions.lock().await;

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        text_model: state.config.gemini.text_model.clone(),
        image_model: state.config.gemini.image_model.clone(),
        active_sessions: sessions.len(),
    })
}

async fn get_catalog() -> Json<&'static Vec<ClothingItem>> {
    Json(&*CLOTHING_ITEMS)
}

async fn get_scenes() -> Json<&'static Vec<Scene>> {
    Json(&*SCENES)
}

// Session management endpoints
#[derive(Deserialize, Default)]
struct CreateSessionRequest {
    session_id: Option<String>,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: String,
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> Response {
    let mut sessions = state.sessions.lock().await;

    // Reuse an existing session when the caller presents its id.
    if let Some(ref id) = request.session_id {
        if let Some(entry) = sessions.get_mut(id) {
            entry.last_accessed = Instant::now();
            return Json(SessionResponse {
                session_id: id.clone(),
            })
            .into_response();
        }
    }

    if sessions.len() >= state.config.studio.max_sessions {
        if let Some(oldest_id) = sessions
            .iter()
            .min_by_key(|(_, e)| e.last_accessed)
            .map(|(id, _)| id.clone())
        {
            sessions.remove(&oldest_id);
            info!("Removed oldest session {} to make room", oldest_id);
        }
    }

    let session = StudioSession::new();
    let session_id = session.id().to_string();
    sessions.insert(
        session_id.clone(),
        SessionEntry {
            session,
            last_accessed: Instant::now(),
        },
    );

    info!("Created new session: {}", session_id);
    Json(SessionResponse { session_id }).into_response()
}

#[derive(Serialize)]
struct SessionInfo {
    session_id: String,
    idle_seconds: u64,
}

#[derive(Serialize)]
struct ListSessionsResponse {
    sessions: Vec<SessionInfo>,
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<ListSessionsResponse> {
    let sessions = state.sessions.lock().await;

    let session_list: Vec<SessionInfo> = sessions
        .iter()
        .map(|(id, entry)| SessionInfo {
            session_id: id.clone(),
            idle_seconds: entry.last_accessed.elapsed().as_secs(),
        })
        .collect();

    Json(ListSessionsResponse {
        sessions: session_list,
    })
}

#[derive(Serialize)]
struct SessionSnapshot {
    session_id: String,
    created_at: DateTime<Utc>,
    has_photo: bool,
    selected_item: Option<String>,
    scene_id: String,
    settings: GenerationSettings,
    transcript: Vec<ChatMessage>,
    analysis: AnalysisData,
    generated_image: Option<String>,
    wardrobe: Vec<ClothingItem>,
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = with_session(&state, &session_id, |session| SessionSnapshot {
        session_id: session.id().to_string(),
        created_at: session.created_at(),
        has_photo: session.original_photo().is_some(),
        selected_item: session.selected_item().map(str::to_string),
        scene_id: session.scene().id.clone(),
        settings: session.settings.clone(),
        transcript: session.transcript.clone(),
        analysis: session.analysis.clone(),
        generated_image: session.generated_image().map(str::to_string),
        wardrobe: session.catalog.custom_items().to_vec(),
    })
    .await?;

    Ok(Json(snapshot))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    let mut sessions = state.sessions.lock().await;

    if sessions.remove(&session_id).is_some() {
        info!("Deleted session: {}", session_id);
        Json(json!({"deleted": true, "session_id": session_id})).into_response()
    } else {
        AppError::not_found().into_response()
    }
}

async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    with_session(&state, &session_id, |session| session.reset()).await?;
    Ok(Json(json!({"reset": true})).into_response())
}

#[derive(Deserialize)]
struct SetPhotoRequest {
    /// The captured or uploaded photo as a data URI.
    image: String,
}

async fn set_photo(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<SetPhotoRequest>,
) -> Result<Response, AppError> {
    if !crate::imagery::is_data_uri(&request.image) {
        return Err(AppError::bad_request("photo must be a data URI"));
    }

    with_session(&state, &session_id, |session| {
        session.set_photo(request.image);
    })
    .await?;

    Ok(Json(json!({"ok": true})).into_response())
}

#[derive(Deserialize)]
struct WardrobeUploadRequest {
    #[serde(default)]
    name: String,
    image: String,
}

async fn upload_wardrobe(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<WardrobeUploadRequest>,
) -> Result<Json<ClothingItem>, AppError> {
    let item = with_session(&state, &session_id, |session| {
        session.catalog.add_custom(&request.name, &request.image)
    })
    .await?
    .map_err(|e| AppError::bad_request(e.to_string()))?;

    Ok(Json(item))
}

#[derive(Deserialize, Default)]
struct StudioUpdateRequest {
    item_id: Option<String>,
    scene_id: Option<String>,
    pose: Option<String>,
    expression: Option<String>,
}

async fn update_studio(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<StudioUpdateRequest>,
) -> Result<Response, AppError> {
    with_session(&state, &session_id, |session| {
        if let Some(ref id) = request.item_id {
            if !session.select_item(id) {
                return Err(AppError::bad_request(format!("unknown item: {id}")));
            }
        }
        if let Some(ref id) = request.scene_id {
            if !session.select_scene(id) {
                return Err(AppError::bad_request(format!("unknown scene: {id}")));
            }
        }
        if let Some(pose) = request.pose {
            session.settings.pose = pose;
        }
        if let Some(expression) = request.expression {
            session.settings.expression = expression;
        }
        Ok(())
    })
    .await??;

    Ok(Json(json!({"ok": true})).into_response())
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<AnalysisData>, AppError> {
    let (photo, catalog) = with_session(&state, &session_id, |session| {
        (
            session.original_photo().map(str::to_string),
            session.catalog.clone(),
        )
    })
    .await?;

    let photo = photo.ok_or_else(|| AppError::bad_request("no photo uploaded"))?;

    // Model call happens without the session lock held.
    let data = analysis::analyze_photo(state.backend.as_ref(), &catalog, &photo).await;

    with_session(&state, &session_id, |session| {
        session.analysis = data.clone();
    })
    .await?;

    Ok(Json(data))
}

#[derive(Deserialize, Default)]
struct TryOnRequest {
    /// Overrides the studio selection; used by the one-click try-on
    /// action on chat recommendation cards.
    item_id: Option<String>,
}

#[derive(Serialize)]
struct TryOnResponse {
    image: String,
    /// False when a newer try-on superseded this result before it
    /// finished; the returned image was not applied to the session.
    applied: bool,
}

async fn try_on(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<TryOnRequest>,
) -> Result<Json<TryOnResponse>, AppError> {
    let (photo, item, scene, settings, ticket) =
        with_session(&state, &session_id, |session| {
            let photo = session
                .original_photo()
                .map(str::to_string)
                .ok_or_else(|| AppError::bad_request("no photo uploaded"))?;

            if let Some(ref id) = request.item_id {
                if !session.select_item(id) {
                    return Err(AppError::bad_request(format!("unknown item: {id}")));
                }
            }
            let item_id = session
                .selected_item()
                .map(str::to_string)
                .ok_or_else(|| AppError::bad_request("no item selected"))?;
            let item = session
                .catalog
                .find(&item_id)
                .cloned()
                .ok_or_else(|| AppError::bad_request(format!("unknown item: {item_id}")))?;

            let scene = session.scene().clone();
            let settings = session.settings.clone();
            let ticket = session.begin_try_on();
            Ok((photo, item, scene, settings, ticket))
        })
        .await??;

    let image = tryon::render(
        state.backend.as_ref(),
        &photo,
        &item,
        &scene,
        &settings.pose,
        &settings.expression,
    )
    .await?;

    let applied = with_session(&state, &session_id, |session| {
        session.complete_try_on(ticket, image.clone())
    })
    .await?;

    if !applied {
        debug!("discarding stale try-on result for session {}", session_id);
    }

    Ok(Json(TryOnResponse { image, applied }))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    segments: Vec<Segment>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::bad_request("empty message"));
    }

    let (catalog, transcript) = with_session(&state, &session_id, |session| {
        (session.catalog.clone(), session.transcript.clone())
    })
    .await?;

    // Best-effort by construction: a failed call comes back as the
    // fixed apology, never as an error.
    let reply = advisor::reply(state.backend.as_ref(), &catalog, &transcript, &request.message)
        .await;

    let segments = with_session(&state, &session_id, |session| {
        session.transcript.push(ChatMessage::user(request.message.as_str()));
        session.transcript.push(ChatMessage::model(reply.as_str()));
        markup::resolve(&reply, &session.catalog)
    })
    .await?;

    Ok(Json(ChatResponse { reply, segments }))
}
