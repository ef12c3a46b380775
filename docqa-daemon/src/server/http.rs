//! HTTP routes and handlers for the docqa daemon API.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, Path, Request, State,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use docqa_core::escape_markup;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::error::ApiError;
use super::files::{
    allowed_media_kind, is_valid_session_id, resolve_in, sanitize_filename, stored_filename,
    upload_nonce,
};
use super::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index = ServeFile::new(state.static_dir.join("index.html"));
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        // Front-end
        .route_service("/", index)
        .route("/js/*file", get(serve_js))
        // Health and status
        .route("/health", get(health))
        .route("/status", get(status))
        // Documents
        .route("/upload", post(upload))
        .route("/uploads/:filename", get(serve_upload))
        .route("/cleanup", post(cleanup))
        // Questions
        .route("/chat", post(chat))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// =============================================================================
// Health & Status
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "docqa-daemon"
    }))
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    sessions: usize,
    remote_inference: bool,
    upload_dir: String,
    uptime_seconds: f64,
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "running",
        sessions: state.sessions.len(),
        remote_inference: state.answering.has_backend(),
        upload_dir: state.upload_dir.display().to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

// =============================================================================
// Static Files
// =============================================================================

async fn serve_js(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
    request: Request,
) -> Response {
    serve_from(&state.static_dir.join("js"), &file, request).await
}

async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    serve_from(&state.upload_dir, &filename, request).await
}

async fn serve_from(dir: &FsPath, requested: &str, request: Request) -> Response {
    let Some(path) = resolve_in(dir, requested) else {
        warn!("Attempted access to invalid file: {}", requested);
        return ApiError::NotFound("File not found").into_response();
    };

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

// =============================================================================
// Upload & Cleanup
// =============================================================================

#[derive(Serialize)]
struct UploadResponse {
    text: String,
    filename: String,
    #[serde(rename = "isImage")]
    is_image: bool,
}

fn multipart_error(e: MultipartError) -> ApiError {
    warn!("Malformed upload: {}", e.body_text());
    ApiError::Status {
        status: e.status(),
        message: "Upload failed",
    }
}

async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::BadRequest("No file uploaded"))?;

    let mut file: Option<(String, Bytes)> = None;
    let mut session_id = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((original, data));
            }
            "sessionId" => {
                let text = field.text().await.map_err(multipart_error)?;
                session_id = text.trim().to_string();
            }
            _ => {}
        }
    }

    let Some((original_name, data)) = file else {
        return Err(ApiError::BadRequest("No file uploaded"));
    };
    if original_name.is_empty() {
        return Err(ApiError::BadRequest("No file selected"));
    }
    if !is_valid_session_id(&session_id) {
        return Err(ApiError::BadRequest("Invalid session ID"));
    }

    let safe_name =
        sanitize_filename(&original_name).ok_or(ApiError::BadRequest("Invalid filename"))?;
    let kind =
        allowed_media_kind(&safe_name).ok_or(ApiError::BadRequest("File type not allowed"))?;

    let filename = stored_filename(
        &session_id,
        Utc::now().timestamp(),
        &upload_nonce(),
        &safe_name,
    );
    let path = state.upload_dir.join(&filename);

    tokio::fs::write(&path, &data).await.map_err(|e| {
        error!("Failed to save upload {}: {}", filename, e);
        ApiError::Internal("Upload failed")
    })?;
    info!("File uploaded: {} ({} bytes)", filename, data.len());

    state.sessions.add_file(&session_id, path.clone());

    match state.extractor.extract(&path, kind).await {
        Ok(text) => {
            let escaped = escape_markup(&text).into_owned();
            state.sessions.set_context(&session_id, text);
            Ok(Json(UploadResponse {
                text: escaped,
                filename,
                is_image: kind.is_image(),
            }))
        }
        Err(e) => {
            error!("File processing error for {}: {}", filename, e);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove {:?}: {}", path, e);
            }
            state.sessions.remove_file(&session_id, &path);
            Err(ApiError::Internal("File processing failed"))
        }
    }
}

#[derive(Deserialize)]
struct CleanupRequest {
    #[serde(rename = "sessionId", default)]
    session_id: String,
}

async fn cleanup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CleanupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::BadRequest("Invalid request"))?;
    let session_id = req.session_id.trim();

    if !session_id.is_empty() {
        if let Some(session) = state.sessions.delete(session_id) {
            for path in &session.files {
                match tokio::fs::remove_file(path).await {
                    Ok(()) => info!("Cleaned up file: {:?}", path),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!("Failed to remove file {:?}: {}", path, e),
                }
            }
        }
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    query: String,
    #[serde(rename = "sessionId", default)]
    session_id: String,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::BadRequest("Invalid request"))?;
    let query = req.query.trim();
    let session_id = req.session_id.trim();

    info!("QUESTION: {}", escape_markup(query));

    if query.is_empty() {
        return Err(ApiError::BadRequest("Query required"));
    }

    let context = if session_id.is_empty() {
        None
    } else {
        state.sessions.context(session_id)
    };
    let Some(context) = context else {
        return Err(ApiError::BadRequest("No document available"));
    };
    if context.trim().is_empty() {
        return Err(ApiError::BadRequest("Document content is empty"));
    }

    let answer = state.answering.answer(query, &context).await;
    info!("ANSWER: {}", escape_markup(&answer));

    Ok(Json(ChatResponse { answer }))
}
