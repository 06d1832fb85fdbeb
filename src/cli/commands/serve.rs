//! HTTP API server for integration with other systems.
//!
//! Exposes the pipeline to form-style front ends: process a path or URL, process an
//! uploaded video, and check a quiz answer. Cross-origin access is limited to
//! `server.allowed_origins`, and local paths can be confined to `server.media_root`.

use crate::audio_source::VideoReference;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::{ExtractionError, VidquizError};
use crate::orchestrator::{Orchestrator, PipelineOutput};
use crate::quiz::{AnswerCheck, QuizOutcome};
use crate::summarization::SummaryStyle;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    /// Canonical directory local inputs must stay inside.
    media_root: Option<PathBuf>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::warning(&format!("{}", e));
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let upload_limit = usize::try_from(settings.extraction.max_upload_bytes).unwrap_or(usize::MAX);
    let cors = cors_layer(&settings.server.allowed_origins)?;
    let media_root = settings
        .server
        .media_root
        .as_deref()
        .map(resolve_media_root)
        .transpose()?;
    let media_root_label = media_root.as_ref().map(|root| root.display().to_string());

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(settings)?,
        media_root,
    });

    let app = router(state, upload_limit, cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Vidquiz API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Process", "POST /process");
    Output::kv("Upload", "POST /process/upload?style=concise");
    Output::kv("Check answer", "POST /quiz/check");
    println!();
    if let Some(root) = &media_root_label {
        Output::kv("Media root", root);
    }
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>, upload_limit: usize, cors: Option<CorsLayer>) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/process", post(process))
        .route(
            "/process/upload",
            post(process_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/quiz/check", post(check_answer));

    match cors {
        Some(cors) => app.layer(cors).with_state(state),
        None => app.with_state(state),
    }
}

/// Build the CORS layer for the configured origins. No origins means no layer,
/// so browsers only reach the API from its own origin.
fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>, VidquizError> {
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin");
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o.trim_end_matches('/')).map_err(|_| {
                    VidquizError::Config(format!("server.allowed_origins: invalid origin '{}'", o))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!("CORS allows {} origin(s)", values.len());
        AllowOrigin::list(values)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any),
    ))
}

fn resolve_media_root(raw: &str) -> Result<PathBuf, VidquizError> {
    Settings::expand_path(raw)
        .canonicalize()
        .map_err(|e| VidquizError::Config(format!("server.media_root '{}': {}", raw, e)))
}

/// Keep a local reference inside the media root. Relative paths resolve against
/// the root; remote references pass through.
fn confine(reference: VideoReference, media_root: Option<&Path>) -> Result<VideoReference, VidquizError> {
    let Some(root) = media_root else {
        return Ok(reference);
    };
    let path = match reference {
        VideoReference::LocalPath(path) => path,
        remote => return Ok(remote),
    };

    let outside = || {
        VidquizError::InvalidInput(format!("{} is outside the media root", path.display()))
    };

    let joined = root.join(&path);
    if path.components().any(|c| matches!(c, Component::ParentDir)) || !joined.starts_with(root) {
        return Err(outside());
    }

    let resolved = joined
        .canonicalize()
        .map_err(|_| ExtractionError::NotFound(path.display().to_string()))?;
    // Symlinks inside the root may point elsewhere.
    if !resolved.starts_with(root) {
        return Err(outside());
    }

    Ok(VideoReference::LocalPath(resolved))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessRequest {
    /// Local file path or http(s) URL
    input: String,
    #[serde(default)]
    style: Option<String>,
}

#[derive(Deserialize)]
struct UploadQuery {
    #[serde(default)]
    style: Option<String>,
}

#[derive(Serialize)]
struct ProcessResponse {
    run_id: String,
    source: String,
    style: SummaryStyle,
    transcript: String,
    transcript_ok: bool,
    summary: String,
    summary_ok: bool,
    quiz: QuizOutcome,
}

impl From<PipelineOutput> for ProcessResponse {
    fn from(output: PipelineOutput) -> Self {
        Self {
            run_id: output.run_id.to_string(),
            source: output.source,
            style: output.style,
            transcript: output.transcript.to_string(),
            transcript_ok: output.transcript.is_recognized(),
            summary: output.summary.to_string(),
            summary_ok: output.summary.is_generated(),
            quiz: output.quiz,
        }
    }
}

#[derive(Deserialize)]
struct QuizCheckRequest {
    quiz: QuizOutcome,
    selection: String,
}

#[derive(Serialize)]
struct QuizCheckResponse {
    #[serde(flatten)]
    check: AnswerCheck,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: VidquizError) -> Response {
    let status = match &e {
        VidquizError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VidquizError::Config(_) | VidquizError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("Request failed ({}): {}", status, e);
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

fn parse_style(style: Option<&str>) -> Result<SummaryStyle, VidquizError> {
    style.map_or(Ok(SummaryStyle::default()), str::parse::<SummaryStyle>)
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Response {
    let style = match parse_style(req.style.as_deref()) {
        Ok(style) => style,
        Err(e) => return error_response(e),
    };
    let reference = match confine(VideoReference::parse(&req.input), state.media_root.as_deref()) {
        Ok(reference) => reference,
        Err(e) => return error_response(e),
    };

    match state.orchestrator.process(&reference, style).await {
        Ok(output) => Json(ProcessResponse::from(output)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn process_upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response {
    let style = match parse_style(query.style.as_deref()) {
        Ok(style) => style,
        Err(e) => return error_response(e),
    };

    match state.orchestrator.process_upload(&body, style).await {
        Ok(output) => Json(ProcessResponse::from(output)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn check_answer(Json(req): Json<QuizCheckRequest>) -> impl IntoResponse {
    let check = req.quiz.check_answer(&req.selection);
    Json(QuizCheckResponse {
        check,
        message: check.to_string(),
    })
}
