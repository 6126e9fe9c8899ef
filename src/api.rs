//! HTTP surface for docsift.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /process?filename=<name>` – Run the pipeline on the uploaded request body. The bytes are
//!   written to a temporary file that keeps the uploaded name's extension, so classification
//!   behaves as it does for files on disk. Returns
//!   `{ file_name, file_size, elapsed_ms, processed_at, result }`.
//! - `GET /health` – Liveness probe.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The HTTP surface shares the same [`ProcessingApi`] implementation with the CLI, so behavior is
//! identical across interfaces.

use crate::processing::{ProcessingApi, ProcessingResult};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Build the HTTP router exposing the processing API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: ProcessingApi + 'static,
{
    Router::new()
        .route("/process", post(process_upload::<S>))
        .route("/health", get(health))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The `filename` query parameter was absent or blank.
    #[error("Missing `filename` query parameter")]
    MissingFilename,
    /// The request body was empty.
    #[error("Uploaded file is empty")]
    EmptyUpload,
    /// The upload could not be staged on disk.
    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingFilename | Self::EmptyUpload => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Query string for `POST /process`.
#[derive(Deserialize)]
struct ProcessQuery {
    /// Uploaded file name; its extension drives classification fallback.
    #[serde(default)]
    filename: Option<String>,
}

/// Success response for `POST /process`.
#[derive(Serialize)]
struct ProcessResponse {
    file_name: String,
    file_size: usize,
    elapsed_ms: u128,
    processed_at: String,
    result: ProcessingResult,
}

/// Stage the uploaded bytes in a temporary file and run the pipeline on it.
///
/// The temporary file is removed when its handle drops, on every exit path.
async fn process_upload<S>(
    State(service): State<Arc<S>>,
    Query(query): Query<ProcessQuery>,
    body: Bytes,
) -> Result<Json<ProcessResponse>, ServerError>
where
    S: ProcessingApi,
{
    let file_name = query
        .filename
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(ServerError::MissingFilename)?;
    if body.is_empty() {
        return Err(ServerError::EmptyUpload);
    }

    let suffix = Path::new(&file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let staged = {
        let body = body.clone();
        tokio::task::spawn_blocking(move || stage_upload(&suffix, &body))
            .await
            .map_err(std::io::Error::other)??
    };
    tracing::debug!(
        file_name = %file_name,
        staged = %staged.path().display(),
        bytes = body.len(),
        "Staged upload"
    );

    let started = Instant::now();
    let result = service.process(staged.path()).await;
    let elapsed_ms = started.elapsed().as_millis();
    tracing::info!(
        file_name = %file_name,
        file_type = %result.file_type,
        file_size = body.len(),
        elapsed_ms,
        "Process request completed"
    );

    Ok(Json(ProcessResponse {
        file_name,
        file_size: body.len(),
        elapsed_ms,
        processed_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        result,
    }))
}

/// Write the upload to a temporary file whose name ends with `suffix`.
fn stage_upload(suffix: &str, body: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix("docsift-upload-")
        .suffix(suffix)
        .tempfile()?;
    staged.write_all(body)?;
    staged.flush()?;
    Ok(staged)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "process",
                method: "POST",
                path: "/process?filename=<name>",
                description: "Classify, extract, and summarize the uploaded file (raw request body). Supports PDF, text, CSV, and Excel. Response returns { \"file_name\", \"file_size\", \"elapsed_ms\", \"processed_at\", \"result\" }.",
                request_example: Some(json!({
                    "query": { "filename": "report.pdf" },
                    "body": "<raw file bytes>"
                })),
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Liveness probe returning { \"status\": \"ok\" }.",
                request_example: None,
            },
            CommandDescriptor {
                name: "commands",
                method: "GET",
                path: "/commands",
                description: "Return this command catalog.",
                request_example: None,
            },
        ],
    })
}
