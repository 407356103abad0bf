//! API request handlers
//!
//! The upload endpoint answers failures in plain text; health and version
//! use the JSON response wrapper.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::server::AppState;
use crate::error::ConvertError;
use crate::pipeline::render_output;

/// Name of the multipart field carrying the workbook
pub const UPLOAD_FIELD: &str = "file";

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
        }
    }
}

/// GET / - Upload form
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub model_output: String,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        model_output: "Excel layout JSON".to_string(),
    }))
}

fn text_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, message.into()).into_response()
}

/// Map a pipeline failure to a status and a message naming the stage
fn conversion_error(err: &ConvertError) -> Response {
    match err {
        ConvertError::UnreadableWorkbook(_) => text_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Error reading spreadsheet: {}", err),
        ),
        ConvertError::SchemaViolation(msg) => text_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("JSON Validation Error: {}", msg),
        ),
        ConvertError::GenerationService(_)
        | ConvertError::NoJsonFound
        | ConvertError::MalformedJson { .. }
        | ConvertError::InvalidDocument(_) => text_error(
            StatusCode::BAD_GATEWAY,
            format!("Error generating JSON: {}", err),
        ),
        ConvertError::Config(_) | ConvertError::Io(_) | ConvertError::Json(_) => text_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error writing output: {}", err),
        ),
    }
}

/// Final path component of a client-supplied filename
fn upload_basename(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// Storage path for an upload; prefixed so concurrent uploads never collide
fn stored_upload_path(upload_dir: &Path, filename: &str) -> PathBuf {
    upload_dir.join(format!("{}-{}", Uuid::new_v4(), upload_basename(filename)))
}

/// POST /upload - Convert an uploaded workbook and return the JSON as an attachment
pub async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let (filename, bytes) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(UPLOAD_FIELD) {
                    continue;
                }
                // A plain form value named `file` is not a file part
                let Some(filename) = field.file_name().map(str::to_string) else {
                    continue;
                };
                match field.bytes().await {
                    Ok(bytes) => break (filename, bytes),
                    Err(e) => {
                        return text_error(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read upload: {}", e),
                        )
                    }
                }
            }
            Ok(None) => return text_error(StatusCode::BAD_REQUEST, "No file part"),
            Err(e) => {
                return text_error(StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e))
            }
        }
    };

    if upload_basename(&filename).is_empty() {
        return text_error(StatusCode::BAD_REQUEST, "No selected file");
    }

    let converter = &state.converter;
    let stored = stored_upload_path(&converter.config().upload_dir, &filename);
    if let Err(e) = tokio::fs::write(&stored, &bytes).await {
        error!(path = %stored.display(), error = %e, "Failed to save upload");
        return text_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to save upload: {}", e),
        );
    }
    info!(filename = %filename, bytes = bytes.len(), "Received upload");

    let result = converter
        .convert_file(&stored, upload_basename(&filename))
        .await;

    if let Err(e) = tokio::fs::remove_file(&stored).await {
        warn!(path = %stored.display(), error = %e, "Failed to remove saved upload");
    }

    let generated = match result {
        Ok(doc) => doc,
        Err(e) => {
            error!(stage = e.stage(), error = %e, "Conversion failed");
            return conversion_error(&e);
        }
    };

    let written = render_output(&generated).and_then(|body| {
        let path = converter.write_rendered(&body)?;
        Ok((path, body))
    });
    let (path, body) = match written {
        Ok(written) => written,
        Err(e) => {
            error!(error = %e, "Failed to write output");
            return conversion_error(&e);
        }
    };

    let download_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::config::OUTPUT_FILE_NAME.to_string());

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/json; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
        ],
        body,
    )
        .into_response()
}
