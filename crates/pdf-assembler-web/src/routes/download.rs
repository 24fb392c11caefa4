//! Download routes - PDF download handling.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use std::sync::Arc;
use tracing::info;

use crate::helpers::{OptionExt, ResultExt, RouteResult, parse_kind};
use crate::state::AppState;

/// Download the finished PDF of a pipeline.
///
/// Each artifact is delivered once; a second request returns 404 until the
/// pipeline runs again.
pub async fn download_pdf(
    State(state): State<Arc<AppState>>,
    Path((session_id, pipeline)): Path<(String, String)>,
) -> RouteResult<Response> {
    let kind = parse_kind(&pipeline)?;
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    // Take the artifact inside the lock (fast)
    let artifact = session
        .with_session(|s| s.export(kind).take())
        .await
        .or_not_found("Session not found")?
        .or_not_found("No PDF ready for download")?;

    info!(
        "Delivering {} ({} bytes) to session {}",
        artifact.file_name,
        artifact.bytes.len(),
        session_id
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        )
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(artifact.bytes))
        .or_internal_error()
}
