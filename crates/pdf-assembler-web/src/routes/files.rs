//! File routes - adding uploads to a batch and removing them.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use axum_extra::extract::Multipart;
use pdf_assembler_core::InputFile;
use std::sync::Arc;
use tracing::{debug, info};

use super::respond;
use crate::helpers::{OptionExt, ResultExt, RouteResult, parse_kind};
use crate::state::AppState;

/// Multipart field carrying the selected files
const FILES_FIELD: &str = "files";

/// Add uploaded files to a pipeline's batch.
///
/// Files that do not match the pipeline's media filter are skipped; if none
/// match, the batch is unchanged and the pipeline shows an error status.
pub async fn add_files(
    State(state): State<Arc<AppState>>,
    Path((session_id, pipeline)): Path<(String, String)>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> RouteResult<Response> {
    let kind = parse_kind(&pipeline)?;
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    // Read the whole upload before taking the session lock
    let mut selection = Vec::new();
    while let Some(field) = multipart.next_field().await.or_bad_request()? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or("upload").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.or_bad_request()?;

        // Browsers send an empty part when nothing was picked
        if name.is_empty() && data.is_empty() {
            continue;
        }

        debug!("Received {} ({}, {} bytes)", name, media_type, data.len());
        selection.push(InputFile::new(name, media_type, data));
    }

    let requested = selection.len();
    let added = session
        .with_session_mut(|s| s.workspace.pipeline_mut(kind).add(selection))
        .await
        .or_not_found("Session not found")?;

    match added {
        Ok(count) => info!("Added {}/{} files to {} batch", count, requested, kind),
        Err(e) => info!("Rejected selection for {} batch: {}", kind, e),
    }

    respond(&session, &headers).await
}

/// Remove the file at `index` from a pipeline's batch.
pub async fn remove_file(
    State(state): State<Arc<AppState>>,
    Path((session_id, pipeline, index)): Path<(String, String, usize)>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    let kind = parse_kind(&pipeline)?;
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let removed = session
        .with_session_mut(|s| s.workspace.pipeline_mut(kind).remove_at(index))
        .await
        .or_not_found("Session not found")?;

    if let Some(file) = removed {
        debug!("Removed {} from {} batch", file.name(), kind);
    }

    respond(&session, &headers).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{body_bytes, multipart, png, png_bytes, session_with, test_state};
    use axum::http::StatusCode;
    use pdf_assembler_core::{PipelineKind, StatusLevel};

    async fn upload(
        state: &Arc<AppState>,
        id: &str,
        pipeline: &str,
        headers: HeaderMap,
        parts: Multipart,
    ) -> Response {
        let path = Path((id.to_string(), pipeline.to_string()));
        add_files(State(Arc::clone(state)), path, headers, parts).await.unwrap()
    }

    async fn batch_names(state: &AppState, id: &str, kind: PipelineKind) -> Vec<String> {
        state
            .get_session(id)
            .await
            .unwrap()
            .with_session(|s| {
                let files = s.workspace.pipeline(kind).batch().files();
                files.iter().map(|f| f.name().to_string()).collect::<Vec<_>>()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_files_keeps_matching_parts_in_order() {
        let state = test_state();
        let id = state.create_session().await;
        let png = png_bytes();
        let parts = multipart(&[
            ("files", "b.png", "image/png", png.as_slice()),
            ("other", "ignored.png", "image/png", png.as_slice()),
            ("files", "notes.txt", "text/plain", b"hello".as_slice()),
            ("files", "", "application/octet-stream", b"".as_slice()),
            ("files", "a.png", "image/png", png.as_slice()),
        ])
        .await;

        let response = upload(&state, &id, "images", HeaderMap::new(), parts).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], format!("/session/{id}").as_str());
        assert_eq!(batch_names(&state, &id, PipelineKind::Images).await, ["b.png", "a.png"]);
    }

    #[tokio::test]
    async fn test_rejected_selection_shows_error() {
        let state = test_state();
        let id = state.create_session().await;
        let png = png_bytes();
        let parts = multipart(&[("files", "photo.png", "image/png", png.as_slice())]).await;

        upload(&state, &id, "merge", HeaderMap::new(), parts).await;

        assert!(batch_names(&state, &id, PipelineKind::Merge).await.is_empty());
        let status = state
            .get_session(&id)
            .await
            .unwrap()
            .with_session(|s| s.workspace.pipeline(PipelineKind::Merge).status().cloned())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert_eq!(status.message, "Please select only PDF files");
    }

    #[tokio::test]
    async fn test_htmx_upload_returns_fragment() {
        let state = test_state();
        let id = state.create_session().await;
        let png = png_bytes();
        let parts = multipart(&[("files", "scan.png", "image/png", png.as_slice())]).await;
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", "true".parse().unwrap());

        let response = upload(&state, &id, "images", headers, parts).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("scan.png"));
        assert!(html.contains(&format!("/api/{id}/images/remove/0")));
    }

    #[tokio::test]
    async fn test_remove_file() {
        let state = test_state();
        let files = vec![png("a.png"), png("b.png"), png("c.png")];
        let id = session_with(&state, PipelineKind::Images, files).await;

        let remove = |index| {
            let path = Path((id.clone(), "images".to_string(), index));
            remove_file(State(Arc::clone(&state)), path, HeaderMap::new())
        };

        remove(1).await.unwrap();
        assert_eq!(batch_names(&state, &id, PipelineKind::Images).await, ["a.png", "c.png"]);

        // Out of range leaves the batch alone
        remove(7).await.unwrap();
        assert_eq!(batch_names(&state, &id, PipelineKind::Images).await, ["a.png", "c.png"]);
    }
}
