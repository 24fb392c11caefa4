//! Run route - process a batch into a downloadable PDF.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use pdf_assembler_core::{Error, InputFile, PipelineKind};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::respond;
use crate::helpers::{OptionExt, RouteResult, parse_kind};
use crate::state::AppState;

/// Run a pipeline over its current batch.
///
/// The batch is snapshotted under the session lock and handed to a
/// background task, so the run completes even if the client goes away. The
/// response shows the running state, which polls until the task records the
/// outcome. A finished PDF is parked in the session until it is downloaded.
pub async fn run_pipeline(
    State(state): State<Arc<AppState>>,
    Path((session_id, pipeline)): Path<(String, String)>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    let kind = parse_kind(&pipeline)?;
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let begun = session
        .with_session_mut(|s| s.workspace.pipeline_mut(kind).begin())
        .await
        .or_not_found("Session not found")?;

    match begun {
        Ok(files) => {
            tokio::spawn(complete_run(Arc::clone(&state), session_id, kind, files));
        }
        Err(Error::Busy) => {
            warn!("Ignoring {} run request for session {}: already running", kind, session_id);
        }
        Err(e) => info!("Not starting {} run: {}", kind, e),
    }

    respond(&session, &headers).await
}

/// Process `files` and record the outcome on the session's pipeline.
///
/// Processing runs in its own task; if it panics the run is recorded as
/// failed instead of staying `Running`.
async fn complete_run(
    state: Arc<AppState>,
    session_id: String,
    kind: PipelineKind,
    files: Vec<InputFile>,
) {
    let worker = Arc::clone(&state);
    let outcome = tokio::spawn(async move { worker.processor(kind).process(&files).await })
        .await
        .unwrap_or_else(|e| Err(Error::Engine(format!("processing task failed: {e}"))));

    let Some(session) = state.get_session(&session_id).await else {
        warn!("Session {} expired during {} run", session_id, kind);
        return;
    };

    match session.with_session_mut(|s| s.finish_run(kind, outcome)).await {
        Some(Ok(())) => info!("Finished {} run for session {}", kind, session_id),
        Some(Err(e)) => error!("{} run failed for session {}: {}", kind, session_id, e),
        None => warn!("Session {} expired during {} run", session_id, kind),
    }
}
