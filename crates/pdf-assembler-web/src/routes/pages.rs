//! Page routes - full HTML page renders and tab switching.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Redirect, Response};
use std::sync::Arc;
use tracing::info;

use super::{respond, workspace_view};
use crate::helpers::{OptionExt, RouteResult, parse_kind};
use crate::state::AppState;
use crate::templates::{AppTemplate, WorkspaceTemplate};

/// Landing page: start a fresh session and send the browser to it.
pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    let session_id = state.create_session().await;
    info!("Created session {}", session_id);
    Redirect::to(&format!("/session/{session_id}"))
}

/// Full app page for a session (direct URL access and reloads).
pub async fn session_page(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<AppTemplate> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let view = workspace_view(&session).await?;
    Ok(AppTemplate { view })
}

/// Switch the active tab. Switching to another tab clears both statuses.
pub async fn select_tab(
    State(state): State<Arc<AppState>>,
    Path((session_id, tab)): Path<(String, String)>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    let kind = parse_kind(&tab)?;
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    session
        .with_session_mut(|s| s.workspace.select_tab(kind))
        .await
        .or_not_found("Session not found")?;

    respond(&session, &headers).await
}

/// Workspace fragment alone (polled while a run is in progress).
pub async fn workspace_fragment(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<WorkspaceTemplate> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let view = workspace_view(&session).await?;
    Ok(WorkspaceTemplate { view })
}
