//! Status route - JSON snapshot of a session for polling clients.

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use super::workspace_view;
use crate::helpers::{OptionExt, RouteResult};
use crate::state::AppState;
use crate::templates::WorkspaceView;

pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<Json<WorkspaceView>> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    Ok(Json(workspace_view(&session).await?))
}
