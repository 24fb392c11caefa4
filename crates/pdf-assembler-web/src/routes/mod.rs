//! HTTP route handlers for the PDF assembler web application.
//!
//! Mutating routes answer HTMX requests with the workspace fragment and
//! plain form submissions with a redirect back to the session page.
//! The download route returns the PDF itself; the status route returns JSON.

mod download;
mod files;
mod pages;
mod run;
mod status;

pub use download::download_pdf;
pub use files::{add_files, remove_file};
pub use pages::{index, select_tab, session_page, workspace_fragment};
pub use run::run_pipeline;
pub use status::session_status;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::helpers::{OptionExt, RouteResult, is_htmx, redirect};
use crate::state::SessionRef;
use crate::templates::{WorkspaceTemplate, WorkspaceView};

/// Current view of a session.
pub async fn workspace_view(session: &SessionRef<'_>) -> RouteResult<WorkspaceView> {
    let id = session.id();
    session
        .with_session(|s| WorkspaceView::from_session(id, s))
        .await
        .or_not_found("Session not found")
}

/// Reply to a mutation: the refreshed fragment for HTMX, otherwise a
/// redirect to the session page.
pub async fn respond(session: &SessionRef<'_>, headers: &HeaderMap) -> RouteResult<Response> {
    if is_htmx(headers) {
        let view = workspace_view(session).await?;
        Ok(WorkspaceTemplate { view }.into_response())
    } else {
        redirect(headers, &format!("/session/{}", session.id()))
    }
}
