//! Askama templates for HTMX responses.
//!
//! ## HTMX Patterns Used
//!
//! - **Fragment swaps**: every mutating endpoint answers HTMX requests with
//!   the workspace fragment, which replaces `#workspace` wholesale
//!
//! - **Polling**: while a pipeline is running the fragment carries
//!   `hx-trigger="every 1s"` so the status refreshes until the run ends
//!
//! - **Disabled Elements**: `hx-disabled-elt` prevents double submission of
//!   a run while the request is in flight
//!
//! ## Template Structure
//!
//! - `base.html` - Common layout with CSS/JS
//! - `app.html` - Full page for one session
//! - `partials/workspace.html` - Tab bar plus both pipeline panels

use askama::Template;
use askama_web::WebTemplate;
use pdf_assembler_core::{Pipeline, PipelineKind, RunState, Status, display_name};
use serde::Serialize;

use crate::state::Session;

// =============================================================================
// View Models
// =============================================================================

/// One file as listed in a pipeline panel.
#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub index: usize,
    pub name: String,
    pub display_name: String,
    pub size: usize,
}

/// Everything a pipeline panel renders.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineView {
    pub kind: &'static str,
    pub title: &'static str,
    /// `accept` attribute of the file input
    pub accept: &'static str,
    pub trigger_label: &'static str,
    pub active: bool,
    pub files: Vec<FileView>,
    pub ready: bool,
    pub trigger_enabled: bool,
    pub state: RunState,
    pub status: Option<Status>,
    /// File name of an artifact waiting to be downloaded
    pub download: Option<String>,
}

impl PipelineView {
    fn new(pipeline: &Pipeline, active: bool, download: Option<String>) -> Self {
        let kind = pipeline.kind();
        let (title, accept, trigger_label) = match kind {
            PipelineKind::Images => ("Images to PDF", "image/*", "Create PDF"),
            PipelineKind::Merge => ("Merge PDFs", "application/pdf,.pdf", "Merge PDFs"),
        };

        let files = pipeline
            .batch()
            .files()
            .iter()
            .enumerate()
            .map(|(index, file)| FileView {
                index,
                name: file.name().to_string(),
                display_name: display_name(file.name()),
                size: file.len(),
            })
            .collect();

        Self {
            kind: kind.as_str(),
            title,
            accept,
            trigger_label,
            active,
            files,
            ready: pipeline.is_ready(),
            trigger_enabled: pipeline.trigger_enabled(),
            state: pipeline.state(),
            status: pipeline.status().cloned(),
            download,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// CSS class of the status line.
    pub fn status_class(&self) -> &'static str {
        self.status.as_ref().map_or("", |status| status.level.as_str())
    }
}

/// Snapshot of a session for rendering and for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceView {
    pub session_id: String,
    pub active_tab: &'static str,
    pub pipelines: Vec<PipelineView>,
}

impl WorkspaceView {
    pub fn from_session(session_id: String, session: &Session) -> Self {
        let active = session.workspace.active_tab();
        let pipelines = PipelineKind::ALL
            .into_iter()
            .map(|kind| {
                PipelineView::new(
                    session.workspace.pipeline(kind),
                    kind == active,
                    session.export(kind).pending_name(),
                )
            })
            .collect();

        Self {
            session_id,
            active_tab: active.as_str(),
            pipelines,
        }
    }

    /// Whether any pipeline is mid-run (the fragment polls while true).
    pub fn any_running(&self) -> bool {
        self.pipelines.iter().any(PipelineView::is_running)
    }
}

// =============================================================================
// Full Page Templates
// =============================================================================

/// Full page for one session.
#[derive(Template, WebTemplate)]
#[template(path = "app.html")]
pub struct AppTemplate {
    pub view: WorkspaceView,
}

// =============================================================================
// Fragment Templates (HTMX partial responses)
// =============================================================================

/// Workspace fragment returned by every HTMX mutation.
#[derive(Template, WebTemplate)]
#[template(path = "partials/workspace.html")]
pub struct WorkspaceTemplate {
    pub view: WorkspaceView,
}
