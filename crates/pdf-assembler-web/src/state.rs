use anyhow::{Context, Result};
use pdf_assembler_core::{
    AppConfig, Artifact, BatchProcessor, ImageConverter, LopdfImageEngine, LopdfMergeEngine,
    MemoryExport, PdfMerger, PipelineKind, Workspace,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Sessions older than this are dropped by the cleanup task.
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(3600);

/// One browser tab's worth of state: both pipelines and their pending downloads.
pub struct Session {
    pub workspace: Workspace,
    /// Finished image PDF waiting to be downloaded
    images_export: MemoryExport,
    /// Finished merged PDF waiting to be downloaded
    merge_export: MemoryExport,
    pub created_at: Instant,
}

impl Session {
    pub fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            images_export: MemoryExport::new(),
            merge_export: MemoryExport::new(),
            created_at: Instant::now(),
        }
    }

    pub const fn export(&self, kind: PipelineKind) -> &MemoryExport {
        Self::slot(kind, &self.images_export, &self.merge_export)
    }

    const fn slot<'a>(
        kind: PipelineKind,
        images: &'a MemoryExport,
        merge: &'a MemoryExport,
    ) -> &'a MemoryExport {
        match kind {
            PipelineKind::Images => images,
            PipelineKind::Merge => merge,
        }
    }

    /// Complete a run started with `Pipeline::begin`, parking the artifact
    /// in this session's download slot.
    pub fn finish_run(
        &mut self,
        kind: PipelineKind,
        outcome: pdf_assembler_core::Result<Artifact>,
    ) -> pdf_assembler_core::Result<()> {
        let sink = Self::slot(kind, &self.images_export, &self.merge_export);
        self.workspace.pipeline_mut(kind).finish(outcome, sink)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Global application state
pub struct AppState {
    /// Active sessions indexed by UUID
    sessions: RwLock<HashMap<Uuid, Session>>,
    images: ImageConverter<LopdfImageEngine>,
    merger: PdfMerger<LopdfMergeEngine>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let images = ImageConverter::from_config(LopdfImageEngine, config)
            .context("Failed to configure image converter")?;
        let merger = PdfMerger::from_config(LopdfMergeEngine, config);
        let page = config.page.page_size()?;
        info!(
            "Pages are {} x {} mm with {} mm margins",
            page.width, page.height, config.page.margin_mm
        );

        Ok(Self {
            sessions: RwLock::new(HashMap::new()),
            images,
            merger,
        })
    }

    /// Create an empty session.
    ///
    /// Returns the session ID as a string (for URL embedding).
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, Session::new());
        id.to_string()
    }

    /// Get a session by ID string.
    ///
    /// Returns `None` if the ID is not a valid UUID or session doesn't exist.
    pub async fn get_session(&self, id: &str) -> Option<SessionRef<'_>> {
        let uuid = Uuid::parse_str(id).ok()?;
        let sessions = self.sessions.read().await;
        if sessions.contains_key(&uuid) {
            Some(SessionRef {
                id: uuid,
                state: self,
            })
        } else {
            None
        }
    }

    /// Processor serving the given pipeline.
    pub fn processor(&self, kind: PipelineKind) -> &dyn BatchProcessor {
        match kind {
            PipelineKind::Images => &self.images,
            PipelineKind::Merge => &self.merger,
        }
    }

    /// Cleanup old sessions (older than 1 hour). Returns how many were dropped.
    pub async fn cleanup_old_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();

        sessions.retain(|_, session| now.duration_since(session.created_at) < SESSION_MAX_AGE);

        before - sessions.len()
    }
}

/// A borrowed reference to a session that provides safe access patterns.
///
/// Locks are only taken inside the synchronous closures passed to
/// [`Self::with_session`] and [`Self::with_session_mut`], so no guard is
/// held across an `.await`. A run therefore takes the lock twice: once to
/// begin (snapshotting the batch) and once to finish.
///
/// ```ignore
/// let files = session.with_session_mut(|s| s.workspace.pipeline_mut(kind).begin()).await?;
/// let outcome = processor.process(&files?).await;
/// session.with_session_mut(|s| s.finish_run(kind, outcome)).await;
/// ```
pub struct SessionRef<'a> {
    id: Uuid,
    state: &'a AppState,
}

impl SessionRef<'_> {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// Access session data immutably within a closure.
    ///
    /// The closure runs synchronously while holding a read lock.
    pub async fn with_session<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Session) -> R,
    {
        let sessions = self.state.sessions.read().await;
        sessions.get(&self.id).map(f)
    }

    /// Access session data mutably within a closure.
    ///
    /// The closure runs synchronously while holding a write lock.
    pub async fn with_session_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.state.sessions.write().await;
        sessions.get_mut(&self.id).map(f)
    }
}
