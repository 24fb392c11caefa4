//! PDF Assembler Core Library
//!
//! This library provides the core functionality for assembling PDF documents:
//! - Image batches converted into one PDF, one image per page
//! - PDF batches merged into one PDF, pages kept in batch order
//! - Batch collection with media type filtering
//! - Per-pipeline status and run state for front-ends
//! - Artifact export to disk or to an in-memory download slot

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod pdf;
pub mod pipeline;
pub mod processor;
pub mod status;
pub mod ui;
pub mod util;

pub use batch::{Batch, InputFile, MediaFilter, PDF_MIME};
pub use config::{AppConfig, OutputConfig, PageConfig};
pub use error::{Error, Result};
pub use export::{Artifact, ExportSink, FileExport, MemoryExport};
pub use pdf::{LopdfImageEngine, LopdfMergeEngine, PageLayout, PageSize, fit_to_page};
pub use pipeline::{Pipeline, PipelineKind, RunState};
pub use processor::{BatchProcessor, ImageConverter, PdfMerger, ProgressFn};
pub use status::{Status, StatusBoard, StatusLevel};
pub use ui::{DragEvent, DropTarget, TabState, display_name};

/// Everything one user sees: the tab bar and both pipelines.
#[derive(Debug, Clone)]
pub struct Workspace {
    tabs: TabState,
    images: Pipeline,
    merge: Pipeline,
}

impl Workspace {
    pub const fn new() -> Self {
        Self {
            tabs: TabState::new(),
            images: Pipeline::new(PipelineKind::Images),
            merge: Pipeline::new(PipelineKind::Merge),
        }
    }

    pub const fn active_tab(&self) -> PipelineKind {
        self.tabs.active()
    }

    /// Switch tabs. Changing the active tab clears both pipelines' statuses.
    pub fn select_tab(&mut self, tab: PipelineKind) {
        if self.tabs.select(tab) {
            self.images.clear_status();
            self.merge.clear_status();
        }
    }

    pub const fn pipeline(&self, kind: PipelineKind) -> &Pipeline {
        match kind {
            PipelineKind::Images => &self.images,
            PipelineKind::Merge => &self.merge,
        }
    }

    pub const fn pipeline_mut(&mut self, kind: PipelineKind) -> &mut Pipeline {
        match kind {
            PipelineKind::Images => &mut self.images,
            PipelineKind::Merge => &mut self.merge,
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.page.size, "a4");
        assert_eq!(config.output.image_file_name, "converted_images.pdf");
    }

    #[test]
    fn test_tab_switch_clears_statuses() {
        let mut workspace = Workspace::new();
        let png = InputFile::new("a.png", "image/png", vec![0u8]);
        let pdf = InputFile::new("a.pdf", PDF_MIME, vec![0u8]);

        let _ = workspace.pipeline_mut(PipelineKind::Images).add([pdf]);
        let _ = workspace.pipeline_mut(PipelineKind::Merge).add([png]);
        assert!(workspace.pipeline(PipelineKind::Images).status().is_some());
        assert!(workspace.pipeline(PipelineKind::Merge).status().is_some());

        workspace.select_tab(PipelineKind::Images);
        assert!(workspace.pipeline(PipelineKind::Images).status().is_some());

        workspace.select_tab(PipelineKind::Merge);
        assert_eq!(workspace.active_tab(), PipelineKind::Merge);
        assert!(workspace.pipeline(PipelineKind::Images).status().is_none());
        assert!(workspace.pipeline(PipelineKind::Merge).status().is_none());
    }

    #[test]
    fn test_batches_are_independent() {
        let mut workspace = Workspace::new();
        workspace
            .pipeline_mut(PipelineKind::Merge)
            .add([InputFile::new("a.pdf", PDF_MIME, vec![0u8])])
            .ok();
        assert_eq!(workspace.pipeline(PipelineKind::Merge).batch().len(), 1);
        assert!(workspace.pipeline(PipelineKind::Images).batch().is_empty());
    }
}
