//! Pipeline state: one batch, one status surface and the run state machine.
//!
//! ```text
//! Idle -> Running -> Done
//!                 -> Failed
//! ```
//! `Done` and `Failed` accept a new run immediately.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::batch::{Batch, InputFile, MediaFilter};
use crate::error::{Error, Result};
use crate::export::{Artifact, ExportSink};
use crate::processor::BatchProcessor;
use crate::status::{Status, StatusBoard};

/// The two conversion flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Images combined into one PDF
    #[default]
    Images,
    /// PDFs merged into one
    Merge,
}

impl PipelineKind {
    pub const ALL: [Self; 2] = [Self::Images, Self::Merge];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Merge => "merge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "images" => Some(Self::Images),
            "merge" => Some(Self::Merge),
            _ => None,
        }
    }

    pub const fn filter(self) -> MediaFilter {
        match self {
            Self::Images => MediaFilter::Images,
            Self::Merge => MediaFilter::Pdfs,
        }
    }

    pub const fn min_files(self) -> usize {
        match self {
            Self::Images => 1,
            Self::Merge => 2,
        }
    }

    const fn invalid_selection_message(self) -> &'static str {
        match self {
            Self::Images => "Please select only image files (JPG, PNG, etc.)",
            Self::Merge => "Please select only PDF files",
        }
    }

    const fn not_ready_message(self) -> &'static str {
        match self {
            Self::Images => "No images selected",
            Self::Merge => "Please select at least 2 PDF files to merge",
        }
    }

    const fn running_message(self) -> &'static str {
        match self {
            Self::Images => "Creating PDF...",
            Self::Merge => "Merging PDFs...",
        }
    }

    const fn success_message(self) -> &'static str {
        match self {
            Self::Images => "PDF created successfully!",
            Self::Merge => "PDFs merged successfully!",
        }
    }

    const fn failure_prefix(self) -> &'static str {
        match self {
            Self::Images => "Error creating PDF",
            Self::Merge => "Error merging PDFs",
        }
    }

    fn not_ready_error(self, actual: usize) -> Error {
        match self {
            Self::Images => Error::EmptyBatch,
            Self::Merge => Error::InsufficientFiles {
                required: self.min_files(),
                actual,
            },
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Done,
    Failed,
}

/// A batch plus everything the front-end shows about it.
#[derive(Debug, Clone)]
pub struct Pipeline {
    kind: PipelineKind,
    batch: Batch,
    status: StatusBoard,
    state: RunState,
}

impl Pipeline {
    pub const fn new(kind: PipelineKind) -> Self {
        Self {
            kind,
            batch: Batch::new(kind.filter(), kind.min_files()),
            status: StatusBoard::new(),
            state: RunState::Idle,
        }
    }

    pub const fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub const fn batch(&self) -> &Batch {
        &self.batch
    }

    pub const fn status(&self) -> Option<&Status> {
        self.status.current()
    }

    pub const fn state(&self) -> RunState {
        self.state
    }

    pub fn clear_status(&mut self) {
        self.status.clear();
    }

    /// Add files to the batch. See [`Batch::add`].
    ///
    /// A successful addition clears the status; a rejected selection shows
    /// an error status.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = InputFile>) -> Result<usize> {
        match self.batch.add(candidates) {
            Ok(0) => Ok(0),
            Ok(added) => {
                self.status.clear();
                Ok(added)
            }
            Err(e) => {
                self.status.show(Status::error(self.kind.invalid_selection_message()));
                Err(e)
            }
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<InputFile> {
        let removed = self.batch.remove_at(index);
        if removed.is_some() {
            self.status.clear();
        }
        removed
    }

    pub fn is_ready(&self) -> bool {
        self.batch.is_ready()
    }

    /// Whether the trigger control should be enabled.
    pub fn trigger_enabled(&self) -> bool {
        self.state != RunState::Running && self.is_ready()
    }

    /// Start a run: check preconditions, enter `Running` and return a
    /// snapshot of the batch to process.
    pub fn begin(&mut self) -> Result<Vec<InputFile>> {
        if self.state == RunState::Running {
            return Err(Error::Busy);
        }

        if !self.batch.is_ready() {
            self.status.show(Status::error(self.kind.not_ready_message()));
            return Err(self.kind.not_ready_error(self.batch.len()));
        }

        info!("Starting {} run over {} files", self.kind, self.batch.len());
        self.state = RunState::Running;
        self.status.show(Status::info(self.kind.running_message()));
        Ok(self.batch.files().to_vec())
    }

    /// End a run started with [`Self::begin`]: export on success, report the
    /// outcome and leave `Running`.
    pub fn finish(&mut self, outcome: Result<Artifact>, sink: &dyn ExportSink) -> Result<()> {
        let result = outcome.and_then(|artifact| sink.deliver(artifact));

        match &result {
            Ok(()) => {
                self.state = RunState::Done;
                self.status.show(Status::success(self.kind.success_message()));
            }
            Err(e) => {
                self.state = RunState::Failed;
                self.status
                    .show(Status::error(format!("{}: {e}", self.kind.failure_prefix())));
            }
        }

        result
    }

    /// Run `processor` over the batch and deliver the artifact to `sink`.
    pub async fn run(
        &mut self,
        processor: &dyn BatchProcessor,
        sink: &dyn ExportSink,
    ) -> Result<()> {
        if processor.kind() != self.kind {
            return Err(Error::Engine(format!(
                "{} processor cannot run the {} pipeline",
                processor.kind(),
                self.kind
            )));
        }

        let files = self.begin()?;
        let outcome = processor.process(&files).await;
        self.finish(outcome, sink)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::export::MemoryExport;
    use crate::status::StatusLevel;

    fn pdf(name: &str) -> InputFile {
        InputFile::new(name, "application/pdf", vec![0u8])
    }

    #[test]
    fn test_kind_names() {
        for kind in PipelineKind::ALL {
            assert_eq!(PipelineKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(PipelineKind::from_name("other"), None);
    }

    #[test]
    fn test_rejected_selection_sets_error_status() {
        let mut pipeline = Pipeline::new(PipelineKind::Images);
        let result = pipeline.add([pdf("a.pdf")]);

        assert!(matches!(result, Err(Error::NoValidFiles { .. })));
        let status = pipeline.status().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert_eq!(status.message, "Please select only image files (JPG, PNG, etc.)");
    }

    #[test]
    fn test_mutation_clears_status() {
        let mut pipeline = Pipeline::new(PipelineKind::Merge);
        let _ = pipeline.add([InputFile::new("x.png", "image/png", vec![0u8])]);
        assert!(pipeline.status().is_some());

        pipeline.add([pdf("a.pdf")]).unwrap();
        assert!(pipeline.status().is_none());

        let _ = pipeline.begin();
        assert!(pipeline.status().is_some());
        pipeline.remove_at(0);
        assert!(pipeline.status().is_none());
    }

    #[test]
    fn test_begin_rejects_unready_merge() {
        let mut pipeline = Pipeline::new(PipelineKind::Merge);
        pipeline.add([pdf("a.pdf")]).unwrap();

        let result = pipeline.begin();
        assert!(matches!(result, Err(Error::InsufficientFiles { required: 2, actual: 1 })));
        assert_eq!(pipeline.state(), RunState::Idle);
        assert_eq!(
            pipeline.status().unwrap().message,
            "Please select at least 2 PDF files to merge"
        );
    }

    #[test]
    fn test_begin_rejects_empty_image_batch() {
        let mut pipeline = Pipeline::new(PipelineKind::Images);
        assert!(matches!(pipeline.begin(), Err(Error::EmptyBatch)));
        assert_eq!(pipeline.status().unwrap().message, "No images selected");
    }

    #[test]
    fn test_run_state_and_trigger() {
        let mut pipeline = Pipeline::new(PipelineKind::Merge);
        pipeline.add([pdf("a.pdf"), pdf("b.pdf")]).unwrap();
        assert!(pipeline.trigger_enabled());

        let files = pipeline.begin().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(pipeline.state(), RunState::Running);
        assert!(!pipeline.trigger_enabled());
        assert!(matches!(pipeline.begin(), Err(Error::Busy)));

        let sink = MemoryExport::new();
        pipeline
            .finish(Ok(Artifact::pdf(vec![1], "merged.pdf")), &sink)
            .unwrap();
        assert_eq!(pipeline.state(), RunState::Done);
        assert!(pipeline.trigger_enabled());
        assert_eq!(pipeline.status().unwrap().message, "PDFs merged successfully!");
        assert!(sink.is_pending());
    }

    #[test]
    fn test_failed_run_reports_error() {
        let mut pipeline = Pipeline::new(PipelineKind::Merge);
        pipeline.add([pdf("a.pdf"), pdf("b.pdf")]).unwrap();
        pipeline.begin().unwrap();

        let sink = MemoryExport::new();
        let result = pipeline.finish(Err(Error::Engine("boom".to_string())), &sink);

        assert!(result.is_err());
        assert_eq!(pipeline.state(), RunState::Failed);
        assert!(pipeline.trigger_enabled());
        let status = pipeline.status().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert_eq!(status.message, "Error merging PDFs: document engine error: boom");
        assert!(!sink.is_pending());
    }
}
