//! Handing finished artifacts to the host environment.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::batch::PDF_MIME;
use crate::error::{Error, Result};

/// A finished, serialized document ready for download.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
}

impl Artifact {
    pub fn pdf(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: PDF_MIME,
            file_name: file_name.into(),
        }
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// Destination for finished artifacts. Each call delivers exactly once.
pub trait ExportSink: Send + Sync {
    fn deliver(&self, artifact: Artifact) -> Result<()>;
}

/// Writes artifacts to the filesystem.
///
/// The file is staged in a temporary file next to its destination and
/// renamed into place, so a failed export never leaves a partial file.
#[derive(Debug, Clone)]
pub struct FileExport {
    target: ExportTarget,
}

#[derive(Debug, Clone)]
enum ExportTarget {
    /// Directory; the artifact's own file name is used
    Dir(PathBuf),
    /// Explicit output path; the artifact's file name is ignored
    File(PathBuf),
}

impl FileExport {
    pub fn into_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            target: ExportTarget::Dir(dir.into()),
        }
    }

    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        Self {
            target: ExportTarget::File(path.into()),
        }
    }

    /// Where `artifact` would be written.
    pub fn destination(&self, artifact: &Artifact) -> PathBuf {
        match &self.target {
            ExportTarget::Dir(dir) => dir.join(&artifact.file_name),
            ExportTarget::File(path) => path.clone(),
        }
    }
}

impl ExportSink for FileExport {
    fn deliver(&self, artifact: Artifact) -> Result<()> {
        let destination = self.destination(&artifact);
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staged = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| Error::Export(format!("Failed to stage {}: {e}", destination.display())))?;
        staged.write_all(&artifact.bytes)?;
        staged.flush()?;
        staged
            .persist(&destination)
            .map_err(|e| Error::Export(format!("Failed to write {}: {e}", destination.display())))?;

        info!("Saved {} ({} bytes)", destination.display(), artifact.bytes.len());
        Ok(())
    }
}

/// Keeps the most recent artifact in memory until it is taken.
#[derive(Debug, Default)]
pub struct MemoryExport {
    slot: Mutex<Option<Artifact>>,
}

impl MemoryExport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the pending artifact, if any.
    pub fn take(&self) -> Option<Artifact> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_ok_and(|slot| slot.is_some())
    }

    /// File name of the pending artifact.
    pub fn pending_name(&self) -> Option<String> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|a| a.file_name.clone()))
    }
}

impl ExportSink for MemoryExport {
    fn deliver(&self, artifact: Artifact) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Export("export slot poisoned".to_string()))?;
        *slot = Some(artifact);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_export_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileExport::into_dir(dir.path());

        sink.deliver(Artifact::pdf(b"%PDF-1.5 test".to_vec(), "merged.pdf"))
            .unwrap();

        let written = std::fs::read(dir.path().join("merged.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.5 test");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_export_explicit_path_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"old").unwrap();

        let sink = FileExport::to_path(&path);
        sink.deliver(Artifact::pdf(b"new".to_vec(), "ignored.pdf")).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        assert!(!dir.path().join("ignored.pdf").exists());
    }

    #[test]
    fn test_file_export_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileExport::into_dir(dir.path().join("missing"));
        let result = sink.deliver(Artifact::pdf(vec![1], "a.pdf"));
        assert!(matches!(result, Err(Error::Export(_))));
    }

    #[test]
    fn test_memory_export_take_once() {
        let sink = MemoryExport::new();
        assert!(!sink.is_pending());

        sink.deliver(Artifact::pdf(vec![1, 2, 3], "converted_images.pdf"))
            .unwrap();
        assert_eq!(sink.pending_name().as_deref(), Some("converted_images.pdf"));

        let artifact = sink.take().unwrap();
        assert_eq!(artifact.bytes, [1, 2, 3]);
        assert_eq!(artifact.mime_type, PDF_MIME);
        assert!(sink.take().is_none());
    }
}
