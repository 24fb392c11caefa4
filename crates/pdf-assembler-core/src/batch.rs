//! Ordered collections of input files awaiting processing.

use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::error::{Error, Result};

pub const PDF_MIME: &str = "application/pdf";

/// A user-selected file: name, declared media type and contents.
///
/// Cloning is O(1); the contents are reference-counted.
#[derive(Clone)]
pub struct InputFile {
    name: String,
    media_type: String,
    bytes: Bytes,
}

impl InputFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    ///
    /// Unknown extensions get `application/octet-stream`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let media_type = mime_guess::from_path(path).first_or_octet_stream();

        Ok(Self::new(name, media_type.essence_str(), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// Media type predicate a batch enforces on every element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFilter {
    /// Declared type `image/*`
    Images,
    /// Declared type `application/pdf`, or a `.pdf` name in any case
    Pdfs,
}

impl MediaFilter {
    pub fn accepts(self, file: &InputFile) -> bool {
        match self {
            Self::Images => file.media_type().starts_with("image/"),
            Self::Pdfs => {
                file.media_type() == PDF_MIME || file.name().to_lowercase().ends_with(".pdf")
            }
        }
    }

    /// Human-readable name of the accepted kind, used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Images => "image",
            Self::Pdfs => "PDF",
        }
    }
}

/// An ordered list of files that all satisfy one [`MediaFilter`].
///
/// Insertion order is preserved and duplicates are allowed.
#[derive(Debug, Clone)]
pub struct Batch {
    filter: MediaFilter,
    min_files: usize,
    files: Vec<InputFile>,
}

impl Batch {
    pub const fn new(filter: MediaFilter, min_files: usize) -> Self {
        Self {
            filter,
            min_files,
            files: Vec::new(),
        }
    }

    /// Append every candidate accepted by the filter, in the order given.
    ///
    /// Returns the number of files added. An empty selection is a no-op;
    /// a non-empty selection with no acceptable file fails with
    /// [`Error::NoValidFiles`] and leaves the batch unchanged.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = InputFile>) -> Result<usize> {
        let filter = self.filter;
        let mut offered = 0usize;
        let accepted: Vec<InputFile> = candidates
            .into_iter()
            .inspect(|_| offered += 1)
            .filter(|file| {
                let ok = filter.accepts(file);
                if !ok {
                    debug!("Skipping {} ({})", file.name(), file.media_type());
                }
                ok
            })
            .collect();

        if offered == 0 {
            return Ok(0);
        }

        if accepted.is_empty() {
            return Err(Error::NoValidFiles {
                expected: filter.label(),
            });
        }

        let added = accepted.len();
        self.files.extend(accepted);
        Ok(added)
    }

    /// Remove the file at `index`, keeping the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Option<InputFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn is_ready(&self) -> bool {
        self.files.len() >= self.min_files
    }

    pub const fn filter(&self) -> MediaFilter {
        self.filter
    }

    pub const fn min_files(&self) -> usize {
        self.min_files
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str, media_type: &str) -> InputFile {
        InputFile::new(name, media_type, vec![0u8; 4])
    }

    fn names(batch: &Batch) -> Vec<&str> {
        batch.files().iter().map(InputFile::name).collect()
    }

    #[test]
    fn test_pdf_filter_accepts_suffix_or_mime() {
        let filter = MediaFilter::Pdfs;
        assert!(filter.accepts(&file("a.pdf", "")));
        assert!(filter.accepts(&file("REPORT.PDF", "application/octet-stream")));
        assert!(filter.accepts(&file("noext", PDF_MIME)));
        assert!(!filter.accepts(&file("a.png", "image/png")));
    }

    #[test]
    fn test_image_filter_uses_mime_only() {
        let filter = MediaFilter::Images;
        assert!(filter.accepts(&file("a.png", "image/png")));
        assert!(filter.accepts(&file("scan", "image/jpeg")));
        assert!(!filter.accepts(&file("photo.jpg", "application/octet-stream")));
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut batch = Batch::new(MediaFilter::Images, 1);
        batch.add([file("a", "image/png"), file("b", "image/png")]).unwrap();
        batch.add([file("c", "image/png"), file("d", "image/jpeg")]).unwrap();
        assert_eq!(names(&batch), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_add_skips_mismatched_files() {
        let mut batch = Batch::new(MediaFilter::Images, 1);
        let added = batch
            .add([file("a", "image/png"), file("doc.pdf", PDF_MIME), file("b", "image/gif")])
            .unwrap();
        assert_eq!(added, 2);
        assert!(batch.files().iter().all(|f| MediaFilter::Images.accepts(f)));
    }

    #[test]
    fn test_add_with_no_valid_files_leaves_batch_unchanged() {
        let mut batch = Batch::new(MediaFilter::Pdfs, 2);
        batch.add([file("a.pdf", PDF_MIME)]).unwrap();

        let err = batch.add([file("x.png", "image/png")]).unwrap_err();
        assert!(matches!(err, Error::NoValidFiles { expected: "PDF" }));
        assert_eq!(names(&batch), ["a.pdf"]);
    }

    #[test]
    fn test_add_empty_selection_is_noop() {
        let mut batch = Batch::new(MediaFilter::Images, 1);
        assert_eq!(batch.add(Vec::new()).unwrap(), 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut batch = Batch::new(MediaFilter::Pdfs, 2);
        batch.add([file("same.pdf", PDF_MIME), file("same.pdf", PDF_MIME)]).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_remove_at_preserves_order() {
        let mut batch = Batch::new(MediaFilter::Images, 1);
        batch
            .add(["a", "b", "c", "d"].map(|n| file(n, "image/png")))
            .unwrap();

        let removed = batch.remove_at(1).unwrap();
        assert_eq!(removed.name(), "b");
        assert_eq!(names(&batch), ["a", "c", "d"]);

        assert!(batch.remove_at(3).is_none());
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_is_ready_tracks_minimum() {
        let mut batch = Batch::new(MediaFilter::Pdfs, 2);
        assert!(!batch.is_ready());
        batch.add([file("a.pdf", PDF_MIME)]).unwrap();
        assert!(!batch.is_ready());
        batch.add([file("b.pdf", PDF_MIME)]).unwrap();
        assert!(batch.is_ready());
        batch.remove_at(0);
        assert!(!batch.is_ready());
    }
}
