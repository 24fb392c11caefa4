//! Sequential batch processors: one file at a time, in batch order.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::batch::InputFile;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::export::Artifact;
use crate::pdf::{ImageDocument, ImageEngine, MergeDocument, MergeEngine, PageSize, fit_to_page};
use crate::pipeline::PipelineKind;

/// Called with `(files_done, files_total)` after each file.
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Turns an ordered list of files into one artifact.
#[async_trait]
pub trait BatchProcessor: Send + Sync {
    /// Pipeline this processor serves
    fn kind(&self) -> PipelineKind;

    /// Process `files` strictly in order. The first failure aborts the run.
    async fn process(&self, files: &[InputFile]) -> Result<Artifact>;
}

/// Places each image on its own page, scaled to fit inside the margins.
pub struct ImageConverter<E: ImageEngine> {
    engine: E,
    page_size: PageSize,
    margin: f64,
    file_name: String,
    progress: Option<ProgressFn>,
}

impl<E: ImageEngine> ImageConverter<E> {
    pub fn new(engine: E, page_size: PageSize, margin: f64, file_name: impl Into<String>) -> Self {
        Self {
            engine,
            page_size,
            margin,
            file_name: file_name.into(),
            progress: None,
        }
    }

    pub fn from_config(engine: E, config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            engine,
            config.page.page_size()?,
            config.page.margin_mm,
            config.output.image_file_name.clone(),
        ))
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[async_trait]
impl<E: ImageEngine> BatchProcessor for ImageConverter<E> {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Images
    }

    async fn process(&self, files: &[InputFile]) -> Result<Artifact> {
        if files.is_empty() {
            return Err(Error::EmptyBatch);
        }

        info!("Converting {} images with {}", files.len(), self.engine.name());

        let mut doc = self.engine.create_document(self.page_size);
        let page = doc.page_size();

        for (index, file) in files.iter().enumerate() {
            let image = self.engine.decode(file).await?;
            if image.width == 0 || image.height == 0 {
                return Err(Error::ImageDecode {
                    file: file.name().to_string(),
                    reason: "image has no pixels".to_string(),
                });
            }

            let layout = fit_to_page(
                f64::from(image.width),
                f64::from(image.height),
                page.width,
                page.height,
                self.margin,
            );
            debug!("Placing {} at {:?}", file.name(), layout);

            if index > 0 {
                doc.add_page();
            }
            doc.place_image(&image, &layout)?;

            if let Some(ref callback) = self.progress {
                callback(index + 1, files.len());
            }
        }

        let page_count = doc.page_count();
        let bytes = doc.save()?;
        info!("Created PDF with {} pages ({} bytes)", page_count, bytes.len());

        Ok(Artifact::pdf(bytes, self.file_name.clone()))
    }
}

/// Concatenates the pages of every input PDF, in batch order.
pub struct PdfMerger<E: MergeEngine> {
    engine: E,
    file_name: String,
    progress: Option<ProgressFn>,
}

impl<E: MergeEngine> PdfMerger<E> {
    /// Fewest files a merge accepts
    pub const MIN_FILES: usize = 2;

    pub fn new(engine: E, file_name: impl Into<String>) -> Self {
        Self {
            engine,
            file_name: file_name.into(),
            progress: None,
        }
    }

    pub fn from_config(engine: E, config: &AppConfig) -> Self {
        Self::new(engine, config.output.merge_file_name.clone())
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[async_trait]
impl<E: MergeEngine> BatchProcessor for PdfMerger<E> {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Merge
    }

    async fn process(&self, files: &[InputFile]) -> Result<Artifact> {
        if files.len() < Self::MIN_FILES {
            return Err(Error::InsufficientFiles {
                required: Self::MIN_FILES,
                actual: files.len(),
            });
        }

        info!("Merging {} PDFs with {}", files.len(), self.engine.name());

        let mut merged = self.engine.create_document();

        for (index, file) in files.iter().enumerate() {
            let source = self.engine.load_document(file).await?;
            let indices = self.engine.page_indices(&source);
            let pages = merged.copy_pages(&source, &indices)?;
            for page in pages {
                merged.add_page(page);
            }
            debug!("Appended {} pages from {}", indices.len(), file.name());

            if let Some(ref callback) = self.progress {
                callback(index + 1, files.len());
            }
        }

        let page_count = merged.page_count();
        let bytes = merged.save()?;
        info!("Merged PDF has {} pages ({} bytes)", page_count, bytes.len());

        Ok(Artifact::pdf(bytes, self.file_name.clone()))
    }
}
