use async_trait::async_trait;
use bytes::Bytes;

use crate::batch::InputFile;
use crate::error::Result;
use super::layout::{PageLayout, PageSize};
use super::page_index::PageIndex;

/// Colour model of decoded image samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    Rgb,
}

impl ColorModel {
    /// Name of the matching PDF colour space
    pub const fn pdf_name(self) -> &'static [u8] {
        match self {
            Self::Gray => b"DeviceGray",
            Self::Rgb => b"DeviceRGB",
        }
    }
}

/// How an image's pixels are handed to the document.
#[derive(Clone)]
pub enum ImageData {
    /// Original JPEG stream, embedded without re-encoding
    Jpeg(Bytes),
    /// Uncompressed 8-bit samples in row-major order
    Raw(Vec<u8>),
}

/// An image ready for placement, with its natural pixel dimensions.
#[derive(Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub color: ColorModel,
    pub data: ImageData,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoding = match &self.data {
            ImageData::Jpeg(_) => "jpeg",
            ImageData::Raw(_) => "raw",
        };
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color", &self.color)
            .field("encoding", &encoding)
            .finish()
    }
}

/// Document engine for the image pipeline
#[async_trait]
pub trait ImageEngine: Send + Sync {
    type Document: ImageDocument + Send;

    /// Engine name (for logging)
    fn name(&self) -> &'static str;

    /// Decode an input file into placeable pixels
    async fn decode(&self, file: &InputFile) -> Result<DecodedImage>;

    /// Create a document whose first page already exists
    fn create_document(&self, page_size: PageSize) -> Self::Document;
}

/// A document under construction by the image pipeline.
///
/// Content is always placed on the most recently added page.
pub trait ImageDocument {
    fn page_size(&self) -> PageSize;

    fn add_page(&mut self);

    fn place_image(&mut self, image: &DecodedImage, layout: &PageLayout) -> Result<()>;

    fn page_count(&self) -> usize;

    /// Finalize and serialize to PDF bytes
    fn save(self) -> Result<Vec<u8>>;
}

/// Document engine for the merge pipeline
#[async_trait]
pub trait MergeEngine: Send + Sync {
    type Source: Send;
    type Document: MergeDocument<Source = Self::Source> + Send;

    /// Engine name (for logging)
    fn name(&self) -> &'static str;

    /// Create an empty output document
    fn create_document(&self) -> Self::Document;

    /// Parse an input file; malformed bytes fail with `Error::PdfDecode`
    async fn load_document(&self, file: &InputFile) -> Result<Self::Source>;

    /// All page indices of `source`, in document order
    fn page_indices(&self, source: &Self::Source) -> Vec<PageIndex>;
}

/// An output document under construction by the merge pipeline.
pub trait MergeDocument {
    type Source;
    type Page;

    /// Import pages from `source`; returned handles follow `indices` order.
    fn copy_pages(
        &mut self,
        source: &Self::Source,
        indices: &[PageIndex],
    ) -> Result<Vec<Self::Page>>;

    /// Append a copied page to the end of the document
    fn add_page(&mut self, page: Self::Page);

    fn page_count(&self) -> usize;

    /// Finalize and serialize to PDF bytes
    fn save(self) -> Result<Vec<u8>>;
}
