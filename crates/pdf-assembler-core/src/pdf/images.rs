//! Image-to-PDF document engine built on lopdf and image.
//!
//! # Coordinate System
//!
//! Layouts arrive in millimetres with a top-left origin. PDF user space is
//! measured in points with a bottom-left origin, so placement converts with:
//! ```text
//! pdf_y = page_height - (layout_y + layout_height)
//! ```

use std::fmt::Write;

use async_trait::async_trait;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::batch::InputFile;
use crate::error::{Error, Result};

use super::document::finish_document;
use super::engine::{ColorModel, DecodedImage, ImageData, ImageDocument, ImageEngine};
use super::layout::{PageLayout, PageSize, mm_to_pt};

/// Image pipeline engine producing PDFs with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfImageEngine;

#[async_trait]
impl ImageEngine for LopdfImageEngine {
    type Document = LopdfImageDocument;

    fn name(&self) -> &'static str {
        "lopdf"
    }

    async fn decode(&self, file: &InputFile) -> Result<DecodedImage> {
        // Decoding is CPU-bound; keep it off the async runtime
        let file = file.clone();
        tokio::task::spawn_blocking(move || decode_image(&file))
            .await
            .map_err(|e| Error::Engine(format!("image decoding task failed: {e}")))?
    }

    fn create_document(&self, page_size: PageSize) -> Self::Document {
        LopdfImageDocument::new(page_size)
    }
}

/// Decode an image file into samples (or a pass-through JPEG stream).
///
/// Baseline and progressive 8-bit grayscale/RGB JPEGs are kept as-is;
/// everything else is decoded. Transparent pixels are composited over white.
pub fn decode_image(file: &InputFile) -> Result<DecodedImage> {
    let decode_error = |reason: String| Error::ImageDecode {
        file: file.name().to_string(),
        reason,
    };

    let bytes = file.bytes();
    let format = image::guess_format(bytes).map_err(|e| decode_error(e.to_string()))?;
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| decode_error(e.to_string()))?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(decode_error("image has no pixels".to_string()));
    }

    if format == ImageFormat::Jpeg {
        let color = match jpeg_frame_info(bytes) {
            Some((8, 1)) => Some(ColorModel::Gray),
            Some((8, 3)) => Some(ColorModel::Rgb),
            _ => None,
        };
        if let Some(color) = color {
            debug!("Embedding {} as JPEG ({}x{})", file.name(), width, height);
            return Ok(DecodedImage {
                width,
                height,
                color,
                data: ImageData::Jpeg(bytes.clone()),
            });
        }
    }

    debug!("Embedding {} as {:?} samples ({}x{})", file.name(), img.color(), width, height);
    Ok(to_samples(&img))
}

fn to_samples(img: &DynamicImage) -> DecodedImage {
    let (width, height) = img.dimensions();
    let color = img.color();

    if color.has_alpha() {
        let rgba = img.to_rgba8();
        let mut samples = Vec::with_capacity(rgba.len() / 4 * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            samples.extend([r, g, b].map(|c| over_white(c, a)));
        }
        return DecodedImage {
            width,
            height,
            color: ColorModel::Rgb,
            data: ImageData::Raw(samples),
        };
    }

    if matches!(color, ColorType::L8 | ColorType::L16) {
        return DecodedImage {
            width,
            height,
            color: ColorModel::Gray,
            data: ImageData::Raw(img.to_luma8().into_raw()),
        };
    }

    DecodedImage {
        width,
        height,
        color: ColorModel::Rgb,
        data: ImageData::Raw(img.to_rgb8().into_raw()),
    }
}

/// Blend one channel with alpha over a white background.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u16::from(channel), u16::from(alpha));
    let blended = (c * a + 255 * (255 - a) + 127) / 255;
    u8::try_from(blended).unwrap_or(u8::MAX)
}

/// Read (sample precision, component count) from the first SOF marker.
fn jpeg_frame_info(data: &[u8]) -> Option<(u8, u8)> {
    if data.get(..2)? != [0xFF, 0xD8] {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            // Fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // SOF0-SOF15, excluding DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return Some((*data.get(pos + 4)?, *data.get(pos + 9)?));
            }
            _ => {}
        }
        let len = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));
        pos += 2 + len;
    }

    None
}

/// Content and image resources of one page.
#[derive(Default)]
struct PageContent {
    operations: String,
    images: Vec<(String, ObjectId)>,
}

/// A PDF being assembled from images, one or more per page.
pub struct LopdfImageDocument {
    document: Document,
    page_size: PageSize,
    pages: Vec<PageContent>,
}

impl LopdfImageDocument {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            document: Document::with_version("1.5"),
            page_size,
            pages: vec![PageContent::default()],
        }
    }
}

impl ImageDocument for LopdfImageDocument {
    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn add_page(&mut self) {
        self.pages.push(PageContent::default());
    }

    fn place_image(&mut self, image: &DecodedImage, layout: &PageLayout) -> Result<()> {
        let page_height = self.page_size.height_pt();
        let image_id = self.document.add_object(image_stream(image));

        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| Error::Engine("document has no pages".to_string()))?;

        let name = format!("Im{}", page.images.len() + 1);
        let width = mm_to_pt(layout.width);
        let height = mm_to_pt(layout.height);
        let x = mm_to_pt(layout.x);
        let y = page_height - mm_to_pt(layout.y) - height;

        let _ = writeln!(
            page.operations,
            "q\n{width:.4} 0 0 {height:.4} {x:.4} {y:.4} cm\n/{name} Do\nQ"
        );
        page.images.push((name, image_id));

        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn save(mut self) -> Result<Vec<u8>> {
        let pages_id = self.document.new_object_id();

        #[allow(clippy::cast_possible_truncation)]
        let media_box = Object::Array(vec![
            0.into(),
            0.into(),
            Object::Real(self.page_size.width_pt() as f32),
            Object::Real(self.page_size.height_pt() as f32),
        ]);

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let content_id = self
                .document
                .add_object(Stream::new(Dictionary::new(), page.operations.into_bytes()));

            let xobjects: Dictionary = page
                .images
                .into_iter()
                .map(|(name, id)| (name, Object::Reference(id)))
                .collect();

            let page_id = self.document.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("MediaBox", media_box.clone()),
                ("Contents", Object::Reference(content_id)),
                (
                    "Resources",
                    Object::Dictionary(Dictionary::from_iter([(
                        "XObject",
                        Object::Dictionary(xobjects),
                    )])),
                ),
            ]));
            kids.push(Object::Reference(page_id));
        }

        finish_document(&mut self.document, pages_id, kids)?;

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|e| Error::Engine(format!("Failed to save PDF: {e}")))?;

        Ok(output)
    }
}

/// Build the image XObject for a decoded image.
fn image_stream(image: &DecodedImage) -> Stream {
    let mut dict = Dictionary::from_iter([
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(image.width))),
        ("Height", Object::Integer(i64::from(image.height))),
        ("ColorSpace", Object::Name(image.color.pdf_name().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ]);

    match &image.data {
        ImageData::Jpeg(data) => {
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
            Stream::new(dict, data.to_vec()).with_compression(false)
        }
        ImageData::Raw(samples) => Stream::new(dict, samples.clone()),
    }
}
