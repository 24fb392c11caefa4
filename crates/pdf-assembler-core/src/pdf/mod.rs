mod document;
mod engine;
mod images;
mod layout;
mod merge;
mod page_index;

pub use engine::{
    ColorModel, DecodedImage, ImageData, ImageDocument, ImageEngine, MergeDocument, MergeEngine,
};
pub use images::{LopdfImageDocument, LopdfImageEngine, decode_image};
pub use layout::{PageLayout, PageSize, fit_to_page, mm_to_pt};
pub use merge::{LoadedPdf, LopdfMergeDocument, LopdfMergeEngine};
pub use page_index::PageIndex;
