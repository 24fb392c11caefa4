//! PDF merge engine built on lopdf.
//!
//! Pages are copied by renumbering the source document's objects above the
//! output's current maximum id and moving every object except the source's
//! document structure (catalog, page tree nodes, outlines) into the output.
//! Attributes a page inherits from its page tree are copied onto the page
//! itself, since the source's tree is not carried over.

use async_trait::async_trait;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::batch::InputFile;
use crate::error::{Error, Result};

use super::document::finish_document;
use super::engine::{MergeDocument, MergeEngine};
use super::page_index::PageIndex;

/// Page attributes that may be inherited from an ancestor `Pages` node.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Merge pipeline engine backed by lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfMergeEngine;

#[async_trait]
impl MergeEngine for LopdfMergeEngine {
    type Source = LoadedPdf;
    type Document = LopdfMergeDocument;

    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn create_document(&self) -> Self::Document {
        LopdfMergeDocument::new()
    }

    async fn load_document(&self, file: &InputFile) -> Result<Self::Source> {
        // Parse in a blocking task to avoid blocking the async runtime
        let file = file.clone();
        tokio::task::spawn_blocking(move || LoadedPdf::from_bytes(file.name(), file.bytes()))
            .await
            .map_err(|e| Error::Engine(format!("PDF parsing task failed: {e}")))?
    }

    fn page_indices(&self, source: &Self::Source) -> Vec<PageIndex> {
        source.page_indices()
    }
}

/// A parsed input PDF.
pub struct LoadedPdf {
    name: String,
    document: Document,
}

impl LoadedPdf {
    /// Parse PDF bytes. Encrypted documents are rejected.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let decode_error = |reason: String| Error::PdfDecode {
            file: name.to_string(),
            reason,
        };

        let document = Document::load_mem(bytes).map_err(|e| decode_error(e.to_string()))?;
        if document.is_encrypted() {
            return Err(decode_error("document is encrypted".to_string()));
        }

        debug!("Loaded {} ({} pages)", name, document.get_pages().len());
        Ok(Self {
            name: name.to_string(),
            document,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn page_indices(&self) -> Vec<PageIndex> {
        self.document
            .get_pages()
            .keys()
            .filter_map(|&number| PageIndex::from_lopdf_page_number(number))
            .collect()
    }
}

impl std::fmt::Debug for LoadedPdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPdf")
            .field("name", &self.name)
            .field("page_count", &self.page_count())
            .finish()
    }
}

/// Output document of a merge.
pub struct LopdfMergeDocument {
    document: Document,
    pages: Vec<ObjectId>,
}

impl LopdfMergeDocument {
    pub fn new() -> Self {
        Self {
            document: Document::with_version("1.5"),
            pages: Vec::new(),
        }
    }
}

impl Default for LopdfMergeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeDocument for LopdfMergeDocument {
    type Source = LoadedPdf;
    type Page = ObjectId;

    fn copy_pages(
        &mut self,
        source: &Self::Source,
        indices: &[PageIndex],
    ) -> Result<Vec<ObjectId>> {
        let mut doc = source.document.clone();
        doc.renumber_objects_with(self.document.max_id + 1);
        let next_max_id = doc.max_id;

        let source_pages = doc.get_pages();
        let page_ids = indices
            .iter()
            .map(|index| {
                source_pages
                    .get(&index.as_lopdf_page_number())
                    .copied()
                    .ok_or(Error::PdfInvalidPage {
                        page: index.as_usize(),
                        total: source_pages.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        for &page_id in &page_ids {
            let inherited = inherited_attributes(&doc, page_id);
            let page = doc.get_dictionary_mut(page_id)?;
            for (key, value) in inherited {
                page.set(key, value);
            }
        }

        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Outlines" | b"Outline" => {}
                _ => {
                    self.document.objects.insert(object_id, object);
                }
            }
        }
        self.document.max_id = self.document.max_id.max(next_max_id);

        debug!("Copied {} pages from {}", page_ids.len(), source.name());
        Ok(page_ids)
    }

    fn add_page(&mut self, page: ObjectId) {
        self.pages.push(page);
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn save(mut self) -> Result<Vec<u8>> {
        let pages_id = self.document.new_object_id();

        for &page_id in &self.pages {
            let page = self.document.get_dictionary_mut(page_id)?;
            page.set("Parent", Object::Reference(pages_id));
        }

        let kids = self.pages.iter().map(|&id| Object::Reference(id)).collect();
        finish_document(&mut self.document, pages_id, kids)?;

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|e| Error::Engine(format!("Failed to save merged PDF: {e}")))?;

        Ok(output)
    }
}

/// Inheritable attributes missing from the page but set on an ancestor.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    INHERITABLE_KEYS
        .into_iter()
        .filter(|&key| !page.has(key))
        .filter_map(|key| {
            let mut node = page;
            for _ in 0..MAX_TREE_DEPTH {
                let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
                node = doc.get_dictionary(parent_id).ok()?;
                if let Ok(value) = node.get(key) {
                    return Some((key, value.clone()));
                }
            }
            None
        })
        .collect()
}
