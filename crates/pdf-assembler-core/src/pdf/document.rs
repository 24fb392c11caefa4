//! Document structure shared by both lopdf engines.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Write the page tree, catalog and trailer, then compress eligible streams.
///
/// `pages_id` must already be reserved in `document`, and every kid's
/// `Parent` must point at it.
pub(crate) fn finish_document(
    document: &mut Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
) -> Result<()> {
    let count = i64::try_from(kids.len()).map_err(|e| Error::Engine(e.to_string()))?;

    let pages_dict = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(count)),
    ]);
    document.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = document.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    document.trailer.set("Root", Object::Reference(catalog_id));
    document.compress();

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_tree_and_catalog() {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let kids = (0..2)
            .map(|_| {
                Object::Reference(document.add_object(Dictionary::from_iter([
                    ("Type", Object::Name(b"Page".to_vec())),
                    ("Parent", Object::Reference(pages_id)),
                    ("MediaBox", vec![0.into(), 0.into(), 100.into(), 100.into()].into()),
                ])))
            })
            .collect();

        finish_document(&mut document, pages_id, kids).unwrap();

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 2);

        let catalog = reloaded.catalog().unwrap();
        assert_eq!(catalog.get(b"Type").unwrap().as_name().unwrap(), b"Catalog");
    }
}
