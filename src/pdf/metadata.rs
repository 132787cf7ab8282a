//! Loading labels and reading their page counts

use std::path::Path;

use lopdf::{Document, Object};

use crate::error::{Error, Result};

/// Load a label PDF, naming the file if it can't be parsed
pub fn load_document(path: &Path) -> Result<Document> {
    Document::load(path).map_err(|source| Error::CorruptInputFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Count pages by reading the Count field from the Pages dictionary
///
/// Returns `None` when the catalog has no readable page tree.
pub fn declared_page_count(doc: &Document) -> Option<usize> {
    let catalog_id = doc.trailer.get(b"Root").and_then(Object::as_reference).ok()?;

    let pages_id = doc
        .get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .ok()?;

    let count = doc
        .get_dictionary(pages_id)
        .and_then(|pages| pages.get(b"Count"))
        .and_then(Object::as_i64)
        .ok()?;

    usize::try_from(count).ok()
}

/// Count the pages of a label without merging it
pub fn count_pages(path: &Path) -> Result<usize> {
    let doc = load_document(path)?;
    Ok(doc.get_pages().len())
}
