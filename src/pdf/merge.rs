//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::pdf::metadata::{declared_page_count, load_document};

/// Value written to the merged document's `Producer` entry
pub const PRODUCER: &str = concat!("label-merger ", env!("CARGO_PKG_VERSION"));

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards the parent walk against cyclic page trees
const MAX_TREE_DEPTH: usize = 64;

/// Something that accumulates pages and writes them out once.
pub trait MergeTarget {
    /// Append every page of the PDF at `path`, in order. Returns the
    /// number of pages appended.
    fn append(&mut self, path: &Path) -> Result<usize>;

    /// Pages accumulated so far
    fn page_count(&self) -> usize;

    /// Serialize the accumulated pages to `output_path`, replacing any
    /// existing file.
    fn write(&mut self, output_path: &Path) -> Result<()>;
}

/// In-memory merge of label PDFs
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// Objects from each appended document are renumbered past the ones
/// already held, so documents never collide. The page tree is built
/// once, when the merge is written.
#[derive(Debug)]
pub struct LabelMerger {
    objects: BTreeMap<ObjectId, Object>,
    page_ids: Vec<ObjectId>,
    next_id: u32,
}

impl Default for LabelMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelMerger {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            page_ids: Vec::new(),
            next_id: 1,
        }
    }

    /// Append an already loaded document. Returns the number of pages added.
    pub fn append_document(&mut self, mut doc: Document) -> lopdf::Result<usize> {
        if let Some(declared) = declared_page_count(&doc) {
            let found = doc.get_pages().len();
            if declared != found {
                warn!(declared, found, "Page tree count disagrees with its pages");
            }
        }

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(self.next_id);
        self.next_id = doc.max_id + 1;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        // Pages are re-parented on write; pull down anything they inherit first
        for &page_id in &pages {
            inherit_page_attributes(&mut doc, page_id)?;
        }

        // The old catalog, page tree, xref streams and Info are replaced on write
        let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok();
        self.objects.extend(doc.objects.into_iter().filter(|(id, object)| {
            Some(*id) != info_id && !is_page_tree_node(object) && !is_xref_stream(object)
        }));
        self.page_ids.extend(&pages);

        Ok(pages.len())
    }

    /// Assemble the merged document, leaving the merger empty.
    fn take_document(&mut self) -> Document {
        let objects = std::mem::take(&mut self.objects);
        let page_ids = std::mem::take(&mut self.page_ids);
        let max_id = self.next_id - 1;
        self.next_id = 1;

        let mut merged_doc = Document::with_version("1.5");
        merged_doc.objects.extend(objects);

        // new_object_id() must hand out IDs above everything just added
        merged_doc.max_id = max_id;
        let pages_id = merged_doc.new_object_id();

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(page_ids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));

        let catalog_id = merged_doc.new_object_id();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));

        merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
        merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
        merged_doc.trailer.set("Root", Object::Reference(catalog_id));

        let info_id = merged_doc.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(
                Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
            ),
        });
        merged_doc.trailer.set("Info", Object::Reference(info_id));

        for &page_id in &page_ids {
            if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        merged_doc.compress();
        merged_doc
    }
}

impl MergeTarget for LabelMerger {
    fn append(&mut self, path: &Path) -> Result<usize> {
        let doc = load_document(path)?;

        let pages = self.append_document(doc).map_err(|source| Error::CorruptInputFile {
            path: path.to_path_buf(),
            source,
        })?;

        if pages == 0 {
            warn!(path = %path.display(), "Label has no pages");
        } else {
            debug!(path = %path.display(), pages, "Appended label");
        }

        Ok(pages)
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn write(&mut self, output_path: &Path) -> Result<()> {
        let mut merged_doc = self.take_document();
        save_atomically(&mut merged_doc, output_path)?;
        debug!(path = %output_path.display(), "Wrote merged document");
        Ok(())
    }
}

/// Whether an object is a `Catalog` or `Pages` dictionary
fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Catalog") | Ok(b"Pages")
        ),
        _ => false,
    }
}

fn is_xref_stream(object: &Object) -> bool {
    match object {
        Object::Stream(stream) => matches!(
            stream.dict.get(b"Type").and_then(Object::as_name),
            Ok(b"XRef")
        ),
        _ => false,
    }
}

/// Copy inheritable attributes the page does not set itself from the
/// nearest ancestor that does.
fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) -> lopdf::Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE_KEYS {
            if page.has(key) {
                continue;
            }
            if let Some(value) = find_inherited(doc, page, key) {
                inherited.push((key, value));
            }
        }
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }

    Ok(())
}

fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent_id = page.get(b"Parent").and_then(Object::as_reference).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        let parent = doc.get_dictionary(parent_id).ok()?;
        if let Ok(value) = parent.get(key) {
            return Some(value.clone());
        }
        parent_id = parent.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Write to a temporary file beside `output_path`, then rename it over
/// the destination.
fn save_atomically(doc: &mut Document, output_path: &Path) -> Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_failure(output_path, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        doc.save_to(&mut writer)
            .map_err(|e| write_failure(output_path, std::io::Error::other(e)))?;
        writer.flush().map_err(|e| write_failure(output_path, e))?;
    }

    temp.persist(output_path)
        .map_err(|e| write_failure(output_path, e.error))?;

    Ok(())
}

fn write_failure(path: &Path, source: std::io::Error) -> Error {
    Error::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}
