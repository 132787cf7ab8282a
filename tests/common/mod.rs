//! Shared fixtures for integration tests
//!
//! Label PDFs are generated with lopdf. Every page carries a `LabelId`
//! string (`<name>-<page>`) so merged output can be checked page by page.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Write a label PDF called `<name>.pdf` with `pages` pages into `dir`
pub fn write_label(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(format!("{name}.pdf"));
    label_document(name, pages)
        .save(&path)
        .expect("Failed to write label fixture");
    path
}

/// Build a label document; Resources and MediaBox live on the page tree root
pub fn label_document(name: &str, pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for i in 1..=pages {
        let content = format!("BT /F1 18 Tf 36 360 Td (Label {name} page {i}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "LabelId" => Object::string_literal(format!("{name}-{i}")),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 288.into(), 432.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// `LabelId` of every page of the PDF at `path`, in page order
pub fn page_labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("Failed to load merged PDF");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).expect("Page is not a dictionary");
            let label = page
                .get(b"LabelId")
                .and_then(Object::as_str)
                .expect("Page has no LabelId");
            String::from_utf8_lossy(label).into_owned()
        })
        .collect()
}
