//! PDF manipulation module

pub mod merge;
pub mod metadata;

// Re-export commonly used items
pub use merge::{LabelMerger, MergeTarget};
pub use metadata::{count_pages, declared_page_count, load_document};
