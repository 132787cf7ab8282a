//! Label Merger Library
//!
//! Concatenates a directory of shipping-label PDFs into one document.
//! This library provides functionality to:
//! - Discover label PDFs in a directory, sorted by file name
//! - Select all labels or only the most recent ones
//! - Merge their pages, in order, into a single PDF
//!
//! # Example
//!
//! ```no_run
//! use label_merger::{run, MergeSelection, MergerConfig};
//! use std::path::Path;
//!
//! let mut config = MergerConfig::relative_to(Path::new("python"));
//! config.selection = MergeSelection::LastN(5);
//!
//! let outcome = run(&config).expect("Failed to merge labels");
//! println!("{}", outcome);
//! ```

pub mod config;
pub mod error;
pub mod labels;
pub mod pdf;
pub mod runner;

// Re-export commonly used items
pub use config::{MergeSelection, MergerConfig};
pub use error::{Error, Result};
pub use runner::{run, run_with, RunOutcome};
