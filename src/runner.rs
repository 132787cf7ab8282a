//! The merge run: discover, select, append, write.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::MergerConfig;
use crate::error::Result;
use crate::labels;
use crate::pdf::{count_pages, LabelMerger, MergeTarget};

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The directory held no matching labels; nothing was written
    NothingToMerge { labels_dir: PathBuf },
    /// The selected labels were merged and written
    Merged {
        files: Vec<PathBuf>,
        pages: usize,
        output_path: PathBuf,
    },
    /// Dry run: the labels that would have been merged
    Planned {
        files: Vec<PathBuf>,
        pages: usize,
        output_path: PathBuf,
    },
}

impl RunOutcome {
    /// Number of label files merged (or that would be, for a dry run)
    pub fn files_merged(&self) -> usize {
        match self {
            RunOutcome::NothingToMerge { .. } => 0,
            RunOutcome::Merged { files, .. } | RunOutcome::Planned { files, .. } => files.len(),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NothingToMerge { labels_dir } => {
                write!(f, "No PDF files to merge in {}", labels_dir.display())
            }
            RunOutcome::Merged { files, output_path, .. } => {
                write!(f, "Merged {} files to {}", files.len(), output_path.display())
            }
            RunOutcome::Planned { files, output_path, .. } => {
                write!(f, "Would merge {} files to {}", files.len(), output_path.display())
            }
        }
    }
}

/// Merge the configured labels with lopdf
pub fn run(config: &MergerConfig) -> Result<RunOutcome> {
    run_with(config, LabelMerger::new())
}

/// Merge the configured labels into `target`
///
/// Fails before anything is written if the labels directory is missing or
/// any selected label can't be read.
pub fn run_with<M: MergeTarget>(config: &MergerConfig, mut target: M) -> Result<RunOutcome> {
    config.validate()?;

    let candidates = labels::discover(&config.labels_dir, &config.pattern)?;
    if candidates.is_empty() {
        info!(dir = %config.labels_dir.display(), "No labels found");
        return Ok(RunOutcome::NothingToMerge {
            labels_dir: config.labels_dir.clone(),
        });
    }

    let files = config.selection.apply(&candidates).to_vec();
    info!(
        found = candidates.len(),
        selected = files.len(),
        selection = %config.selection,
        "Selected labels"
    );

    if config.dry_run {
        let mut pages = 0;
        for path in &files {
            let count = count_pages(path)?;
            info!(path = %path.display(), pages = count, "Would append label");
            pages += count;
        }

        return Ok(RunOutcome::Planned {
            files,
            pages,
            output_path: config.output_path.clone(),
        });
    }

    for path in &files {
        debug!(path = %path.display(), "Appending label");
        target.append(path)?;
    }

    let pages = target.page_count();
    target.write(&config.output_path)?;
    info!(
        files = files.len(),
        pages,
        output = %config.output_path.display(),
        "Merged labels"
    );

    Ok(RunOutcome::Merged {
        files,
        pages,
        output_path: config.output_path.clone(),
    })
}
