//! Run configuration: where labels live, where the merge goes, and which
//! labels take part.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of labels kept by `last` when no count is given
pub const DEFAULT_LAST_N: usize = 5;

/// Filename pattern used when none is configured
pub const DEFAULT_PATTERN: &str = "*.pdf";

/// Which of the sorted labels participate in a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeSelection {
    /// Every discovered label
    #[default]
    All,
    /// Only the final `n` labels in sort order
    LastN(usize),
}

impl MergeSelection {
    /// Apply the policy to an already sorted list, keeping order.
    ///
    /// `LastN(n)` with fewer than `n` files keeps all of them.
    pub fn apply<'a, T>(&self, sorted: &'a [T]) -> &'a [T] {
        match *self {
            MergeSelection::All => sorted,
            MergeSelection::LastN(n) => &sorted[sorted.len().saturating_sub(n)..],
        }
    }
}

impl FromStr for MergeSelection {
    type Err = Error;

    /// Parse `all`, `last` or `last:N` (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();

        match value.as_str() {
            "all" => Ok(MergeSelection::All),
            "last" => Ok(MergeSelection::LastN(DEFAULT_LAST_N)),
            _ => {
                let count = value
                    .strip_prefix("last:")
                    .ok_or_else(|| Error::InvalidSelection(format!(
                        "{s} (expected all, last or last:N)"
                    )))?;

                match count.trim().parse::<usize>() {
                    Ok(0) => Err(Error::InvalidSelection(format!(
                        "{s} (N must be at least 1)"
                    ))),
                    Ok(n) => Ok(MergeSelection::LastN(n)),
                    Err(_) => Err(Error::InvalidSelection(format!(
                        "{s} (N must be a positive integer)"
                    ))),
                }
            }
        }
    }
}

impl fmt::Display for MergeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeSelection::All => write!(f, "all"),
            MergeSelection::LastN(n) => write!(f, "last:{n}"),
        }
    }
}

/// Everything a single merge run needs
#[derive(Debug, Clone)]
pub struct MergerConfig {
    /// Directory scanned for label PDFs
    pub labels_dir: PathBuf,
    /// Destination of the merged PDF (overwritten if present)
    pub output_path: PathBuf,
    /// Which of the sorted labels are merged
    pub selection: MergeSelection,
    /// Case-insensitive glob matched against file names
    pub pattern: String,
    /// Discover and select only; write nothing
    pub dry_run: bool,
}

impl MergerConfig {
    /// Default layout relative to `base`: labels in `../backend/labels`,
    /// output at `../backend/merged_labels.pdf`.
    pub fn relative_to(base: &Path) -> Self {
        let backend = base.join("..").join("backend");

        Self {
            labels_dir: backend.join("labels"),
            output_path: backend.join("merged_labels.pdf"),
            selection: MergeSelection::default(),
            pattern: DEFAULT_PATTERN.to_string(),
            dry_run: false,
        }
    }

    /// Default layout relative to the directory holding the running executable
    pub fn for_program() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let base = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::relative_to(base))
    }

    /// Check the values that can't be enforced by construction
    pub fn validate(&self) -> Result<()> {
        if self.selection == MergeSelection::LastN(0) {
            return Err(Error::InvalidSelection("last:0 selects nothing".to_string()));
        }

        glob::Pattern::new(&self.pattern)
            .map_err(|e| Error::InvalidGlob(format!("{}: {}", self.pattern, e)))?;

        Ok(())
    }
}
