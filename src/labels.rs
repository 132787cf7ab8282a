//! Label discovery: list the labels directory, keep matching files, sort
//! them by name.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::error::{Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Find every regular file in `dir` whose name matches `pattern`
/// (case-insensitively), sorted by file name.
///
/// Sub-directories and non-matching files are skipped. The sort is a plain
/// lexicographic comparison of file names, so `label-10.pdf` sorts before
/// `label-2.pdf`.
pub fn discover(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let pattern = Pattern::new(pattern)
        .map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;

    let read_failure = |source: std::io::Error| Error::ReadDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failure)? {
        let entry = entry.map_err(read_failure)?;
        let path = entry.path();

        if !path.is_file() {
            debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }

        let name = entry.file_name();
        if pattern.matches_with(&name.to_string_lossy(), MATCH_OPTIONS) {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-matching file");
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("labels");

        let result = discover(&missing, "*.pdf");
        assert!(matches!(result, Err(Error::DirectoryNotFound(p)) if p == missing));
    }

    #[test]
    fn test_file_instead_of_directory() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "labels");

        let result = discover(&temp_dir.path().join("labels"), "*.pdf");
        assert!(matches!(result, Err(Error::DirectoryNotFound(_))));
    }

    #[test]
    fn test_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["c.pdf", "a.PDF", "notes.txt", "b.Pdf", "pdf", "archive.pdf.bak"] {
            touch(dir, name);
        }
        fs::create_dir(dir.join("nested.pdf")).unwrap();

        let files = discover(dir, "*.pdf").unwrap();
        assert_eq!(names(&files), ["a.PDF", "b.Pdf", "c.pdf"]);
    }

    #[test]
    fn test_sort_is_plain_lexicographic() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["label-2.pdf", "label-10.pdf", "Label-3.pdf", "label-1.pdf"] {
            touch(dir, name);
        }

        let files = discover(dir, "*.pdf").unwrap();
        assert_eq!(
            names(&files),
            ["Label-3.pdf", "label-1.pdf", "label-10.pdf", "label-2.pdf"]
        );
    }

    #[test]
    fn test_hidden_files_match() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), ".pdf");
        touch(temp_dir.path(), ".hidden.pdf");

        let files = discover(temp_dir.path(), "*.pdf").unwrap();
        assert_eq!(names(&files), [".hidden.pdf", ".pdf"]);
    }

    #[test]
    fn test_custom_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["label-1.pdf", "invoice-1.pdf", "LABEL-2.pdf"] {
            touch(dir, name);
        }

        let files = discover(dir, "label-*.pdf").unwrap();
        assert_eq!(names(&files), ["LABEL-2.pdf", "label-1.pdf"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let result = discover(temp_dir.path(), "[");
        assert!(matches!(result, Err(Error::InvalidGlob(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_names_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("labels");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).unwrap();

        // Root can list it anyway
        let readable = fs::read_dir(&dir).is_ok();
        let result = discover(&dir, "*.pdf");
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        match result {
            Err(e @ Error::ReadDirectory { .. }) => {
                assert!(e.to_string().contains(&dir.display().to_string()));
            }
            other => panic!("Expected ReadDirectory, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover(temp_dir.path(), "*.pdf").unwrap().is_empty());
    }
}
