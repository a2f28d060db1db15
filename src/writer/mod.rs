//! Output writer - places rendered pages and assets under the public directory

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SiteError};

/// What a write did on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Writes files below a root directory, creating parents as needed
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Write `contents` at `relative` (a `/`-separated path)
    ///
    /// Existing files with identical bytes are left alone.
    pub fn write(&self, relative: &str, contents: &[u8]) -> Result<WriteOutcome> {
        let path = self.root.join(relative);

        let outcome = match fs::read(&path) {
            Ok(existing) if existing == contents => return Ok(WriteOutcome::Unchanged),
            Ok(_) => WriteOutcome::Updated,
            Err(_) => WriteOutcome::Created,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SiteError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| SiteError::FileWrite {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Wrote {:?} ({:?})", path, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path().join("public"));

        let outcome = writer.write("blog/2024/post.html", b"<p>x</p>").unwrap();
        assert_eq!(outcome, WriteOutcome::Created);
        let written = fs::read_to_string(dir.path().join("public/blog/2024/post.html")).unwrap();
        assert_eq!(written, "<p>x</p>");
    }

    #[test]
    fn test_write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());

        assert_eq!(writer.write("a.html", b"one").unwrap(), WriteOutcome::Created);
        assert_eq!(writer.write("a.html", b"one").unwrap(), WriteOutcome::Unchanged);
        assert_eq!(writer.write("a.html", b"two").unwrap(), WriteOutcome::Updated);
        assert_eq!(fs::read_to_string(dir.path().join("a.html")).unwrap(), "two");
    }

    #[test]
    fn test_write_failure_is_file_write_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is needed
        fs::write(dir.path().join("blocked"), "file").unwrap();
        let writer = OutputWriter::new(dir.path());

        let err = writer.write("blocked/page.html", b"x").unwrap_err();
        assert!(matches!(err, SiteError::FileWrite { .. }));
    }
}
