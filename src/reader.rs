//! Low-level streaming directory enumeration.
//!
//! Wraps [`std::fs::ReadDir`] so callers never have to materialize an
//! entire directory listing in memory, which matters once a directory
//! holds millions of entries. The OS handle is released via `ReadDir`'s own
//! `Drop` on every exit path, including mid-iteration errors.

use std::ffi::OsString;
use std::fs::{self, ReadDir};
use std::io;
use std::path::Path;

/// Filesystem-reported entry-kind hint. `Unknown` means the kind could not
/// be determined without a follow-up stat (some filesystems don't return
/// `d_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Dir,
    Other,
    Unknown,
}

pub struct DirReader {
    inner: ReadDir,
}

impl DirReader {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self {
            inner: fs::read_dir(path)?,
        })
    }
}

impl Iterator for DirReader {
    type Item = io::Result<(OsString, DType)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };

            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }

            let dtype = match entry.file_type() {
                Ok(ft) if ft.is_dir() => DType::Dir,
                Ok(_) => DType::Other,
                Err(_) => DType::Unknown,
            };

            return Some(Ok((name, dtype)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn streams_entries_and_skips_dot_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let reader = DirReader::open(dir.path()).unwrap();
        let mut seen = HashSet::new();
        for entry in reader {
            let (name, dtype) = entry.unwrap();
            assert_ne!(name, ".");
            assert_ne!(name, "..");
            seen.insert((name.to_string_lossy().into_owned(), dtype));
        }

        assert!(seen.contains(&("a.txt".to_string(), DType::Other)));
        assert!(seen.contains(&("sub".to_string(), DType::Dir)));
    }

    #[test]
    fn open_missing_directory_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(DirReader::open(&missing).is_err());
    }
}
