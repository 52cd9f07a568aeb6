//! Write-then-rename file replacement
//!
//! Readers see either the previous file or the complete new one, never a
//! partially written file.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Replace `path` with `contents` via a temp sibling and a rename
///
/// The temp file is removed on drop if any step fails.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_replaces_contents_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_directory_target_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();

        assert!(write_atomic(&path, b"data").is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(path.is_dir());
    }

    #[test]
    fn test_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent").join("out.txt");

        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }
}
