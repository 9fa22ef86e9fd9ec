//! File persistence with cleanup on failure.
//!
//! A reader of an artifact must never observe a half-written file. Writers go
//! through [`write_with_cleanup`], which removes the target when any step of
//! the write fails.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Create `path` (and its parent directories), hand a buffered writer to
/// `write`, then flush and sync.
///
/// On any error the partially written file is deleted and the original error
/// is returned.
pub fn write_with_cleanup<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<std::io::Error>,
    F: FnOnce(&mut BufWriter<File>) -> Result<(), E>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let outcome = File::create(path).map_err(E::from).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    });

    if outcome.is_err() && path.exists() {
        match fs::remove_file(path) {
            Ok(()) => debug!("Removed partially written file {}", path.display()),
            Err(e) => warn!(
                "Could not remove partially written file {}: {}",
                path.display(),
                e
            ),
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.bin");

        write_with_cleanup::<io::Error, _>(&path, |w| w.write_all(b"payload")).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.bin");

        let result = write_with_cleanup::<io::Error, _>(&path, |w| {
            w.write_all(b"half of the")?;
            w.flush()?;
            Err(io::Error::other("disk full"))
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_write_keeps_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.bin");

        let err = write_with_cleanup::<io::Error, _>(&path, |_| {
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad frame"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
