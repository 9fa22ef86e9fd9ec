//! Binary artifact codec shared by the preprocessor and the models.
//!
//! Artifacts are bincode-encoded and written through
//! [`write_with_cleanup`], so a failed save never leaves a truncated file for
//! the serving form to trip over.

use crate::error::{LearningError, Result};
use fare_processing::write_with_cleanup;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Encode `value` to `path`, creating parent directories.
pub fn save_artifact<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    write_with_cleanup::<LearningError, _>(path, |writer| {
        bincode::serialize_into(writer, value)?;
        Ok(())
    })?;
    debug!("Artifact written: {}", path.display());
    Ok(())
}

/// Decode an artifact written by [`save_artifact`].
///
/// # Errors
///
/// [`LearningError::ArtifactNotFound`] when `path` does not exist,
/// [`LearningError::Serialization`] when the content cannot be decoded.
pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(LearningError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }

    // Decoding from the in-memory bytes bounds every length prefix by the
    // file size.
    let bytes = fs::read(path)?;
    let value = bincode::deserialize(&bytes)?;
    debug!("Artifact loaded: {}", path.display());
    Ok(value)
}
