//! Temporary engine artifacts that remove themselves on drop.

use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Build a collision resistant artifact file name
///
/// Pattern: `<prefix>-<unix millis>-<8 hex digits>.<ext>`
pub fn artifact_name(prefix: &str, ext: &str) -> String {
    format!(
        "{}-{}-{:08x}.{}",
        prefix,
        Utc::now().timestamp_millis(),
        rand::random::<u32>(),
        ext
    )
}

/// A file path in the temp directory owned by one engine invocation.
///
/// The file is deleted when the guard drops, whether or not it was ever
/// created, so every exit path of the invocation releases it.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Reserve a fresh name in `dir` without touching the filesystem
    pub fn reserve(dir: &Path, prefix: &str, ext: &str) -> Self {
        Self {
            path: dir.join(artifact_name(prefix, ext)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file and write `contents`
    ///
    /// Fails with `AlreadyExists` rather than overwriting another request's file.
    pub async fn write(&self, contents: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    }

    /// Read the file if something created it
    pub async fn read_if_exists(&self) -> std::io::Result<Option<String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::trace!("Removed artifact {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove artifact {}: {}", self.path.display(), e),
        }
    }
}
