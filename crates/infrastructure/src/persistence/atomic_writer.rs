//! Crash-safe file replacement.
//!
//! The payload goes to a sibling temporary file in the destination
//! directory, is synced to disk, gets its permission bits, and is then
//! renamed over the destination. Readers see either the old file or the
//! new one, never a mix.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Writes a whole file in one atomic step.
#[async_trait]
pub trait AtomicWriter: Send + Sync {
    /// Replaces `path` with `bytes`, applying the unix permission `mode`.
    ///
    /// # Errors
    ///
    /// Returns the first failing I/O step. The destination is untouched
    /// and no temporary file is left behind.
    async fn write(&self, path: &Path, bytes: &[u8], mode: u32) -> io::Result<()>;
}

/// [`AtomicWriter`] on top of `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioAtomicWriter;

impl TokioAtomicWriter {
    /// Creates a new writer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or("config");
        path.with_file_name(format!(".{name}.{}.tmp", Uuid::now_v7()))
    }

    async fn stage(tmp: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(tmp)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        set_mode(tmp, mode).await
    }
}

#[async_trait]
impl AtomicWriter for TokioAtomicWriter {
    async fn write(&self, path: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
        let tmp = Self::temp_path(path);

        let result = match Self::stage(&tmp, bytes, mode).await {
            Ok(()) => fs::rename(&tmp, path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(err);
        }

        // Persist the rename itself; not every platform can open a directory.
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty())
            && let Ok(handle) = fs::File::open(dir).await
        {
            let _ = handle.sync_all().await;
        }
        Ok(())
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
