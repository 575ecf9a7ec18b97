use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

const DOWNLOADS_SUBDIR: &str = "Downloads";
const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("download file name is empty")]
    MissingFileName,
    #[error("download file name must not contain path separators: {0}")]
    InvalidFileName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Destination for exported bitmaps when they are offered as a download.
pub trait DownloadSink {
    fn save_download(&self, file_name: &str, bytes: &[u8]) -> StorageResult<PathBuf>;
}

#[derive(Debug, Clone)]
pub struct DownloadStorage {
    downloads_dir: PathBuf,
}

impl DownloadStorage {
    pub const fn with_dir(downloads_dir: PathBuf) -> Self {
        Self { downloads_dir }
    }

    pub fn with_default_paths() -> StorageResult<Self> {
        let home = std::env::var_os("HOME").ok_or(StorageError::MissingHomeDirectory)?;
        let mut downloads_dir = PathBuf::from(home);
        downloads_dir.push(DOWNLOADS_SUBDIR);
        fs::create_dir_all(&downloads_dir)?;
        Ok(Self::with_dir(downloads_dir))
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    fn validate_file_name(file_name: &str) -> StorageResult<()> {
        if file_name.is_empty() {
            return Err(StorageError::MissingFileName);
        }
        if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
            return Err(StorageError::InvalidFileName(file_name.to_string()));
        }
        Ok(())
    }

    pub fn allocate_target_path(&self, file_name: &str) -> StorageResult<PathBuf> {
        Self::validate_file_name(file_name)?;
        Ok(self.downloads_dir.join(file_name))
    }
}

impl DownloadSink for DownloadStorage {
    fn save_download(&self, file_name: &str, bytes: &[u8]) -> StorageResult<PathBuf> {
        let target = self.allocate_target_path(file_name)?;
        save_overwrite(bytes, &target)?;
        tracing::info!(path = %target.display(), bytes = bytes.len(), "download written");
        Ok(target)
    }
}

/// Writes next to the destination first so a failed write never leaves a truncated file behind.
fn save_overwrite(bytes: &[u8], destination: &Path) -> StorageResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut partial = destination.as_os_str().to_owned();
    partial.push(PARTIAL_SUFFIX);
    let partial = PathBuf::from(partial);
    fs::write(&partial, bytes)?;
    if let Err(err) = fs::rename(&partial, destination) {
        let _ = fs::remove_file(&partial);
        return Err(StorageError::Io(err));
    }
    Ok(())
}
