use super::{FileStore, StorageItem};
use anyhow::{Context, Result};
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use walkdir::WalkDir;

/// ローカルファイルシステム用のファイルストア
#[derive(Debug, Clone, Copy)]
pub struct LocalFileStore;

impl Default for LocalFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }

    fn entry_to_storage_item(entry: &walkdir::DirEntry) -> Result<StorageItem> {
        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to get metadata for: {}", entry.path().display()))?;

        Ok(StorageItem {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            is_directory: metadata.is_dir(),
        })
    }
}

impl FileStore for LocalFileStore {
    fn list_items(&self, dir: &Path) -> Result<Vec<StorageItem>> {
        let mut items = Vec::new();

        // 直下のエントリのみを対象にする
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry =
                entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
            items.push(Self::entry_to_storage_item(&entry)?);
        }

        Ok(items)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == IoErrorKind::NotFound => Ok(()),
            Err(error) => {
                Err(error).with_context(|| format!("Failed to delete file: {}", path.display()))
            }
        }
    }
}
