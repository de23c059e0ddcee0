use anyhow::Result;
use mockall::automock;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod local;

/// 解析・アーカイブ対象となる拡張子
pub const ELIGIBLE_EXTENSION: &str = ".txt";

/// ファイル名が対象拡張子で終わるかを判定（大文字小文字を区別しない）
pub fn has_eligible_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .to_lowercase()
                .ends_with(ELIGIBLE_EXTENSION)
        })
        .unwrap_or(false)
}

/// ストレージ内のアイテムを表す構造体
#[derive(Debug, Clone, PartialEq)]
pub struct StorageItem {
    /// アイテムのフルパス
    pub path: PathBuf,
    /// アイテム名（ファイル名）
    pub name: String,
    /// アイテムのサイズ（バイト）
    pub size: u64,
    /// アイテムがディレクトリかどうか
    pub is_directory: bool,
}

/// アイテムの合計サイズ（ディレクトリは含めない）
pub fn total_size(items: &[StorageItem]) -> u64 {
    items
        .iter()
        .filter(|item| !item.is_directory)
        .map(|item| item.size)
        .sum()
}

/// パイプラインが利用するファイルストアのトレイト
///
/// ワーカースレッド上から同期的に呼ばれる。
#[automock]
pub trait FileStore: Send + Sync {
    /// ディレクトリ直下のアイテムをリストする（再帰しない）
    fn list_items(&self, dir: &Path) -> Result<Vec<StorageItem>>;

    /// ディレクトリを作成する（既存なら何もしない）
    fn ensure_dir(&self, dir: &Path) -> Result<()>;

    /// ファイルを削除する（存在しなければ何もしない）
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// 対象ファイルかどうかを判定
    fn is_eligible(&self, item: &StorageItem) -> bool {
        !item.is_directory && has_eligible_extension(&item.path)
    }

    /// 対象ファイルを名前順でリストする
    fn list_eligible(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut items: Vec<StorageItem> = self
            .list_items(dir)?
            .into_iter()
            .filter(|item| self.is_eligible(item))
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            "Found {} eligible files ({} bytes) in {}",
            items.len(),
            total_size(&items),
            dir.display()
        );
        Ok(items.into_iter().map(|item| item.path).collect())
    }
}

// FileStore for Box<dyn FileStore>
impl FileStore for Box<dyn FileStore> {
    fn list_items(&self, dir: &Path) -> Result<Vec<StorageItem>> {
        self.as_ref().list_items(dir)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        self.as_ref().ensure_dir(dir)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.as_ref().remove_file(path)
    }

    fn is_eligible(&self, item: &StorageItem) -> bool {
        self.as_ref().is_eligible(item)
    }

    fn list_eligible(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.as_ref().list_eligible(dir)
    }
}
