use super::print_json;
use crate::core::Archiver;
use crate::services::ArchiveBuilder;
use anyhow::Result;
use std::path::Path;

/// ZIPとして読めるかを判定して表示する
pub fn execute_validate(archive: &Path) -> Result<bool> {
    let valid = ArchiveBuilder::new().validate(archive);
    if valid {
        eprintln!("✅ 有効なZIPアーカイブです: {}", archive.display());
    } else {
        eprintln!("❌ ZIPアーカイブではありません: {}", archive.display());
    }

    print_json(&serde_json::json!({
        "archive": archive.display().to_string(),
        "valid": valid,
    }))?;
    Ok(valid)
}
