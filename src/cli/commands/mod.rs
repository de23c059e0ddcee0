pub mod analyze;
pub mod config;
pub mod extract;
pub mod run;
pub mod validate;

pub use analyze::*;
pub use config::*;
pub use extract::*;
pub use run::*;
pub use validate::*;

use crate::core::PipelineReport;
use anyhow::Result;
use serde::Serialize;

/// 結果をJSONとして標準出力へ書き出す
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 実行結果の要約を標準エラーへ表示
pub(crate) fn print_summary(report: &PipelineReport) {
    let analysis = &report.analysis;
    let archive = &report.archive;

    eprintln!("\n✅ 処理完了!");
    eprintln!("📊 解析結果:");
    eprintln!("   - 処理ファイル数: {}", analysis.total_processed_files());
    eprintln!("   - 成功: {} / 失敗: {}", analysis.successful_file_count(), analysis.failed_file_count());
    eprintln!("   - 総行数: {}", analysis.total_line_count());
    eprintln!("   - 総文字数: {}", analysis.total_character_count());
    eprintln!("   - 解析時間: {:.2}ms", analysis.total_processing_time_ms());
    eprintln!("📦 アーカイブ:");
    eprintln!("   - ファイル: {}", archive.archive_file_path().display());
    eprintln!("   - エントリ数: {}", archive.archived_file_count());
    if archive.archive_file_size_bytes() >= 1024 * 1024 {
        eprintln!("   - サイズ: {:.2}MB", archive.archive_file_size_mb());
    } else {
        eprintln!("   - サイズ: {:.2}KB", archive.archive_file_size_kb());
    }
    if let Some(deletion) = &report.deletion {
        eprintln!("🗑️  ソース削除: {}件", deletion.deleted_count());
        if !deletion.is_clean() {
            eprintln!("   ⚠️  削除できなかったファイル: {}件", deletion.failed_count());
            for (path, reason) in &deletion.failed {
                eprintln!("      - {}: {reason}", path.display());
            }
        }
    }
}
