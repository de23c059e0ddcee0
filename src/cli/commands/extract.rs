use super::print_json;
use crate::engine::{PipelineOrchestrator, WorkerPoolSet};
use crate::services::{ConsoleProgressReporter, DefaultPipelineConfig};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// アーカイブを検証して展開する
pub async fn execute_extract(archive: &Path, dest: &Path) -> Result<()> {
    let pipeline = DefaultPipelineConfig::default();

    eprintln!("📦 アーカイブ展開: {}", archive.display());
    eprintln!("   - 展開先: {}", dest.display());

    let pools = Arc::new(WorkerPoolSet::new(&pipeline));
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &pipeline,
        ConsoleProgressReporter::quiet(),
    );

    let outcome = orchestrator.extract_archive(archive, dest).await;
    pools.shutdown().await?;

    let report = outcome?;
    eprintln!(
        "✅ 展開完了: {}エントリ ({}ファイル, {}ディレクトリ, {}バイト)",
        report.total_items(),
        report.files_extracted,
        report.directories_created,
        report.bytes_written
    );
    if report.has_skipped_entries() {
        eprintln!(
            "⚠️  展開先の外を指す{}個のエントリをスキップしました",
            report.entries_skipped.len()
        );
    }
    print_json(&report)
}
