use super::{print_json, print_summary};
use crate::engine::{PipelineOrchestrator, WorkerPoolSet};
use crate::services::{ConsoleProgressReporter, DefaultPipelineConfig};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// runコマンドの引数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub files: Vec<PathBuf>,
    pub input: PathBuf,
    pub archive: PathBuf,
    pub keep_sources: bool,
}

/// 指定されたファイル群を解析し、入力ディレクトリをアーカイブする
pub async fn execute_run(options: RunOptions) -> Result<()> {
    let pipeline = DefaultPipelineConfig::new().with_delete_sources(!options.keep_sources);

    eprintln!("🔍 テキスト解析開始 ({}ファイル)", options.files.len());
    eprintln!("   - 入力ディレクトリ: {}", options.input.display());
    eprintln!("   - 出力アーカイブ: {}", options.archive.display());

    let pools = Arc::new(WorkerPoolSet::new(&pipeline));
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &pipeline,
        ConsoleProgressReporter::new(),
    );

    let outcome = orchestrator
        .run_pipeline(options.files, &options.input, &options.archive)
        .await;
    pools.shutdown().await?;

    let report = outcome?;
    print_summary(&report);
    print_json(&report)
}
