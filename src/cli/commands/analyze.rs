use super::{print_json, print_summary};
use crate::engine::{PipelineOrchestrator, WorkerPoolSet};
use crate::services::{AnalyzerSettings, ConsoleProgressReporter};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// analyzeコマンドの引数
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub keep_sources: bool,
}

impl AnalyzeOptions {
    /// 設定ファイルを読み込み、コマンドライン指定で上書きする
    pub fn resolve_settings(&self) -> Result<AnalyzerSettings> {
        let mut settings = AnalyzerSettings::load_or_default(self.config.as_deref())?;
        if let Some(input) = &self.input {
            settings.input_directory = input.clone();
        }
        if let Some(output) = &self.output {
            settings.output_directory = output.clone();
        }
        if self.keep_sources {
            settings.pipeline.delete_sources_after_archive = false;
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// 入力ディレクトリ内の全 .txt ファイルを解析してアーカイブする
pub async fn execute_analyze(options: AnalyzeOptions) -> Result<()> {
    let settings = options.resolve_settings()?;
    let pipeline = settings.pipeline_config();

    eprintln!("🔍 テキスト解析開始");
    eprintln!("   - 入力ディレクトリ: {}", settings.input_directory.display());
    eprintln!("   - 出力ディレクトリ: {}", settings.output_directory.display());
    eprintln!("   - 解析ワーカー数: {}", settings.pipeline.analysis_workers);

    let pools = Arc::new(WorkerPoolSet::new(&pipeline));
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &pipeline,
        ConsoleProgressReporter::new(),
    );

    let outcome = orchestrator
        .analyze_directory(&settings.input_directory, &settings.output_directory)
        .await;
    pools.shutdown().await?;

    let report = outcome?;
    print_summary(&report);
    print_json(&report)
}
