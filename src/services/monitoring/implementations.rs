// 進捗監視の具象実装

use crate::core::{PipelineStage, ProgressReporter};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, error, info};

/// ログ出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, total_files: usize) {
        if !self.quiet {
            info!("🚀 Starting analysis of {total_files} files...");
        }
    }

    async fn report_stage(&self, stage: PipelineStage) {
        if !self.quiet {
            debug!(stage = %stage, "pipeline stage changed");
        }
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        if !self.quiet && total > 0 && (completed % 10 == 0 || completed == total) {
            let percentage = (completed as f64 / total as f64) * 100.0;
            info!("📊 Progress: {completed}/{total} ({percentage:.1}%)");
        }
    }

    async fn report_error(&self, path: &Path, error: &str) {
        if !self.quiet {
            error!("❌ Error processing {}: {error}", path.display());
        }
    }

    async fn report_completed(&self, total_processed: usize, total_errors: usize) {
        if !self.quiet {
            info!("✅ Completed! Processed: {total_processed}, Errors: {total_errors}");
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _total_files: usize) {}

    async fn report_stage(&self, _stage: PipelineStage) {}

    async fn report_progress(&self, _completed: usize, _total: usize) {}

    async fn report_error(&self, _path: &Path, _error: &str) {}

    async fn report_completed(&self, _total_processed: usize, _total_errors: usize) {}
}
