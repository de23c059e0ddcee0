// パイプラインのトレイト定義
// ワーカー上で動く各機能と設定・進捗報告を抽象化する

use super::error::ProcessingResult;
use super::types::{AnalysisResult, ArchiveInfo, DeletionReport, ExtractionReport, FileStats, PipelineStage};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use mockall::automock;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// パイプラインの設定を抽象化するトレイト
#[automock]
pub trait PipelineConfig: Send + Sync {
    /// 解析プールのワーカー数を取得
    fn analysis_workers(&self) -> usize;

    /// シャットダウン時の待機上限を取得
    fn shutdown_timeout(&self) -> Duration;

    /// 展開時のコピーバッファサイズを取得
    fn copy_buffer_size(&self) -> usize;

    /// アーカイブ後にソースファイルを削除するかどうか
    fn delete_sources_after_archive(&self) -> bool;
}

// PipelineConfig for Box<dyn PipelineConfig>
impl PipelineConfig for Box<dyn PipelineConfig> {
    fn analysis_workers(&self) -> usize {
        self.as_ref().analysis_workers()
    }

    fn shutdown_timeout(&self) -> Duration {
        self.as_ref().shutdown_timeout()
    }

    fn copy_buffer_size(&self) -> usize {
        self.as_ref().copy_buffer_size()
    }

    fn delete_sources_after_archive(&self) -> bool {
        self.as_ref().delete_sources_after_archive()
    }
}

/// 進捗報告の抽象化トレイト
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 処理開始時の報告
    async fn report_started(&self, total_files: usize);

    /// 段階遷移の報告
    async fn report_stage(&self, stage: PipelineStage);

    /// 進捗更新の報告
    async fn report_progress(&self, completed: usize, total: usize);

    /// エラー発生時の報告
    async fn report_error(&self, path: &Path, error: &str);

    /// 処理完了時の報告
    async fn report_completed(&self, total_processed: usize, total_errors: usize);
}

// ProgressReporter for Box<dyn ProgressReporter>
#[async_trait]
impl ProgressReporter for Box<dyn ProgressReporter> {
    async fn report_started(&self, total_files: usize) {
        self.as_ref().report_started(total_files).await
    }

    async fn report_stage(&self, stage: PipelineStage) {
        self.as_ref().report_stage(stage).await
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        self.as_ref().report_progress(completed, total).await
    }

    async fn report_error(&self, path: &Path, error: &str) {
        self.as_ref().report_error(path, error).await
    }

    async fn report_completed(&self, total_processed: usize, total_errors: usize) {
        self.as_ref().report_completed(total_processed, total_errors).await
    }
}

/// 1ファイルの統計を計算する機能
///
/// ワーカースレッド上で同期的に呼ばれる。`worker_name` は実行中のワーカー名。
#[automock]
pub trait FileAnalyzer: Send + Sync {
    fn analyze(&self, path: &Path, worker_name: &str) -> ProcessingResult<FileStats>;
}

/// 個別結果を集計する機能
#[automock]
pub trait ResultAggregator: Send + Sync {
    /// 入力順を保ったまま集計し、終了時刻を記録する
    fn aggregate(&self, stats: Vec<FileStats>, analysis_start: DateTime<Local>) -> AnalysisResult;
}

/// アーカイブの作成・検証・展開・削除を行う機能
#[automock]
pub trait Archiver: Send + Sync {
    /// 対象ファイルを名前順で列挙
    fn find_eligible_files(&self, dir: &Path) -> ProcessingResult<Vec<PathBuf>>;

    /// 入力ディレクトリの対象ファイルからアーカイブを作成
    fn create_archive(
        &self,
        input_dir: &Path,
        output_path: &Path,
        worker_name: &str,
    ) -> ProcessingResult<ArchiveInfo>;

    /// ZIP形式として読めるかどうか
    fn validate(&self, path: &Path) -> bool;

    /// アーカイブを展開
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ProcessingResult<ExtractionReport>;

    /// ソースファイルを削除（失敗は記録のみ）
    fn delete_sources(&self, paths: &[PathBuf]) -> DeletionReport;
}
