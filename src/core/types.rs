// パイプラインで受け渡すデータ型定義

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 1ファイル分の解析結果
///
/// 完了済みの値は生成後に変更されない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    file_name: String,
    line_count: u64,
    character_count: u64,
    processing_time_nanos: u64,
    worker_name: String,
    processing_start_time: DateTime<Local>,
    processing_end_time: Option<DateTime<Local>>,
    processing_completed: bool,
}

impl FileStats {
    /// 完了済みの解析結果を作成
    pub fn completed(
        file_name: impl Into<String>,
        worker_name: impl Into<String>,
        line_count: u64,
        character_count: u64,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        elapsed: Duration,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            line_count,
            character_count,
            processing_time_nanos: u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
            worker_name: worker_name.into(),
            processing_start_time: started_at,
            processing_end_time: Some(finished_at),
            processing_completed: true,
        }
    }

    /// 完了しなかった解析結果を作成（集計では失敗として数えられる）
    pub fn incomplete(
        file_name: impl Into<String>,
        worker_name: impl Into<String>,
        started_at: DateTime<Local>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            line_count: 0,
            character_count: 0,
            processing_time_nanos: 0,
            worker_name: worker_name.into(),
            processing_start_time: started_at,
            processing_end_time: None,
            processing_completed: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn character_count(&self) -> u64 {
        self.character_count
    }

    pub fn processing_time_nanos(&self) -> u64 {
        self.processing_time_nanos
    }

    /// 処理時間（ミリ秒）
    pub fn processing_time_ms(&self) -> f64 {
        self.processing_time_nanos as f64 / 1_000_000.0
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    pub fn processing_start_time(&self) -> DateTime<Local> {
        self.processing_start_time
    }

    pub fn processing_end_time(&self) -> Option<DateTime<Local>> {
        self.processing_end_time
    }

    pub fn is_completed(&self) -> bool {
        self.processing_completed
    }
}

/// バッチ全体の集計結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub(crate) file_stats: Vec<FileStats>,
    pub(crate) total_line_count: u64,
    pub(crate) total_character_count: u64,
    pub(crate) total_processed_files: usize,
    pub(crate) successful_file_count: usize,
    pub(crate) failed_file_count: usize,
    pub(crate) total_processing_time_nanos: u64,
    pub(crate) analysis_start_time: DateTime<Local>,
    pub(crate) analysis_end_time: DateTime<Local>,
}

impl AnalysisResult {
    /// 入力順の個別結果
    pub fn file_stats(&self) -> &[FileStats] {
        &self.file_stats
    }

    pub fn total_line_count(&self) -> u64 {
        self.total_line_count
    }

    pub fn total_character_count(&self) -> u64 {
        self.total_character_count
    }

    pub fn total_processed_files(&self) -> usize {
        self.total_processed_files
    }

    pub fn successful_file_count(&self) -> usize {
        self.successful_file_count
    }

    pub fn failed_file_count(&self) -> usize {
        self.failed_file_count
    }

    pub fn total_processing_time_nanos(&self) -> u64 {
        self.total_processing_time_nanos
    }

    /// 合計処理時間（ミリ秒）
    pub fn total_processing_time_ms(&self) -> f64 {
        self.total_processing_time_nanos as f64 / 1_000_000.0
    }

    /// 合計処理時間（秒）
    pub fn total_processing_time_secs(&self) -> f64 {
        self.total_processing_time_nanos as f64 / 1_000_000_000.0
    }

    pub fn analysis_start_time(&self) -> DateTime<Local> {
        self.analysis_start_time
    }

    pub fn analysis_end_time(&self) -> DateTime<Local> {
        self.analysis_end_time
    }
}

/// 作成したアーカイブの情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    archive_file_name: String,
    archive_file_path: PathBuf,
    archived_file_names: Vec<String>,
    archived_file_count: usize,
    archive_file_size_bytes: u64,
    compression_method: String,
    archive_start_time: DateTime<Local>,
    archive_end_time: Option<DateTime<Local>>,
    archive_processing_time_nanos: u64,
    worker_name: String,
}

impl ArchiveInfo {
    /// 圧縮方式タグ
    pub const COMPRESSION_METHOD: &'static str = "ZIP";

    /// エントリ未登録の状態で作成
    pub fn begin(
        archive_file_path: impl Into<PathBuf>,
        worker_name: impl Into<String>,
        started_at: DateTime<Local>,
    ) -> Self {
        let archive_file_path = archive_file_path.into();
        let archive_file_name = archive_file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            archive_file_name,
            archive_file_path,
            archived_file_names: Vec::new(),
            archived_file_count: 0,
            archive_file_size_bytes: 0,
            compression_method: Self::COMPRESSION_METHOD.to_string(),
            archive_start_time: started_at,
            archive_end_time: None,
            archive_processing_time_nanos: 0,
            worker_name: worker_name.into(),
        }
    }

    /// 書き込んだエントリを記録
    pub(crate) fn push_entry(&mut self, entry_name: impl Into<String>) {
        self.archived_file_names.push(entry_name.into());
        self.archived_file_count = self.archived_file_names.len();
    }

    /// 完了時刻・サイズ・所要時間を記録
    pub(crate) fn finish(&mut self, size_bytes: u64, finished_at: DateTime<Local>, elapsed: Duration) {
        self.archive_file_size_bytes = size_bytes;
        self.archive_end_time = Some(finished_at);
        self.archive_processing_time_nanos =
            u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
    }

    pub fn archive_file_name(&self) -> &str {
        &self.archive_file_name
    }

    pub fn archive_file_path(&self) -> &PathBuf {
        &self.archive_file_path
    }

    pub fn archived_file_names(&self) -> &[String] {
        &self.archived_file_names
    }

    pub fn archived_file_count(&self) -> usize {
        self.archived_file_count
    }

    pub fn archive_file_size_bytes(&self) -> u64 {
        self.archive_file_size_bytes
    }

    pub fn archive_file_size_kb(&self) -> f64 {
        self.archive_file_size_bytes as f64 / 1024.0
    }

    pub fn archive_file_size_mb(&self) -> f64 {
        self.archive_file_size_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn compression_method(&self) -> &str {
        &self.compression_method
    }

    pub fn archive_start_time(&self) -> DateTime<Local> {
        self.archive_start_time
    }

    pub fn archive_end_time(&self) -> Option<DateTime<Local>> {
        self.archive_end_time
    }

    pub fn archive_processing_time_nanos(&self) -> u64 {
        self.archive_processing_time_nanos
    }

    pub fn archive_processing_time_ms(&self) -> f64 {
        self.archive_processing_time_nanos as f64 / 1_000_000.0
    }

    pub fn archive_processing_time_secs(&self) -> f64 {
        self.archive_processing_time_nanos as f64 / 1_000_000_000.0
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }
}

/// 1回のパイプライン実行の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub analysis: AnalysisResult,
    pub archive: ArchiveInfo,
    /// ソース削除の結果（削除しなかった場合は `None`）
    #[serde(default)]
    pub deletion: Option<DeletionReport>,
}

/// アーカイブ展開の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// 展開したファイル数
    pub files_extracted: usize,
    /// 作成したディレクトリ数
    pub directories_created: usize,
    /// 書き込んだ総バイト数
    pub bytes_written: u64,
    /// 展開先の外を指していたため書き込まなかったエントリ名
    pub entries_skipped: Vec<String>,
    pub duration_nanos: u64,
}

impl ExtractionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// スキップしたエントリを記録
    pub fn skip_entry(&mut self, entry_name: impl Into<String>) {
        self.entries_skipped.push(entry_name.into());
    }

    /// 処理したエントリの総数
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created + self.entries_skipped.len()
    }

    pub fn has_skipped_entries(&self) -> bool {
        !self.entries_skipped.is_empty()
    }
}

/// ソースファイル削除の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub deleted: Vec<PathBuf>,
    /// 削除に失敗したパスとその理由
    pub failed: Vec<(PathBuf, String)>,
}

impl DeletionReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// オーケストレーターの進行段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Start,
    AnalysisSubmitted,
    AnalysisComplete,
    /// 集計とアーカイブの両方を投入済み
    FinalizationSubmitted,
    AggregationComplete,
    ArchiveComplete,
    Done,
}

impl PipelineStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::AnalysisSubmitted => "analysis_submitted",
            Self::AnalysisComplete => "analysis_complete",
            Self::FinalizationSubmitted => "finalization_submitted",
            Self::AggregationComplete => "aggregation_complete",
            Self::ArchiveComplete => "archive_complete",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
