// PipelineOrchestrator - 解析・集計・アーカイブの実行順序を管理する
// 依存関係は全てコンストラクタで注入され、プールはArcで共有される

use super::pool::{TaskHandle, WorkerPoolSet};
use crate::core::{
    AnalysisResult, ArchiveInfo, Archiver, DeletionReport, ExtractionReport, FileAnalyzer,
    FileStats, PipelineConfig, PipelineError, PipelineReport, PipelineStage, ProcessingResult,
    ProgressReporter, ResultAggregator,
};
use crate::services::{ArchiveBuilder, ConsoleProgressReporter, StatsAggregator, TextFileAnalyzer};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// 出力アーカイブ名を生成（analysis_YYYYMMDD_HHMMSS.zip）
pub fn archive_file_name(at: DateTime<Local>) -> String {
    format!("analysis_{}.zip", at.format("%Y%m%d_%H%M%S"))
}

/// パイプライン全体を協調させるオーケストレータ
///
/// 解析タスクを全て投入してから投入順に待機し、その後に集計と
/// アーカイブ作成を並行して実行する。
pub struct PipelineOrchestrator<A, G, R, P> {
    pools: Arc<WorkerPoolSet>,
    analyzer: Arc<A>,
    aggregator: Arc<G>,
    archiver: Arc<R>,
    reporter: P,
    delete_sources: bool,
}

/// 標準実装で構成したオーケストレータ
pub type StandardOrchestrator<P = ConsoleProgressReporter> =
    PipelineOrchestrator<TextFileAnalyzer, StatsAggregator, ArchiveBuilder, P>;

impl<P: ProgressReporter> StandardOrchestrator<P> {
    /// 設定から標準実装を組み立てる
    pub fn standard<C: PipelineConfig + ?Sized>(
        pools: Arc<WorkerPoolSet>,
        config: &C,
        reporter: P,
    ) -> Self {
        PipelineOrchestrator::new(
            pools,
            TextFileAnalyzer::new(),
            StatsAggregator::new(),
            ArchiveBuilder::new().with_buffer_size(config.copy_buffer_size()),
            reporter,
        )
        .with_delete_sources(config.delete_sources_after_archive())
    }
}

impl<A, G, R, P> PipelineOrchestrator<A, G, R, P>
where
    A: FileAnalyzer + 'static,
    G: ResultAggregator + 'static,
    R: Archiver + 'static,
    P: ProgressReporter,
{
    /// 新しいオーケストレータを作成（アーカイブ後のソース削除は有効）
    pub fn new(pools: Arc<WorkerPoolSet>, analyzer: A, aggregator: G, archiver: R, reporter: P) -> Self {
        Self {
            pools,
            analyzer: Arc::new(analyzer),
            aggregator: Arc::new(aggregator),
            archiver: Arc::new(archiver),
            reporter,
            delete_sources: true,
        }
    }

    /// アーカイブ後にソースファイルを削除するかを設定
    pub fn with_delete_sources(mut self, delete_sources: bool) -> Self {
        self.delete_sources = delete_sources;
        self
    }

    pub fn pools(&self) -> &Arc<WorkerPoolSet> {
        &self.pools
    }

    pub fn deletes_sources(&self) -> bool {
        self.delete_sources
    }

    /// 指定ファイル群を解析し、入力ディレクトリをアーカイブする
    ///
    /// 失敗した場合はレポーターへ通知したうえでエラーを返す。
    pub async fn run_pipeline(
        &self,
        file_paths: Vec<PathBuf>,
        input_dir: &Path,
        output_archive: &Path,
    ) -> ProcessingResult<PipelineReport> {
        match self.execute(file_paths, input_dir, output_archive).await {
            Ok(report) => Ok(report),
            Err(err) => {
                error!(
                    severity = err.severity().as_str(),
                    recoverable = err.is_recoverable(),
                    "Pipeline failed: {err}"
                );
                self.reporter.report_error(input_dir, &err.to_string()).await;
                Err(err)
            }
        }
    }

    /// ディレクトリ内の対象ファイルを全て解析する
    ///
    /// 出力先は `output_dir/analysis_<日時>.zip`。
    pub async fn analyze_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> ProcessingResult<PipelineReport> {
        let file_paths = self.archiver.find_eligible_files(input_dir)?;
        if file_paths.is_empty() {
            warn!("No .txt files found in {}", input_dir.display());
            return Err(
                PipelineError::no_content("no .txt files to analyze").with_resource(input_dir.display())
            );
        }

        let output_archive = output_dir.join(archive_file_name(Local::now()));
        self.run_pipeline(file_paths, input_dir, &output_archive).await
    }

    /// アーカイブプール上で検証と展開を行う
    ///
    /// 作成・削除と同じワーカーで直列に実行される。
    pub async fn extract_archive(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> ProcessingResult<ExtractionReport> {
        let archiver = Arc::clone(&self.archiver);
        let archive = archive_path.to_path_buf();
        let dest = dest_dir.to_path_buf();

        let handle = self
            .pools
            .submit_archive(format!("extract {}", archive.display()), move |_worker| {
                archiver.extract(&archive, &dest)
            })?;
        handle.wait().await.map_err(PipelineError::into_task_cause)
    }

    pub fn validate_archive(&self, archive_path: &Path) -> bool {
        self.archiver.validate(archive_path)
    }

    async fn execute(
        &self,
        file_paths: Vec<PathBuf>,
        input_dir: &Path,
        output_archive: &Path,
    ) -> ProcessingResult<PipelineReport> {
        let analysis_start = Local::now();
        self.reporter.report_stage(PipelineStage::Start).await;

        if !input_dir.exists() {
            return Err(PipelineError::directory_not_found(input_dir.display()));
        }
        if file_paths.is_empty() {
            return Err(PipelineError::file_processing("no files were given for analysis")
                .with_resource(input_dir.display()));
        }

        let total = file_paths.len();
        info!("Starting analysis of {total} files from {}", input_dir.display());
        self.reporter.report_started(total).await;

        let submit_timer = Instant::now();
        let handles = self.submit_analysis(&file_paths)?;
        let submit_elapsed = submit_timer.elapsed();
        info!(
            "Submitted {total} analysis tasks in {} ms ({} ns)",
            submit_elapsed.as_millis(),
            submit_elapsed.as_nanos()
        );
        self.reporter.report_stage(PipelineStage::AnalysisSubmitted).await;

        let wait_timer = Instant::now();
        let stats = self.wait_for_analysis(handles).await?;
        let wait_elapsed = wait_timer.elapsed();
        info!(
            "All {total} analysis tasks completed in {} ms ({} ns)",
            wait_elapsed.as_millis(),
            wait_elapsed.as_nanos()
        );
        self.reporter.report_stage(PipelineStage::AnalysisComplete).await;

        let aggregation = self.submit_aggregation(stats, analysis_start)?;
        let archive = self.submit_archive(input_dir, output_archive)?;
        self.reporter
            .report_stage(PipelineStage::FinalizationSubmitted)
            .await;

        let analysis = aggregation.wait().await?;
        self.reporter
            .report_stage(PipelineStage::AggregationComplete)
            .await;

        let (archive, deletion) = archive.wait().await?;
        self.reporter.report_stage(PipelineStage::ArchiveComplete).await;

        self.pools.log_status();
        self.reporter
            .report_completed(analysis.total_processed_files(), analysis.failed_file_count())
            .await;
        self.reporter.report_stage(PipelineStage::Done).await;

        Ok(PipelineReport {
            analysis,
            archive,
            deletion,
        })
    }

    // 待機前に全ハンドルを確保する
    fn submit_analysis(&self, file_paths: &[PathBuf]) -> ProcessingResult<Vec<TaskHandle<FileStats>>> {
        file_paths
            .iter()
            .map(|path| {
                let analyzer = Arc::clone(&self.analyzer);
                let path = path.clone();
                self.pools
                    .submit_analysis(path.display().to_string(), move |worker| {
                        analyzer.analyze(&path, worker)
                    })
            })
            .collect()
    }

    async fn wait_for_analysis(
        &self,
        handles: Vec<TaskHandle<FileStats>>,
    ) -> ProcessingResult<Vec<FileStats>> {
        let total = handles.len();
        let mut stats = Vec::with_capacity(total);

        for (index, handle) in handles.into_iter().enumerate() {
            let file_stats = handle.wait().await?;
            debug!(
                file = file_stats.file_name(),
                worker = file_stats.worker_name(),
                lines = file_stats.line_count(),
                chars = file_stats.character_count(),
                "analysis finished"
            );
            stats.push(file_stats);
            self.reporter.report_progress(index + 1, total).await;
        }

        Ok(stats)
    }

    fn submit_aggregation(
        &self,
        stats: Vec<FileStats>,
        analysis_start: DateTime<Local>,
    ) -> ProcessingResult<TaskHandle<AnalysisResult>> {
        let aggregator = Arc::clone(&self.aggregator);
        self.pools.submit_general("aggregate results", move |_worker| {
            Ok(aggregator.aggregate(stats, analysis_start))
        })
    }

    fn submit_archive(
        &self,
        input_dir: &Path,
        output_archive: &Path,
    ) -> ProcessingResult<TaskHandle<(ArchiveInfo, Option<DeletionReport>)>> {
        let archiver = Arc::clone(&self.archiver);
        let input = input_dir.to_path_buf();
        let output = output_archive.to_path_buf();
        let delete_sources = self.delete_sources;

        self.pools
            .submit_archive(format!("archive {}", output.display()), move |worker| {
                let info = archiver.create_archive(&input, &output, worker)?;
                if !delete_sources || info.archived_file_count() == 0 {
                    return Ok((info, None));
                }

                let sources: Vec<PathBuf> = info
                    .archived_file_names()
                    .iter()
                    .map(|name| input.join(name))
                    .collect();
                let deletion = archiver.delete_sources(&sources);
                if deletion.is_clean() {
                    info!("Deleted {} source files", deletion.deleted_count());
                } else {
                    warn!(
                        "Deleted {} source files, {} could not be deleted",
                        deletion.deleted_count(),
                        deletion.failed_count()
                    );
                }
                Ok((info, Some(deletion)))
            })
    }
}
