// Aggregator - 個別結果の集計

use crate::core::{AnalysisResult, FileStats, ResultAggregator};
use chrono::{DateTime, Local};
use tracing::info;

/// 完了済みの結果のみを合算する集計器
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsAggregator;

impl StatsAggregator {
    pub fn new() -> Self {
        Self
    }
}

impl ResultAggregator for StatsAggregator {
    fn aggregate(&self, stats: Vec<FileStats>, analysis_start: DateTime<Local>) -> AnalysisResult {
        let mut total_line_count = 0u64;
        let mut total_character_count = 0u64;
        let mut total_processing_time_nanos = 0u64;
        let mut successful_file_count = 0usize;

        for entry in stats.iter().filter(|entry| entry.is_completed()) {
            total_line_count += entry.line_count();
            total_character_count += entry.character_count();
            total_processing_time_nanos =
                total_processing_time_nanos.saturating_add(entry.processing_time_nanos());
            successful_file_count += 1;
        }

        let total_processed_files = stats.len();
        let result = AnalysisResult {
            file_stats: stats,
            total_line_count,
            total_character_count,
            total_processed_files,
            successful_file_count,
            failed_file_count: total_processed_files - successful_file_count,
            total_processing_time_nanos,
            analysis_start_time: analysis_start,
            analysis_end_time: Local::now(),
        };

        info!(
            "Aggregated {} files: {} lines, {} characters ({} failed)",
            result.total_processed_files,
            result.total_line_count,
            result.total_character_count,
            result.failed_file_count
        );
        result
    }
}
