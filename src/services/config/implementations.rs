// 設定管理の具象実装

use crate::core::PipelineConfig;
use std::time::Duration;

/// 解析プールの既定ワーカー数
pub const DEFAULT_ANALYSIS_WORKERS: usize = 10;
/// シャットダウン時の既定待機上限
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
/// 展開時の既定コピーバッファサイズ
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 4096;

/// デフォルト設定実装
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultPipelineConfig {
    analysis_workers: usize,
    shutdown_timeout: Duration,
    copy_buffer_size: usize,
    delete_sources: bool,
}

impl DefaultPipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analysis_workers(mut self, analysis_workers: usize) -> Self {
        self.analysis_workers = analysis_workers;
        self
    }

    pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    pub fn with_copy_buffer_size(mut self, copy_buffer_size: usize) -> Self {
        self.copy_buffer_size = copy_buffer_size;
        self
    }

    pub fn with_delete_sources(mut self, delete_sources: bool) -> Self {
        self.delete_sources = delete_sources;
        self
    }
}

impl Default for DefaultPipelineConfig {
    fn default() -> Self {
        Self {
            analysis_workers: DEFAULT_ANALYSIS_WORKERS,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            delete_sources: true,
        }
    }
}

impl PipelineConfig for DefaultPipelineConfig {
    fn analysis_workers(&self) -> usize {
        self.analysis_workers
    }

    fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    fn copy_buffer_size(&self) -> usize {
        self.copy_buffer_size
    }

    fn delete_sources_after_archive(&self) -> bool {
        self.delete_sources
    }
}
