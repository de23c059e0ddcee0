// file_analyzer - テキストファイルの並列解析とZIPアーカイブ
// 解析・集計・アーカイブを独立したワーカープールで実行する

pub mod cli;
pub mod core;
pub mod engine;
pub mod services;
pub mod storage;

pub use crate::core::{
    AnalysisResult, ArchiveInfo, ErrorKind, ExtractionReport, FileStats, PipelineError,
    PipelineReport, PipelineStage, ProcessingResult, StatusCategory,
};
pub use crate::engine::{PipelineOrchestrator, StandardOrchestrator, WorkerPoolSet};
pub use crate::services::{AnalyzerSettings, DefaultPipelineConfig};
