// サービス層 - 機能別のビジネスロジック
// 各サービスは特定の責任を持ち、疎結合で設計されている

pub mod archive;
pub mod config;
pub mod monitoring;
pub mod processing;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use archive::ArchiveBuilder;
pub use config::{AnalyzerSettings, DefaultPipelineConfig};
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter};
pub use processing::{StatsAggregator, TextFileAnalyzer};
