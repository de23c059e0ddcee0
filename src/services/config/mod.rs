// 設定管理機能
// パイプライン設定（ワーカー数・待機時間等）とディレクトリ設定ファイル

pub mod implementations;
pub mod settings;

// 公開API
pub use implementations::{
    DefaultPipelineConfig, DEFAULT_ANALYSIS_WORKERS, DEFAULT_COPY_BUFFER_SIZE,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use settings::{AnalyzerSettings, PipelineSettings};
