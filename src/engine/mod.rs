// エンジン層 - ワーカープールとオーケストレーション
// サービス層を組み合わせて高レベルな処理を提供

pub mod consumer;
pub mod orchestrator;
pub mod pool;

// 公開API - 主要エンジンクラス
pub use orchestrator::{archive_file_name, PipelineOrchestrator, StandardOrchestrator};
pub use pool::{PoolKind, PoolSetSnapshot, PoolStatus, TaskHandle, WorkerPool, WorkerPoolSet};
