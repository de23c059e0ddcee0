// テストユーティリティ
// 統合テストで共有するファイル生成ヘルパー

pub mod test_data;

// 公開API
pub use test_data::*;
