// テキスト解析機能
// 単一ファイルの行数・文字数の計測と、個別結果の集計

pub mod aggregator;
pub mod analyzer;

// 公開API
pub use aggregator::StatsAggregator;
pub use analyzer::{count_characters, count_lines, TextFileAnalyzer};
