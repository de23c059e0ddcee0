// テスト用の入力データ生成

use file_analyzer::{DefaultPipelineConfig, WorkerPoolSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// 指定の行数・文字数になるテキストを生成する
///
/// 各行は `\n` で終わり、改行も1文字として数える。
pub fn text_content(lines: usize, chars: usize) -> String {
    assert!(chars >= lines, "each line needs at least its newline");
    if lines == 0 {
        return String::new();
    }

    let body = chars - lines;
    let per_line = body / lines;
    let extra = body % lines;
    (0..lines)
        .map(|index| {
            let width = per_line + usize::from(index < extra);
            format!("{}\n", "a".repeat(width))
        })
        .collect()
}

/// (ファイル名, 行数, 文字数) の一覧からファイルを作成する
pub fn write_text_files(dir: &Path, entries: &[(&str, usize, usize)]) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    entries
        .iter()
        .map(|(name, lines, chars)| {
            let path = dir.join(name);
            fs::write(&path, text_content(*lines, *chars)).unwrap();
            path
        })
        .collect()
}

/// 任意のエントリ名を持つZIPを作成する（展開先の外を指す名前も可）
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// テスト用の小さなプール
pub fn test_pools(analysis_workers: usize) -> Arc<WorkerPoolSet> {
    Arc::new(WorkerPoolSet::new(&test_config(analysis_workers)))
}

pub fn test_config(analysis_workers: usize) -> DefaultPipelineConfig {
    DefaultPipelineConfig::new()
        .with_analysis_workers(analysis_workers)
        .with_shutdown_timeout(Duration::from_secs(5))
}

#[test]
fn test_text_content_shape() {
    let content = text_content(5, 120);
    assert_eq!(content.lines().count(), 5);
    assert_eq!(content.chars().count(), 120);
    assert_eq!(text_content(0, 0), "");
}
