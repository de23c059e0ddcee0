// Analyzer - 単一テキストファイルの統計計測

use crate::core::{FileAnalyzer, FileStats, PipelineError, ProcessingResult};
use crate::storage::has_eligible_extension;
use chrono::Local;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// 行数と文字数を数える解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFileAnalyzer;

impl TextFileAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl FileAnalyzer for TextFileAnalyzer {
    fn analyze(&self, path: &Path, worker_name: &str) -> ProcessingResult<FileStats> {
        if !path.exists() {
            return Err(PipelineError::file_not_found(path.display()));
        }
        if !has_eligible_extension(path) {
            return Err(PipelineError::invalid_file_type(path.display()));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let started_at = Local::now();
        let timer = Instant::now();
        debug!(worker = worker_name, file = %file_name, "analyzing file");

        let line_count = count_lines(path).map_err(|error| read_failure(path, error))?;
        let character_count = count_characters(path).map_err(|error| read_failure(path, error))?;

        let elapsed = timer.elapsed();
        debug!(
            worker = worker_name,
            file = %file_name,
            lines = line_count,
            chars = character_count,
            nanos = elapsed.as_nanos() as u64,
            "file analyzed"
        );

        Ok(FileStats::completed(
            file_name,
            worker_name,
            line_count,
            character_count,
            started_at,
            Local::now(),
            elapsed,
        ))
    }
}

fn read_failure(path: &Path, error: io::Error) -> PipelineError {
    PipelineError::file_processing(format!("failed to read {}", path.display()))
        .with_resource(path.display())
        .caused_by(error)
}

/// 行数を数える
///
/// `\n`・`\r\n`・単独の `\r` を行末とみなす。末尾の改行は新しい行を作らない。
pub fn count_lines(path: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = 0u64;
    let mut pending = false;
    let mut last_was_cr = false;

    loop {
        let buffer = reader.fill_buf()?;
        if buffer.is_empty() {
            break;
        }

        for &byte in buffer {
            match byte {
                b'\n' => {
                    if !last_was_cr {
                        lines += 1;
                    }
                    last_was_cr = false;
                    pending = false;
                }
                b'\r' => {
                    lines += 1;
                    last_was_cr = true;
                    pending = false;
                }
                _ => {
                    last_was_cr = false;
                    pending = true;
                }
            }
        }

        let consumed = buffer.len();
        reader.consume(consumed);
    }

    if pending {
        lines += 1;
    }
    Ok(lines)
}

/// 文字数（UTF-16コード単位の数）を数える
///
/// BMP外の文字（絵文字など）はサロゲートペアとして2文字に数える。
/// UTF-8として不正な内容は `InvalidData` エラーになる。
pub fn count_characters(path: &Path) -> io::Result<u64> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.encode_utf16().count() as u64)
}
