// アーカイブ機能
// 対象ファイルのZIP化、ZIP形式の検証・展開、ソースファイルの削除

pub mod extract;

use crate::core::{
    ArchiveInfo, Archiver, DeletionReport, ErrorKind, ExtractionReport, PipelineError,
    ProcessingResult,
};
use crate::services::config::DEFAULT_COPY_BUFFER_SIZE;
use crate::storage::local::LocalFileStore;
use crate::storage::FileStore;
use chrono::Local;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub use extract::{copy_buffered, has_zip_signature, safe_entry_path, ZIP_LOCAL_HEADER_SIGNATURE};

/// ZIPアーカイブの作成・検証・展開を行う実装
#[derive(Debug, Clone)]
pub struct ArchiveBuilder<S = LocalFileStore> {
    store: S,
    buffer_size: usize,
}

impl ArchiveBuilder<LocalFileStore> {
    /// ローカルファイルストアで作成
    pub fn new() -> Self {
        Self::with_store(LocalFileStore::new())
    }
}

impl Default for ArchiveBuilder<LocalFileStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FileStore> ArchiveBuilder<S> {
    /// 任意のファイルストアで作成
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }

    /// 展開時のコピーバッファサイズを指定
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn entry_options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }

    /// エントリ群をZIPとして書き出す
    fn write_entries(
        &self,
        files: &[PathBuf],
        output_path: &Path,
        info: &mut ArchiveInfo,
    ) -> ProcessingResult<()> {
        let output = File::create(output_path).map_err(|error| {
            creation_failure(format!("cannot open {}", output_path.display()), error)
        })?;
        let mut writer = ZipWriter::new(output);

        for path in files {
            let entry_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            writer
                .start_file(entry_name.as_str(), Self::entry_options())
                .map_err(|error| {
                    creation_failure(format!("cannot start entry {entry_name}"), error)
                })?;

            let mut source = File::open(path).map_err(|error| {
                creation_failure(format!("cannot open source {}", path.display()), error)
            })?;
            let copied = io::copy(&mut source, &mut writer).map_err(|error| {
                creation_failure(format!("failed to copy {}", path.display()), error)
            })?;

            debug!(entry = %entry_name, bytes = copied, "archived entry");
            info.push_entry(entry_name);
        }

        writer.finish().map_err(|error| {
            creation_failure(format!("cannot finalize {}", output_path.display()), error)
        })?;
        Ok(())
    }
}

impl<S: FileStore> Archiver for ArchiveBuilder<S> {
    fn find_eligible_files(&self, dir: &Path) -> ProcessingResult<Vec<PathBuf>> {
        if !dir.exists() {
            return Err(PipelineError::directory_not_found(dir.display()));
        }
        if !dir.is_dir() {
            return Err(PipelineError::directory_access(
                dir.display(),
                "path is not a directory",
            ));
        }

        self.store.list_eligible(dir).map_err(|error| {
            PipelineError::directory_access(dir.display(), "listing failed").caused_by(error)
        })
    }

    fn create_archive(
        &self,
        input_dir: &Path,
        output_path: &Path,
        worker_name: &str,
    ) -> ProcessingResult<ArchiveInfo> {
        let started_at = Local::now();
        let timer = Instant::now();
        let files = self.find_eligible_files(input_dir)?;
        let mut info = ArchiveInfo::begin(output_path, worker_name, started_at);

        if files.is_empty() {
            warn!(
                "No .txt files found in {}, archive not written",
                input_dir.display()
            );
            info.finish(0, Local::now(), timer.elapsed());
            return Ok(info);
        }

        if let Some(parent) = output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            self.store.ensure_dir(parent).map_err(|error| {
                PipelineError::directory_access(parent.display(), "cannot create output directory")
                    .caused_by(error)
            })?;
        }

        info!(
            worker = worker_name,
            "Creating archive {} from {} files",
            output_path.display(),
            files.len()
        );
        self.write_entries(&files, output_path, &mut info)?;

        let size = std::fs::metadata(output_path)
            .map_err(|error| {
                creation_failure(
                    format!("archive missing after write: {}", output_path.display()),
                    error,
                )
            })?
            .len();
        info.finish(size, Local::now(), timer.elapsed());

        info!(
            worker = worker_name,
            "Archive created: {} ({} files, {:.2} KB, {:.3} ms)",
            info.archive_file_name(),
            info.archived_file_count(),
            info.archive_file_size_kb(),
            info.archive_processing_time_ms()
        );
        Ok(info)
    }

    fn validate(&self, path: &Path) -> bool {
        match extract::inspect_archive(path) {
            Ok(valid) => valid,
            Err(error) => {
                warn!("Failed to validate archive {}: {error}", path.display());
                false
            }
        }
    }

    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ProcessingResult<ExtractionReport> {
        if !archive_path.exists() {
            return Err(PipelineError::file_not_found(archive_path.display()));
        }
        if !self.validate(archive_path) {
            return Err(PipelineError::invalid_archive(archive_path.display()));
        }

        self.store.ensure_dir(dest_dir).map_err(|error| {
            PipelineError::directory_access(dest_dir.display(), "cannot create destination")
                .caused_by(error)
        })?;

        let timer = Instant::now();
        let mut report = extract::extract_entries(archive_path, dest_dir, self.buffer_size)?;
        report.duration_nanos = u64::try_from(timer.elapsed().as_nanos()).unwrap_or(u64::MAX);

        info!(
            "Extracted {} files ({} bytes) from {} into {}",
            report.files_extracted,
            report.bytes_written,
            archive_path.display(),
            dest_dir.display()
        );
        if report.has_skipped_entries() {
            warn!(
                "Skipped {} entries pointing outside {}",
                report.entries_skipped.len(),
                dest_dir.display()
            );
        }
        Ok(report)
    }

    fn delete_sources(&self, paths: &[PathBuf]) -> DeletionReport {
        let mut report = DeletionReport::default();

        for path in paths {
            match self.store.remove_file(path) {
                Ok(()) => {
                    debug!("Deleted source file {}", path.display());
                    report.deleted.push(path.clone());
                }
                Err(error) => {
                    warn!("Failed to delete source file {}: {error:#}", path.display());
                    report.failed.push((path.clone(), format!("{error:#}")));
                }
            }
        }

        info!(
            "Deleted {} source files ({} failures)",
            report.deleted_count(),
            report.failed_count()
        );
        report
    }
}

fn creation_failure(message: String, error: impl Into<anyhow::Error>) -> PipelineError {
    PipelineError::new(ErrorKind::ArchiveCreation, message).caused_by(error)
}

pub(crate) fn extraction_failure(
    archive_path: &Path,
    message: impl fmt::Display,
    error: impl Into<anyhow::Error>,
) -> PipelineError {
    PipelineError::new(
        ErrorKind::ArchiveExtraction,
        format!("{message} ({})", archive_path.display()),
    )
    .with_resource(archive_path.display())
    .caused_by(error)
}
