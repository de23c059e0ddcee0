// ZIPの検証と展開

use super::extraction_failure;
use crate::core::{ExtractionReport, ProcessingResult};
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

/// ローカルファイルヘッダのシグネチャ
pub const ZIP_LOCAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// 先頭4バイトがZIPシグネチャかどうか
pub fn has_zip_signature(header: &[u8]) -> bool {
    header.len() >= ZIP_LOCAL_HEADER_SIGNATURE.len()
        && header[..ZIP_LOCAL_HEADER_SIGNATURE.len()] == ZIP_LOCAL_HEADER_SIGNATURE
}

/// シグネチャと最初のエントリが読めるかを確認する
pub(crate) fn inspect_archive(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() < ZIP_LOCAL_HEADER_SIGNATURE.len() as u64 {
        debug!("{} is too short to be a zip archive", path.display());
        return Ok(false);
    }

    let mut header = [0u8; 4];
    file.read_exact(&mut header)?;
    if !has_zip_signature(&header) {
        debug!("{} does not start with a zip signature", path.display());
        return Ok(false);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut archive = match ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(error) => {
            debug!("{} has no readable central directory: {error}", path.display());
            return Ok(false);
        }
    };
    if archive.len() == 0 {
        return Ok(false);
    }
    let readable = archive.by_index(0).is_ok();
    Ok(readable)
}

/// エントリ名を展開先からの相対パスに変換する
///
/// 絶対パスや `..` を含む名前は展開先の外を指すため `None` を返す。
pub fn safe_entry_path(entry_name: &str) -> Option<PathBuf> {
    let normalized = entry_name.replace('\\', "/");
    if normalized.starts_with('/') {
        return None;
    }

    let mut relative = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// 固定サイズのバッファでコピーし、書き込んだバイト数を返す
pub fn copy_buffered<R, W>(reader: &mut R, writer: &mut W, buffer: &mut [u8]) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut total = 0u64;
    loop {
        let read = match reader.read(buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
    writer.flush()?;
    Ok(total)
}

/// 全エントリを展開先へ書き出す
pub(crate) fn extract_entries(
    archive_path: &Path,
    dest_dir: &Path,
    buffer_size: usize,
) -> ProcessingResult<ExtractionReport> {
    let file = File::open(archive_path)
        .map_err(|error| extraction_failure(archive_path, "cannot open archive", error))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|error| extraction_failure(archive_path, "cannot read archive", error))?;

    let mut report = ExtractionReport::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|error| {
            extraction_failure(archive_path, format!("cannot read entry #{index}"), error)
        })?;
        let entry_name = entry.name().to_string();

        let Some(relative) = safe_entry_path(&entry_name) else {
            warn!("Skipping entry outside destination: {entry_name}");
            report.skip_entry(entry_name);
            continue;
        };
        let target = dest_dir.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|error| {
                extraction_failure(archive_path, format!("cannot create {}", target.display()), error)
            })?;
            report.directories_created += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                extraction_failure(archive_path, format!("cannot create {}", parent.display()), error)
            })?;
        }

        let mut output = File::create(&target).map_err(|error| {
            extraction_failure(archive_path, format!("cannot write {}", target.display()), error)
        })?;
        let written = copy_buffered(&mut entry, &mut output, &mut buffer).map_err(|error| {
            extraction_failure(archive_path, format!("failed to extract {entry_name}"), error)
        })?;

        debug!(entry = %entry_name, bytes = written, "extracted entry");
        report.files_extracted += 1;
        report.bytes_written += written;
    }

    Ok(report)
}
