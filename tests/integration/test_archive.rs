// アーカイブの検証・展開の統合テスト
use crate::fixtures::{test_config, test_pools, write_zip};
use file_analyzer::core::Archiver;
use file_analyzer::services::{ArchiveBuilder, NoOpProgressReporter};
use file_analyzer::{ErrorKind, PipelineOrchestrator, StatusCategory};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_bad_magic_is_invalid() {
    let temp = TempDir::new().unwrap();
    let builder = ArchiveBuilder::new();

    let text = temp.path().join("text.zip");
    fs::write(&text, "this is plainly not a zip file").unwrap();
    assert!(!builder.validate(&text));
    assert!(!builder.validate(&text));

    let short = temp.path().join("short.zip");
    fs::write(&short, [0x50, 0x4B, 0x03]).unwrap();
    assert!(!builder.validate(&short));

    // シグネチャだけ正しく中身が壊れている
    let truncated = temp.path().join("truncated.zip");
    fs::write(&truncated, [0x50, 0x4B, 0x03, 0x04, 0x00, 0x00]).unwrap();
    assert!(!builder.validate(&truncated));

    let err = builder.extract(&text, &temp.path().join("dest")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArchive);
    assert_eq!(err.status(), StatusCategory::BadInput);
    assert!(!temp.path().join("dest").exists());
}

#[test]
fn test_missing_archive_is_not_found() {
    let temp = TempDir::new().unwrap();
    let builder = ArchiveBuilder::new();
    let missing = temp.path().join("missing.zip");

    assert!(!builder.validate(&missing));
    let err = builder.extract(&missing, temp.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[tokio::test]
async fn test_traversal_entry_never_escapes_destination() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let dest = root.join("dest");
    fs::create_dir_all(&root).unwrap();

    let archive_path = temp.path().join("evil.zip");
    write_zip(
        &archive_path,
        &[
            ("good.txt", "fine"),
            ("../escape.txt", "outside"),
            ("nested/../../also_escape.txt", "outside"),
        ],
    );

    let pools = test_pools(1);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(1),
        NoOpProgressReporter::new(),
    );
    assert!(orchestrator.validate_archive(&archive_path));

    let report = orchestrator
        .extract_archive(&archive_path, &dest)
        .await
        .unwrap();
    pools.shutdown().await.unwrap();

    assert_eq!(report.files_extracted, 1);
    assert_eq!(report.entries_skipped.len(), 2);
    assert_eq!(fs::read(dest.join("good.txt")).unwrap(), b"fine");
    assert!(!root.join("escape.txt").exists());
    assert!(!root.join("also_escape.txt").exists());
    assert!(!temp.path().join("escape.txt").exists());
}

#[tokio::test]
async fn test_extract_runs_on_archive_worker() {
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("ok.zip");
    write_zip(&archive_path, &[("a.txt", "abc"), ("b.txt", "")]);

    let pools = test_pools(1);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(1),
        NoOpProgressReporter::new(),
    );
    let report = orchestrator
        .extract_archive(&archive_path, &temp.path().join("out"))
        .await
        .unwrap();
    assert_eq!(report.files_extracted, 2);
    assert_eq!(report.bytes_written, 3);

    let snapshot = pools.snapshot();
    assert_eq!(snapshot.archive.completed, 1);
    assert_eq!(snapshot.analysis.submitted, 0);
    pools.shutdown().await.unwrap();
}

#[test]
fn test_empty_directory_creates_no_archive() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out").join("empty.zip");

    let info = ArchiveBuilder::new()
        .create_archive(temp.path(), &output, "archive-0")
        .unwrap();
    assert_eq!(info.archived_file_count(), 0);
    assert!(info.archived_file_names().is_empty());
    assert!(!output.exists());
}
