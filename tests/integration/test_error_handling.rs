// エラーハンドリングの統合テスト
use crate::fixtures::{test_config, test_pools, write_text_files};
use file_analyzer::services::NoOpProgressReporter;
use file_analyzer::{ErrorKind, PipelineOrchestrator, StatusCategory};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_directory_without_txt_files_is_no_content() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    fs::create_dir_all(input.join("nested")).unwrap();
    fs::write(input.join("readme.md"), "# title").unwrap();
    fs::write(input.join("data.csv"), "a,b").unwrap();
    fs::write(input.join("nested").join("deep.txt"), "not scanned").unwrap();

    let pools = test_pools(2);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(2),
        NoOpProgressReporter::new(),
    );
    let err = orchestrator
        .analyze_directory(&input, &temp.path().join("output"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NoContent);
    assert_eq!(err.status(), StatusCategory::NoContent);
    // 何も投入されていない
    let snapshot = pools.snapshot();
    assert_eq!(snapshot.analysis.submitted, 0);
    assert_eq!(snapshot.archive.submitted, 0);
    assert!(!temp.path().join("output").exists());
    pools.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missing_input_directory_is_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    let pools = test_pools(2);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(2),
        NoOpProgressReporter::new(),
    );

    let err = orchestrator
        .analyze_directory(&missing, &temp.path().join("output"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    assert_eq!(err.status(), StatusCategory::NotFound);

    let err = orchestrator
        .run_pipeline(vec![missing.join("a.txt")], &missing, &temp.path().join("x.zip"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    pools.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_file_input_directory_is_access_error() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("plain.txt");
    fs::write(&not_a_dir, "x").unwrap();

    let pools = test_pools(1);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(1),
        NoOpProgressReporter::new(),
    );
    let err = orchestrator
        .analyze_directory(&not_a_dir, temp.path())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryAccess);
    assert_eq!(err.status(), StatusCategory::ServerFault);
    pools.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_one_bad_file_fails_the_whole_run() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    let mut files = write_text_files(&input, &[("a.txt", 2, 10), ("b.txt", 3, 12)]);
    files.insert(1, input.join("gone.txt"));
    let archive_path = temp.path().join("out.zip");

    let pools = test_pools(2);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(2),
        NoOpProgressReporter::new(),
    );
    let err = orchestrator
        .run_pipeline(files, &input, &archive_path)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ThreadExecution);
    assert_eq!(err.root_kind(), ErrorKind::FileNotFound);
    assert_eq!(err.status(), StatusCategory::ServerFault);

    // 集計とアーカイブには進まない
    assert!(!archive_path.exists());
    assert!(input.join("a.txt").exists());
    assert_eq!(pools.snapshot().archive.submitted, 0);
    pools.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_utf8_is_processing_error() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("binary.txt"), [0xFF, 0xFE, 0x00, 0xC3]).unwrap();

    let pools = test_pools(1);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(1),
        NoOpProgressReporter::new(),
    );
    let err = orchestrator
        .analyze_directory(&input, &temp.path().join("output"))
        .await
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::FileProcessing);
    pools.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_submission_after_shutdown_is_rejected() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    let files = write_text_files(&input, &[("a.txt", 1, 2)]);

    let pools = test_pools(1);
    pools.shutdown().await.unwrap();

    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(1),
        NoOpProgressReporter::new(),
    );
    let err = orchestrator
        .run_pipeline(files, &input, &temp.path().join("out.zip"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ThreadExecution);
    assert!(!pools.snapshot().analysis.accepting);
}
