// エンドツーエンド統合テスト
use crate::fixtures::{test_config, test_pools, text_content, write_text_files};
use file_analyzer::core::{Archiver, FileAnalyzer, ResultAggregator};
use file_analyzer::services::{
    ArchiveBuilder, NoOpProgressReporter, StatsAggregator, TextFileAnalyzer,
};
use file_analyzer::PipelineOrchestrator;
use chrono::Local;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_three_files_are_counted_and_archived() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    let files = write_text_files(
        &input,
        &[("a.txt", 5, 120), ("b.txt", 10, 340), ("c.txt", 0, 0)],
    );
    let archive_path = temp.path().join("output").join("result.zip");

    let pools = test_pools(10);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(10),
        NoOpProgressReporter::new(),
    );
    let report = orchestrator
        .run_pipeline(files, &input, &archive_path)
        .await
        .unwrap();
    pools.shutdown().await.unwrap();

    let analysis = &report.analysis;
    assert_eq!(analysis.total_line_count(), 15);
    assert_eq!(analysis.total_character_count(), 460);
    assert_eq!(analysis.total_processed_files(), 3);
    assert_eq!(analysis.successful_file_count(), 3);
    assert_eq!(analysis.failed_file_count(), 0);

    // 入力順で並ぶ
    let names: Vec<&str> = analysis.file_stats().iter().map(|s| s.file_name()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    assert!(analysis
        .file_stats()
        .iter()
        .all(|s| s.worker_name().starts_with("analysis-")));

    let archive = &report.archive;
    assert_eq!(archive.archived_file_count(), 3);
    assert_eq!(archive.archived_file_names().len(), 3);
    assert_eq!(archive.compression_method(), "ZIP");
    assert_eq!(archive.worker_name(), "archive-0");
    assert!(archive.archive_file_size_bytes() > 0);
    assert!(archive_path.exists());

    // アーカイブ後はソースが削除される
    let deletion = report.deletion.as_ref().unwrap();
    assert_eq!(deletion.deleted_count(), 3);
    assert!(deletion.is_clean());
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert!(!input.join(name).exists());
    }
}

#[tokio::test]
async fn test_more_files_than_workers_all_complete() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    let entries: Vec<(String, usize, usize)> = (0..11)
        .map(|i| (format!("file_{i:02}.txt"), i + 1, (i + 1) * 8))
        .collect();
    let entry_refs: Vec<(&str, usize, usize)> = entries
        .iter()
        .map(|(name, lines, chars)| (name.as_str(), *lines, *chars))
        .collect();
    let files = write_text_files(&input, &entry_refs);

    let pools = test_pools(10);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(10).with_delete_sources(false),
        NoOpProgressReporter::new(),
    );
    let report = orchestrator
        .run_pipeline(files, &input, &temp.path().join("out.zip"))
        .await
        .unwrap();

    assert_eq!(report.analysis.total_processed_files(), 11);
    assert_eq!(report.analysis.successful_file_count(), 11);
    assert_eq!(report.analysis.total_line_count(), (1..=11).sum::<u64>());
    assert_eq!(report.archive.archived_file_count(), 11);

    let snapshot = pools.snapshot();
    assert_eq!(snapshot.analysis.submitted, 11);
    assert_eq!(snapshot.analysis.completed, 11);
    assert_eq!(snapshot.analysis.workers, Some(10));
    pools.shutdown().await.unwrap();

    // 削除無効なのでソースは残る
    assert!(report.deletion.is_none());
    assert_eq!(fs::read_dir(&input).unwrap().count(), 11);
}

#[tokio::test]
async fn test_archive_round_trip_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    fs::create_dir_all(&input).unwrap();
    let originals = [
        ("plain.txt", "first line\nsecond line\n".to_string()),
        ("unicode.txt", "日本語のテキスト\r\nmixed ✓ content".to_string()),
        ("large.txt", text_content(2000, 90_000)),
    ];
    for (name, content) in &originals {
        fs::write(input.join(name), content).unwrap();
    }

    let builder = ArchiveBuilder::new();
    let archive_path = temp.path().join("round.zip");
    let info = builder
        .create_archive(&input, &archive_path, "archive-0")
        .unwrap();
    assert_eq!(info.archived_file_count(), 3);
    assert!(builder.validate(&archive_path));
    assert!(builder.validate(&archive_path));

    let dest = temp.path().join("restored");
    let report = builder.extract(&archive_path, &dest).unwrap();
    assert_eq!(report.files_extracted, 3);
    assert!(!report.has_skipped_entries());

    for (name, content) in &originals {
        assert_eq!(fs::read(dest.join(name)).unwrap(), content.as_bytes());
    }
}

#[tokio::test]
async fn test_pooled_counts_match_sequential_counts() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("crlf.txt"), "one\r\ntwo\r\nthree").unwrap();
    fs::write(input.join("cr.txt"), "a\rb\rc\r").unwrap();
    fs::write(input.join("wide.txt"), "絵文字😀\nü\n").unwrap();
    fs::write(input.join("generated.txt"), text_content(37, 1234)).unwrap();

    let analyzer = TextFileAnalyzer::new();
    let builder = ArchiveBuilder::new();
    let files = builder.find_eligible_files(&input).unwrap();

    let sequential: Vec<_> = files
        .iter()
        .map(|path| analyzer.analyze(path, "main").unwrap())
        .collect();
    let expected = StatsAggregator::new().aggregate(sequential.clone(), Local::now());

    let pools = test_pools(3);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(3).with_delete_sources(false),
        NoOpProgressReporter::new(),
    );
    let report = orchestrator
        .run_pipeline(files, &input, &temp.path().join("out.zip"))
        .await
        .unwrap();
    pools.shutdown().await.unwrap();

    assert_eq!(report.analysis.total_line_count(), expected.total_line_count());
    assert_eq!(
        report.analysis.total_character_count(),
        expected.total_character_count()
    );
    for (pooled, single) in report.analysis.file_stats().iter().zip(&sequential) {
        assert_eq!(pooled.file_name(), single.file_name());
        assert_eq!(pooled.line_count(), single.line_count());
        assert_eq!(pooled.character_count(), single.character_count());
    }
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    write_text_files(&input, &[("only.txt", 2, 10)]);

    let pools = test_pools(2);
    let orchestrator = PipelineOrchestrator::standard(
        Arc::clone(&pools),
        &test_config(2),
        NoOpProgressReporter::new(),
    );
    let report = orchestrator
        .analyze_directory(&input, &temp.path().join("output"))
        .await
        .unwrap();
    pools.shutdown().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["analysis"]["total_line_count"], 2);
    assert_eq!(json["archive"]["archived_file_count"], 1);
    assert_eq!(json["archive"]["compression_method"], "ZIP");
}
