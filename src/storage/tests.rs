use std::collections::BTreeMap;

use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use super::*;
use crate::reconstruction::{DebugData, Reconstructed};
use crate::runner::{AggregationMode, RunSummary};
use crate::scoring::{Metrics, PairScore};

fn scored(video_id: &str) -> Reconstructed {
    let mut metrics = Metrics::new();
    metrics.push(PairScore::from_precision_recall(0.5, 1.0));
    Reconstructed::new(video_id, BTreeMap::from([(2, "The dog sits.".to_string())]))
        .with_metrics(metrics)
}

fn summary(run_name: &str) -> RunSummary {
    RunSummary {
        run_name: run_name.to_string(),
        total: 2,
        scored: 1,
        skipped: 1,
        aggregation: AggregationMode::Min,
        mean_precision: Some(0.5),
        mean_recall: Some(1.0),
        mean_f1: None,
    }
}

fn run_record(run_name: &str, artifact_path: &std::path::Path) -> RunRecord {
    RunRecord {
        run_id: Uuid::new_v4(),
        run_name: run_name.to_string(),
        batch_name: "batch".to_string(),
        strategy: serde_json::json!({"kind": "carry_forward"}),
        masking: serde_json::json!({"scheme": "random", "ratio": 0.5}),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        artifact_path: artifact_path.to_path_buf(),
        summary: summary(run_name),
    }
}

#[test]
fn test_artifact_writer_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("run.jsonl");

    let records = vec![
        scored("a"),
        Reconstructed::new("b", BTreeMap::new()).with_skip_reason("empty mask"),
        Reconstructed::failed("c", DebugData::error("duplicate indices")),
    ];

    let mut writer = ArtifactWriter::create(&path).expect("create");
    for record in &records {
        writer.write(record).expect("write");
    }
    assert_eq!(writer.written(), 3);
    assert_eq!(writer.path(), path.as_path());

    assert_eq!(read_artifacts(&path).expect("read"), records);
}

#[test]
fn test_unscored_records_omit_metrics() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("run.jsonl");

    let mut writer = ArtifactWriter::create(&path).expect("create");
    writer
        .write(&Reconstructed::new("v", BTreeMap::new()).with_skip_reason("empty mask"))
        .expect("write");
    drop(writer);

    let text = std::fs::read_to_string(&path).expect("read");
    assert!(!text.contains("metrics"));
    assert!(!text.contains("debug_data"));
    assert!(text.contains("\"skip_reason\":\"empty mask\""));
}

#[test]
fn test_create_truncates_existing_log() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("run.jsonl");

    let mut first = ArtifactWriter::create(&path).expect("create");
    first.write(&scored("old")).expect("write");
    drop(first);

    let mut second = ArtifactWriter::create(&path).expect("recreate");
    second.write(&scored("new")).expect("write");
    drop(second);

    let records = read_artifacts(&path).expect("read");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].video_id, "new");
}

#[test]
fn test_blank_lines_are_skipped() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("run.jsonl");
    std::fs::write(&path, "\n{\"video_id\":\"a\"}\n   \n{\"video_id\":\"b\"}\n").expect("write");

    let records = read_artifacts(&path).expect("read");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.reconstructed_captions.is_empty()));
}

#[test]
fn test_malformed_line_reports_line_number() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("run.jsonl");
    std::fs::write(&path, "{\"video_id\":\"a\"}\nnot json\n").expect("write");

    match read_artifacts(&path) {
        Err(StorageError::Malformed { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn test_missing_artifact_log_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let result = read_artifacts(dir.path().join("absent.jsonl"));
    assert!(matches!(result, Err(StorageError::Io { .. })));
}

#[test]
fn test_artifact_log_find_and_summary() {
    let mut changed = DebugData::default();
    changed.changed_unmasked = vec![0];

    let log = ArtifactLog::from_records(vec![
        scored("a"),
        Reconstructed::new("b", BTreeMap::new()).with_skip_reason("empty mask"),
        Reconstructed::failed("c", DebugData::error("empty parsed response"))
            .with_skip_reason("reconstruction failed: empty parsed response"),
        scored("d").with_debug(changed),
    ]);

    assert_eq!(log.records().len(), 4);
    assert!(log.find("c").is_some_and(Reconstructed::is_failed));
    assert!(log.find("zzz").is_none());

    assert_eq!(
        log.summary(),
        ArtifactSummary {
            total: 4,
            scored: 2,
            skipped: 2,
            failed: 1,
            with_debug: 2,
        }
    );
}

#[test]
fn test_run_log_appends_and_reads_back() {
    let dir = TempDir::new().expect("tempdir");
    let log = RunLog::new(dir.path().join("out").join("runs.jsonl"));

    assert!(log.read().expect("missing log").is_empty());

    let first = run_record("cf_random_r0.5_s0", &dir.path().join("a.jsonl"));
    let second = run_record("cf_random_r0.5_s1", &dir.path().join("b.jsonl"));
    log.append(&first).expect("append");
    log.append(&second).expect("append");

    let records = log.read().expect("read");
    assert_eq!(records, vec![first, second]);
    assert_ne!(records[0].run_id, records[1].run_id);
}

#[test]
fn test_artifact_file_name_sanitizes() {
    assert_eq!(artifact_file_name("llm_a/b:c"), "llm_a_b_c.jsonl");
    assert_eq!(
        artifact_file_name("carry_forward_random_r0.5_s3"),
        "carry_forward_random_r0.5_s3.jsonl"
    );
    assert_eq!(artifact_file_name("llm gpt-4o"), "llm_gpt-4o.jsonl");
}
