use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::cache::ResponseCache;
use crate::masking::{ContiguousMasking, PartitionMasking, RandomMasking};
use crate::oracle::{MockOracle, OracleClient, RetryPolicy};
use crate::reconstruction::{DebugData, ReconstructionSpec};
use crate::scoring::{Metrics, TokenOverlapScorer};
use crate::storage::read_artifacts;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn metrics_with_f1(f1: &[f64]) -> Metrics {
    Metrics {
        precision: f1.to_vec(),
        recall: f1.to_vec(),
        f1: f1.to_vec(),
    }
}

fn runner(mode: AggregationMode) -> ExperimentRunner {
    ExperimentRunner::new(Evaluator::new(Arc::new(TokenOverlapScorer::new())), mode)
}

fn carry_forward() -> ReconstructionStrategy {
    ReconstructionSpec::CarryForward { name: None }
        .build(None)
        .expect("carry forward")
}

fn llm(response: &str) -> ReconstructionStrategy {
    let mock = Arc::new(MockOracle::new().with_response(response));
    let client = Arc::new(
        OracleClient::new(mock, RetryPolicy::immediate(1))
            .with_cache(Arc::new(ResponseCache::in_memory(8))),
    );
    let spec: ReconstructionSpec =
        serde_json::from_str(r#"{"kind":"llm","model":"m"}"#).expect("spec");
    spec.build(Some(&client)).expect("llm")
}

fn partition(p: usize, start: usize, k: usize) -> MaskingStrategy {
    MaskingStrategy::Partition(PartitionMasking::new(p, start, k).expect("partition"))
}

fn video() -> Video {
    Video::from_captions(
        "v1",
        [Some("a person walks in"), Some("a person walks in"), Some("a red book"), Some("the end")],
    )
}

#[test]
fn test_min_aggregation_matches_reference_example() {
    let mut aggregator = Aggregator::new(AggregationMode::Min);
    aggregator.add(&metrics_with_f1(&[0.9, 0.8]));
    aggregator.add(&metrics_with_f1(&[0.95]));

    assert_eq!(aggregator.videos(), 2);
    assert!(approx(aggregator.mean_f1().expect("mean"), 0.875));
}

#[test]
fn test_mean_aggregation() {
    let mut aggregator = Aggregator::new(AggregationMode::Mean);
    aggregator.add(&metrics_with_f1(&[0.9, 0.8]));
    aggregator.add(&metrics_with_f1(&[0.95]));

    assert!(approx(aggregator.mean_f1().expect("mean"), (0.85 + 0.95) / 2.0));
}

#[test]
fn test_aggregator_ignores_empty_metrics() {
    let mut aggregator = Aggregator::new(AggregationMode::Min);
    aggregator.add(&Metrics::new());

    assert_eq!(aggregator.videos(), 0);
    assert_eq!(aggregator.mean_f1(), None);
}

#[test]
fn test_aggregation_mode_defaults_to_min() {
    assert_eq!(AggregationMode::default(), AggregationMode::Min);
    let mode: AggregationMode = serde_json::from_str("\"mean\"").expect("mode");
    assert_eq!(mode, AggregationMode::Mean);
}

#[tokio::test]
async fn test_process_video_scores_masked_positions() {
    let outcome = runner(AggregationMode::Min)
        .process_video(&video(), &partition(2, 0, 1), &carry_forward())
        .await
        .expect("process");

    // Leading clips 0 and 1 are back-filled with "a red book".
    assert_eq!(outcome.record.indices().len(), 2);
    let metrics = outcome.raw_metrics.expect("scored");
    assert_eq!(metrics.len(), 2);
    assert!(outcome.record.metrics.is_some());
    assert!(outcome.record.skip_reason.is_none());
}

#[tokio::test]
async fn test_process_video_skips_empty_mask() {
    let masking = MaskingStrategy::Random(RandomMasking::new(0.0, 1).expect("random"));
    let outcome = runner(AggregationMode::Min)
        .process_video(&video(), &masking, &carry_forward())
        .await
        .expect("process");

    assert_eq!(outcome.record.skip_reason.as_deref(), Some("empty mask"));
    assert!(!outcome.is_scored());
}

#[tokio::test]
async fn test_process_video_skips_inapplicable_mask() {
    let masking = MaskingStrategy::Contiguous(ContiguousMasking::new(10, 1));
    let outcome = runner(AggregationMode::Min)
        .process_video(&video(), &masking, &carry_forward())
        .await
        .expect("process");

    assert_eq!(outcome.record.skip_reason.as_deref(), Some("masking not applicable"));
}

#[tokio::test]
async fn test_process_video_skips_fully_masked_carry_forward() {
    let masking = MaskingStrategy::Random(RandomMasking::new(1.0, 1).expect("random"));
    let outcome = runner(AggregationMode::Min)
        .process_video(&video(), &masking, &carry_forward())
        .await
        .expect("process");

    assert_eq!(outcome.record.skip_reason.as_deref(), Some("empty reconstruction"));
}

#[tokio::test]
async fn test_process_video_skips_failed_reconstruction() {
    let outcome = runner(AggregationMode::Min)
        .process_video(&video(), &partition(2, 1, 1), &llm("not json at all"))
        .await
        .expect("process");

    let reason = outcome.record.skip_reason.as_deref().expect("skip reason");
    assert!(reason.starts_with("reconstruction failed: parse error"));
    assert!(outcome.record.debug_data.is_some());
}

#[tokio::test]
async fn test_process_video_scores_partial_llm_result() {
    let outcome = runner(AggregationMode::Min)
        .process_video(
            &video(),
            &partition(2, 1, 1),
            &llm(r#"[{"index":2,"caption":"a red book"}]"#),
        )
        .await
        .expect("process");

    let metrics = outcome.raw_metrics.expect("scored");
    assert_eq!(metrics.f1, vec![1.0, 0.0]);
    assert_eq!(outcome.record.debug_data.expect("debug").failed, vec![3]);
}

fn gappy() -> Video {
    Video::from_captions("gappy", [Some("a red book"), None, Some("a red book"), Some("the end")])
}

#[tokio::test]
async fn test_missing_ground_truth_caption_is_not_fatal() {
    // Clip 1 has no ground truth; only the masked clip 0 is reconstructed.
    let outcome = runner(AggregationMode::Min)
        .process_video(&gappy(), &partition(4, 0, 1), &carry_forward())
        .await
        .expect("process");

    assert_eq!(outcome.record.indices(), BTreeSet::from([0]));
    assert_eq!(outcome.raw_metrics.expect("scored").f1, vec![1.0]);
}

#[tokio::test]
async fn test_llm_answer_for_missing_ground_truth_is_ignored() {
    let response = r#"[{"index":0,"caption":"a red book"},{"index":1,"caption":"guess"},
        {"index":2,"caption":"a red book"},{"index":3,"caption":"the end"}]"#;
    let outcome = runner(AggregationMode::Min)
        .process_video(&gappy(), &partition(4, 0, 1), &llm(response))
        .await
        .expect("process");

    assert_eq!(outcome.record.indices(), BTreeSet::from([0]));
    assert!(outcome.record.debug_data.is_none());
    assert!(outcome.is_scored());
}

#[tokio::test]
async fn test_masking_only_missing_ground_truth_has_nothing_to_score() {
    let outcome = runner(AggregationMode::Min)
        .process_video(&gappy(), &partition(4, 1, 1), &carry_forward())
        .await
        .expect("process");

    assert_eq!(outcome.record.skip_reason.as_deref(), Some("nothing to score"));
    assert!(!outcome.is_scored());
}

#[test]
fn test_silent_mask_mismatch_is_fatal() {
    let captions = BTreeMap::from([(0, "a".to_string()), (3, "d".to_string())]);
    let result = Reconstructed::new("v", captions);

    match check_indices("v", &result, &BTreeSet::from([0, 1])).unwrap_err() {
        RunnerError::MaskMismatch {
            video_id,
            expected,
            found,
        } => {
            assert_eq!(video_id, "v");
            assert_eq!(expected, vec![0, 1]);
            assert_eq!(found, vec![0, 3]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_mask_mismatch_with_debug_is_not_fatal() {
    let result = Reconstructed::new("v", BTreeMap::from([(0, "a".to_string())]))
        .with_debug(DebugData::default().with_response("raw"));

    assert!(!check_indices("v", &result, &BTreeSet::from([0, 1])).expect("check"));
    assert!(check_indices("v", &result, &BTreeSet::from([0])).expect("check"));
}

#[tokio::test]
async fn test_run_writes_one_record_per_video_and_summarizes() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("run.jsonl");
    let mut writer = ArtifactWriter::create(&path).expect("writer");

    let short = Video::from_captions("short", [Some("only clip")]);
    let videos = vec![video(), short];

    let summary = runner(AggregationMode::Min)
        .run("carry_forward_partition_p2_k1_s0", &videos, &partition(2, 0, 1), &carry_forward(), &mut writer)
        .await
        .expect("run");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.scored, 1);
    assert_eq!(summary.skipped, 1);
    assert!(summary.mean_f1.is_some());

    let records = read_artifacts(&path).expect("read");
    assert_eq!(records.len(), 2);
    assert!(records[0].metrics.is_some());
    assert!(records[1].skip_reason.is_some());
    assert!(records[1].metrics.is_none());
}

#[test]
fn test_summary_display_handles_missing_means() {
    let summary = RunSummary {
        run_name: "r".into(),
        total: 1,
        scored: 0,
        skipped: 1,
        aggregation: AggregationMode::Min,
        mean_precision: None,
        mean_recall: None,
        mean_f1: None,
    };
    let text = summary.to_string();
    assert!(text.contains("scored 0/1"));
    assert!(text.contains("n/a"));
}
