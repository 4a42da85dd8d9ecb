//! End-to-end batch runs over the public API, with a mocked oracle.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::fixtures::{
    DATASET_JSON, FILLER_CAPTION, GAPPY_DATASET_JSON, filling_oracle, forgetful_oracle,
    throttled_oracle, write_file,
};
use recon::{
    ArtifactLog, Batch, BatchSpec, CompletionOracle, EvaluationSpec, OracleClient, ResponseCache,
    RetryPolicy, Video, build_evaluator, load_videos, read_artifacts, toy_video,
};
use tempfile::TempDir;

fn spec(json: &str) -> BatchSpec {
    let spec = BatchSpec::from_json(json, std::path::Path::new("batch.json")).expect("spec");
    spec.validate().expect("valid spec");
    spec
}

fn batch(
    spec: BatchSpec,
    output: &std::path::Path,
    videos: &[Video],
    client: Option<Arc<OracleClient>>,
) -> Batch {
    let evaluator = build_evaluator(&spec.evaluation, videos, 6).expect("evaluator");
    Batch::new(spec, output, evaluator, client).expect("batch")
}

fn client(oracle: Arc<dyn CompletionOracle>, cache: Option<Arc<ResponseCache>>) -> Arc<OracleClient> {
    let client = OracleClient::new(oracle, RetryPolicy::immediate(2));
    Arc::new(match cache {
        Some(cache) => client.with_cache(cache),
        None => client,
    })
}

fn dataset(dir: &TempDir) -> Vec<Video> {
    let path = write_file(dir.path(), "videos.json", DATASET_JSON);
    load_videos(&path, None).expect("dataset")
}

const LLM_SWEEP: &str = r#"{
    "batch_name": "kitchen-park",
    "master_seed": 3,
    "masking": [
        {"scheme": "random", "seeds": [1, 2], "ratios": 0.5},
        {"scheme": "contiguous", "seeds": 0, "widths": 3}
    ],
    "strategies": [{"kind": "llm", "model": "mock-model"}],
    "evaluation": {"idf": true}
}"#;

#[tokio::test]
async fn test_partition_sweep_covers_every_toy_clip_once() {
    let dir = TempDir::new().expect("tempdir");
    let videos = vec![toy_video()];
    let spec = spec(
        r#"{"batch_name": "toy",
            "masking": [{"scheme": "partition", "num_partitions": 5, "num_parts_to_mask": 1}],
            "strategies": [{"kind": "carry_forward"}]}"#,
    );

    let batch = batch(spec, dir.path(), &videos, None);
    let report = batch.run(&videos).await.expect("run");
    assert_eq!(report.runs.len(), 5);

    let mut seen = BTreeSet::new();
    for record in batch.run_log().read().expect("run log") {
        for artifact in read_artifacts(&record.artifact_path).expect("artifacts") {
            for index in artifact.reconstructed_captions.keys() {
                assert!(seen.insert(*index), "index {index} masked twice");
            }
        }
    }
    assert_eq!(seen, (0..10).collect::<BTreeSet<_>>());
}

#[tokio::test]
async fn test_llm_sweep_over_dataset() {
    let dir = TempDir::new().expect("tempdir");
    let videos = dataset(&dir);
    assert_eq!(videos.len(), 2);

    let oracle = filling_oracle();
    let cache = Arc::new(ResponseCache::in_memory(64));
    let batch = batch(
        spec(LLM_SWEEP),
        &dir.path().join("out"),
        &videos,
        Some(client(oracle.clone(), Some(cache))),
    );

    let report = batch.run(&videos).await.expect("run");
    let names: Vec<&str> = report.runs.iter().map(|r| r.run_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "llm_mock-model_random_r0.5_s1",
            "llm_mock-model_random_r0.5_s2",
            "llm_mock-model_contiguous_w3_s0",
        ]
    );

    for run in &report.runs[..2] {
        assert_eq!((run.total, run.scored, run.skipped), (2, 2, 0));
        assert!(run.mean_f1.is_some_and(|f1| (0.0..=1.0).contains(&f1)));
    }

    // The park video has only three clips, too short for a width-3 block.
    let contiguous = &report.runs[2];
    assert_eq!((contiguous.total, contiguous.scored, contiguous.skipped), (2, 1, 1));

    let records = batch.run_log().read().expect("run log");
    let log = ArtifactLog::load(&records[2].artifact_path).expect("artifact log");
    let park = log.find("park").expect("park record");
    assert_eq!(park.skip_reason.as_deref(), Some("masking not applicable"));
    assert!(park.reconstructed_captions.is_empty());

    let kitchen = log.find("kitchen").expect("kitchen record");
    assert_eq!(kitchen.reconstructed_captions.len(), 3);
    assert!(kitchen.reconstructed_captions.values().all(|c| c == FILLER_CAPTION));
    assert!(kitchen.is_scored());

    let stats = report.cache.expect("cache stats");
    assert_eq!(stats.misses as usize, oracle.call_count());
}

#[tokio::test]
async fn test_second_batch_is_served_from_disk_cache() {
    let dir = TempDir::new().expect("tempdir");
    let videos = dataset(&dir);
    let cache_dir = dir.path().join("cache");

    let first_oracle = filling_oracle();
    let first_cache = Arc::new(ResponseCache::open(cache_dir.clone(), 64).expect("cache"));
    let first = batch(
        spec(LLM_SWEEP),
        &dir.path().join("first"),
        &videos,
        Some(client(first_oracle.clone(), Some(first_cache))),
    );
    let first_report = first.run(&videos).await.expect("first run");
    let first_stats = first_report.cache.expect("stats");
    assert!(first_oracle.call_count() > 0);
    assert_eq!(first_stats.stores, first_stats.misses);

    // Fresh process state: new memory tier, same directory.
    let second_oracle = filling_oracle();
    let second_cache = Arc::new(ResponseCache::open(cache_dir, 64).expect("cache"));
    let second = batch(
        spec(LLM_SWEEP),
        &dir.path().join("second"),
        &videos,
        Some(client(second_oracle.clone(), Some(second_cache))),
    );
    let second_report = second.run(&videos).await.expect("second run");
    let second_stats = second_report.cache.expect("stats");

    assert_eq!(second_oracle.call_count(), 0);
    assert_eq!(second_stats.misses, 0);
    assert_eq!(second_stats.disk_hits, first_stats.misses);

    let means = |report: &recon::BatchReport| {
        report.runs.iter().map(|r| r.mean_f1).collect::<Vec<_>>()
    };
    assert_eq!(means(&first_report), means(&second_report));
}

#[tokio::test]
async fn test_missing_clip_in_response_is_recorded_and_scored() {
    let dir = TempDir::new().expect("tempdir");
    let videos = dataset(&dir);
    let spec = spec(
        r#"{"batch_name": "forgetful",
            "masking": [{"scheme": "partition", "num_partitions": 2, "num_parts_to_mask": 1}],
            "strategies": [{"kind": "llm", "model": "mock-model"}]}"#,
    );

    let batch = batch(spec, dir.path(), &videos, Some(client(forgetful_oracle(), None)));
    let report = batch.run(&videos).await.expect("run");
    assert_eq!(report.runs[0].scored, 2);

    let records = batch.run_log().read().expect("run log");
    let log = ArtifactLog::load(&records[0].artifact_path).expect("artifact log");
    let kitchen = log.find("kitchen").expect("kitchen record");

    let debug = kitchen.debug_data.as_ref().expect("debug data");
    assert_eq!(debug.failed, vec![0]);
    assert!(debug.error.is_none());
    assert!(debug.response.is_some());
    assert_eq!(kitchen.reconstructed_captions.get(&0).map(String::as_str), Some(""));
    assert_eq!(
        kitchen.reconstructed_captions.get(&1).map(String::as_str),
        Some(FILLER_CAPTION)
    );

    let summary = log.summary();
    assert_eq!(summary.with_debug, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_exhausted_retries_skip_the_video() {
    let dir = TempDir::new().expect("tempdir");
    let videos = vec![toy_video()];
    let spec = spec(
        r#"{"batch_name": "throttled",
            "masking": [{"scheme": "random", "ratios": 0.3}],
            "strategies": [{"kind": "llm", "model": "mock-model"}]}"#,
    );

    let oracle = throttled_oracle();
    let batch = batch(spec, dir.path(), &videos, Some(client(oracle.clone(), None)));
    let report = batch.run(&videos).await.expect("run");

    assert_eq!(oracle.call_count(), 2);
    let run = &report.runs[0];
    assert_eq!((run.scored, run.skipped), (0, 1));
    assert!(run.mean_f1.is_none());

    let records = batch.run_log().read().expect("run log");
    let artifacts = read_artifacts(&records[0].artifact_path).expect("artifacts");
    let reason = artifacts[0].skip_reason.as_deref().expect("skip reason");
    assert!(reason.starts_with("reconstruction failed: gave up after 2 attempts"));
    assert!(artifacts[0].is_failed());
}

#[tokio::test]
async fn test_default_evaluation_without_idf() {
    let dir = TempDir::new().expect("tempdir");
    let videos = vec![toy_video()];
    let evaluation = EvaluationSpec::default();
    assert!(!evaluation.idf);

    let spec = spec(
        r#"{"batch_name": "cf",
            "masking": [{"scheme": "contiguous", "seeds": [0, 1], "widths": [2, 10]}],
            "strategies": [{"kind": "carry_forward"}]}"#,
    );
    let batch = batch(spec, dir.path(), &videos, None);
    let report = batch.run(&videos).await.expect("run");

    // Width 10 never fits a 10-clip video.
    let skipped: Vec<usize> = report.runs.iter().map(|r| r.skipped).collect();
    assert_eq!(skipped, vec![0, 1, 0, 1]);
    assert!(report.to_string().contains("cf"));
}

#[tokio::test]
async fn test_missing_ground_truth_caption_does_not_abort_batch() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "gappy.json", GAPPY_DATASET_JSON);
    let videos = load_videos(&path, None).expect("dataset");
    assert_eq!(videos[0].masked_indices().into_iter().collect::<Vec<_>>(), vec![1]);

    let spec = spec(
        r#"{"batch_name": "gappy",
            "masking": [{"scheme": "partition", "num_partitions": 4, "num_parts_to_mask": 1}],
            "strategies": [{"kind": "carry_forward"}, {"kind": "llm", "model": "mock-model"}]}"#,
    );
    let batch = batch(spec, dir.path(), &videos, Some(client(filling_oracle(), None)));
    let report = batch.run(&videos).await.expect("run");

    assert_eq!(report.runs.len(), 8);
    assert!(report.runs.iter().all(|run| run.total == 2));

    for record in batch.run_log().read().expect("run log") {
        let log = ArtifactLog::load(&record.artifact_path).expect("artifact log");
        assert_eq!(log.records().len(), 2);

        let gap = log.find("gap").expect("gap record");
        assert!(!gap.reconstructed_captions.contains_key(&1) || gap.skip_reason.is_some());
        if record.run_name.ends_with("_s1") {
            // Only the caption-less clip was masked.
            assert_eq!(gap.skip_reason.as_deref(), Some("nothing to score"));
        } else {
            assert_eq!(gap.reconstructed_captions.len(), 1);
            assert!(gap.is_scored());
        }
    }
}
