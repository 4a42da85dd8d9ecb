//! `recon` batch entrypoint.
//!
//! Reads `RECON_*` configuration, takes the batch lock, runs every
//! (strategy x masking) pair of the batch spec, and prints a summary.
//! `recon --inspect <artifacts.jsonl>` summarizes an existing artifact log.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;

use recon::batch::{Batch, BatchLock, build_evaluator};
use recon::cache::ResponseCache;
use recon::config::{BatchSpec, Config};
use recon::dataset::{load_videos, toy_video};
use recon::oracle::{GenaiOracle, OracleClient, RetryPolicy};
use recon::storage::ArtifactLog;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if let Some(position) = args.iter().position(|arg| arg == "--inspect") {
        let path = args
            .get(position + 1)
            .map(PathBuf::from)
            .context("--inspect needs an artifact path")?;
        return inspect(path);
    }

    let config = Config::from_env()?;
    config.validate()?;

    let spec = BatchSpec::load(&config.batch_path)?;
    tracing::info!(
        batch = %spec.batch_name,
        batch_path = %config.batch_path.display(),
        output_dir = %config.output_dir.display(),
        "Recon starting"
    );

    let _lock = BatchLock::acquire(&config.lock_path)?;

    let videos = match &config.dataset_path {
        Some(path) => load_videos(path, spec.limit)?,
        None => {
            tracing::warn!("No RECON_DATASET_PATH configured, running on the toy video");
            vec![toy_video()]
        }
    };

    let client = if spec.needs_oracle() {
        let cache = Arc::new(ResponseCache::open(
            config.cache_dir.clone(),
            config.l1_capacity,
        )?);
        let retry = RetryPolicy::default().with_max_attempts(config.max_attempts);
        let client = OracleClient::new(Arc::new(GenaiOracle::new()), retry).with_cache(cache);
        Some(Arc::new(client))
    } else {
        None
    };

    let evaluator = build_evaluator(&spec.evaluation, &videos, config.round_digits)?;
    let batch = Batch::new(spec, config.output_dir.clone(), evaluator, client)?;
    let report = batch.run(&videos).await?;

    println!("{report}");
    tracing::info!(run_log = %config.run_log_path().display(), "Recon finished");
    Ok(())
}

fn inspect(path: PathBuf) -> anyhow::Result<()> {
    let log = ArtifactLog::load(&path)
        .with_context(|| format!("failed to read artifacts from {}", path.display()))?;
    let summary = log.summary();

    println!(
        "{}: {} records, {} scored, {} skipped, {} failed, {} with debug data",
        path.display(),
        summary.total,
        summary.scored,
        summary.skipped,
        summary.failed,
        summary.with_debug
    );
    for record in log.records() {
        if let Some(reason) = &record.skip_reason {
            println!("  {}: skipped ({reason})", record.video_id);
        }
    }
    Ok(())
}
