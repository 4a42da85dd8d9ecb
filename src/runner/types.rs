use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reconstruction::Reconstructed;
use crate::scoring::Metrics;

/// How a video's per-clip scores collapse to one number before averaging
/// across videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Worst clip per video.
    #[default]
    Min,
    /// Mean over clips per video.
    Mean,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMode::Min => "min",
            AggregationMode::Mean => "mean",
        }
    }

    /// `None` for an empty list.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            AggregationMode::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregationMode::Mean => mean(values),
        })
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Batch-level means over scored videos.
#[derive(Debug, Clone)]
pub struct Aggregator {
    mode: AggregationMode,
    precision: Vec<f64>,
    recall: Vec<f64>,
    f1: Vec<f64>,
}

impl Aggregator {
    pub fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            precision: Vec::new(),
            recall: Vec::new(),
            f1: Vec::new(),
        }
    }

    /// Adds one video's raw metrics. Empty metrics are ignored.
    pub fn add(&mut self, metrics: &Metrics) {
        if let (Some(p), Some(r), Some(f)) = (
            self.mode.reduce(&metrics.precision),
            self.mode.reduce(&metrics.recall),
            self.mode.reduce(&metrics.f1),
        ) {
            self.precision.push(p);
            self.recall.push(r);
            self.f1.push(f);
        }
    }

    pub fn videos(&self) -> usize {
        self.f1.len()
    }

    pub fn mean_precision(&self) -> Option<f64> {
        (!self.precision.is_empty()).then(|| mean(&self.precision))
    }

    pub fn mean_recall(&self) -> Option<f64> {
        (!self.recall.is_empty()).then(|| mean(&self.recall))
    }

    pub fn mean_f1(&self) -> Option<f64> {
        (!self.f1.is_empty()).then(|| mean(&self.f1))
    }
}

/// Outcome of one (strategy x masking) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_name: String,
    pub total: usize,
    pub scored: usize,
    pub skipped: usize,
    pub aggregation: AggregationMode,
    pub mean_precision: Option<f64>,
    pub mean_recall: Option<f64>,
    pub mean_f1: Option<f64>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| String::from("n/a"), |v| format!("{v:.4}"));
        write!(
            f,
            "{}: scored {}/{} (skipped {}), {} F1 {}, P {}, R {}",
            self.run_name,
            self.scored,
            self.total,
            self.skipped,
            self.aggregation,
            show(self.mean_f1),
            show(self.mean_precision),
            show(self.mean_recall),
        )
    }
}

/// One processed video: the record to persist plus the raw (unrounded)
/// metrics used for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoOutcome {
    pub record: Reconstructed,
    pub raw_metrics: Option<Metrics>,
}

impl VideoOutcome {
    pub fn skipped(record: Reconstructed, reason: impl Into<String>) -> Self {
        Self {
            record: record.with_skip_reason(reason),
            raw_metrics: None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.raw_metrics.is_some()
    }
}
