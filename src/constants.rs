//! Cross-cutting, shared constants.
//!
//! Defaults here are the values used when neither the environment nor the
//! batch file overrides them.

pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 6;
pub const DEFAULT_RETRY_BASE_DELAY_SECS: u64 = 5;
pub const DEFAULT_RETRY_MAX_DELAY_SECS: u64 = 120;

/// Decimal places kept in stored per-clip metrics.
pub const DEFAULT_ROUND_DIGITS: u32 = 6;

pub const DEFAULT_L1_CAPACITY: u64 = 10_000;

pub const DEFAULT_BATCH_PATH: &str = "./batch.json";
pub const DEFAULT_OUTPUT_DIR: &str = "./runs";
pub const DEFAULT_CACHE_DIR: &str = "./.cache/oracle";
pub const DEFAULT_LOCK_PATH: &str = "./recon.lock";

/// File name of the batch-level run log inside the output directory.
pub const RUN_LOG_FILE: &str = "runs.jsonl";

/// Separator between the instruction text and the serialized clip sequence.
pub const PROMPT_SEPARATOR: &str = "\n\n---\n\n";

/// Placeholder substituted for masked captions in prompts.
pub const MISSING_PLACEHOLDER: &str = "{MISSING}";

pub const DEFAULT_INSTRUCTION: &str = "The following is a time-ordered sequence of captions \
describing consecutive clips of one video. Some captions are missing and shown as null. \
Fill in every missing caption so the sequence reads as a coherent description of the video. \
Return the complete sequence in the same format and order, one entry per clip, keeping every \
index, start, and duration unchanged and copying the captions that were given verbatim.";
