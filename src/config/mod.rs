//! Environment-backed configuration and the batch spec file.
//!
//! Paths and runtime knobs have defaults; override with `RECON_*`
//! environment variables. The experiment itself is described by a JSON
//! [`BatchSpec`] read from `RECON_BATCH_PATH`.

pub mod batch;
pub mod error;


pub use batch::{BatchSpec, EvaluationSpec};
pub use error::ConfigError;

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_BATCH_PATH, DEFAULT_CACHE_DIR, DEFAULT_L1_CAPACITY, DEFAULT_LOCK_PATH,
    DEFAULT_OUTPUT_DIR, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_ROUND_DIGITS,
};

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RECON_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Batch spec file. Default: `./batch.json`.
    pub batch_path: PathBuf,

    /// JSON dataset; `None` runs on the built-in toy video.
    pub dataset_path: Option<PathBuf>,

    /// Artifact and run-log directory. Default: `./runs`.
    pub output_dir: PathBuf,

    /// Persistent oracle cache. Default: `./.cache/oracle`.
    pub cache_dir: PathBuf,

    /// Batch lock file. Default: `./recon.lock`.
    pub lock_path: PathBuf,

    /// Max entries in the in-memory response cache. Default: `10_000`.
    pub l1_capacity: u64,

    /// Oracle attempts per request, including the first. Default: `6`.
    pub max_attempts: u32,

    /// Decimal places kept in persisted metrics. Default: `6`.
    pub round_digits: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_path: PathBuf::from(DEFAULT_BATCH_PATH),
            dataset_path: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
            l1_capacity: DEFAULT_L1_CAPACITY,
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            round_digits: DEFAULT_ROUND_DIGITS,
        }
    }
}

impl Config {
    const ENV_BATCH_PATH: &'static str = "RECON_BATCH_PATH";
    const ENV_DATASET_PATH: &'static str = "RECON_DATASET_PATH";
    const ENV_OUTPUT_DIR: &'static str = "RECON_OUTPUT_DIR";
    const ENV_CACHE_DIR: &'static str = "RECON_CACHE_DIR";
    const ENV_LOCK_PATH: &'static str = "RECON_LOCK_PATH";
    const ENV_L1_CAPACITY: &'static str = "RECON_L1_CAPACITY";
    const ENV_MAX_ATTEMPTS: &'static str = "RECON_MAX_ATTEMPTS";
    const ENV_ROUND_DIGITS: &'static str = "RECON_ROUND_DIGITS";

    /// Max decimal places accepted for `RECON_ROUND_DIGITS`.
    pub const MAX_ROUND_DIGITS: u32 = 15;

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            batch_path: Self::parse_path_from_env(Self::ENV_BATCH_PATH, defaults.batch_path),
            dataset_path: Self::parse_optional_path_from_env(Self::ENV_DATASET_PATH),
            output_dir: Self::parse_path_from_env(Self::ENV_OUTPUT_DIR, defaults.output_dir),
            cache_dir: Self::parse_path_from_env(Self::ENV_CACHE_DIR, defaults.cache_dir),
            lock_path: Self::parse_path_from_env(Self::ENV_LOCK_PATH, defaults.lock_path),
            l1_capacity: Self::parse_number_from_env(Self::ENV_L1_CAPACITY, defaults.l1_capacity)?,
            max_attempts: Self::parse_number_from_env(
                Self::ENV_MAX_ATTEMPTS,
                defaults.max_attempts,
            )?,
            round_digits: Self::parse_number_from_env(
                Self::ENV_ROUND_DIGITS,
                defaults.round_digits,
            )?,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_file(&self.batch_path)?;
        if let Some(path) = &self.dataset_path {
            Self::require_file(path)?;
        }

        for dir in [&self.output_dir, &self.cache_dir] {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_ATTEMPTS,
                value: self.max_attempts.to_string(),
                reason: "must be at least 1",
            });
        }
        if self.round_digits > Self::MAX_ROUND_DIGITS {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_ROUND_DIGITS,
                value: self.round_digits.to_string(),
                reason: "must be at most 15",
            });
        }

        Ok(())
    }

    /// Path of the batch-level run log.
    pub fn run_log_path(&self) -> PathBuf {
        self.output_dir.join(crate::constants::RUN_LOG_FILE)
    }

    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr<Err = std::num::ParseIntError>,
    {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|source| ConfigError::InvalidNumber {
                name: var_name,
                value,
                source,
            }),
            Err(_) => Ok(default),
        }
    }
}
