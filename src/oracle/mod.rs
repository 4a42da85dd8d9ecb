//! Reconstruction oracle boundary.
//!
//! The oracle is an external text generator (an LLM provider) treated as a
//! black box. This module owns only what wraps it: the request shape, the
//! error classification, the retry policy, and the caching client.

pub mod client;
pub mod error;
pub mod genai;
pub mod retry;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use client::{OracleClient, OracleReply};
pub use error::OracleError;
pub use genai::GenaiOracle;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockOracle;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::hashing::hash_fields;

/// Hint for the provider's output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Text => "text",
        }
    }
}

/// Fixed generation configuration of one oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Model identity (provider model name).
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl OracleSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            seed: None,
            response_format: ResponseFormat::Json,
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

/// One prompt sent under a fixed configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleRequest {
    pub settings: OracleSettings,
    pub prompt: String,
}

impl OracleRequest {
    pub fn new(settings: OracleSettings, prompt: impl Into<String>) -> Self {
        Self {
            settings,
            prompt: prompt.into(),
        }
    }

    /// Deterministic cache key over model, generation parameters, and prompt.
    pub fn cache_key(&self) -> [u8; 32] {
        let temperature = self.settings.temperature.to_bits().to_le_bytes();
        let seed = match self.settings.seed {
            Some(seed) => seed.to_string(),
            None => String::from("none"),
        };
        hash_fields(&[
            self.settings.model.as_bytes(),
            &temperature,
            seed.as_bytes(),
            self.settings.response_format.as_str().as_bytes(),
            self.prompt.as_bytes(),
        ])
    }
}

/// An external text generator.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    /// Sends one request and returns the raw response text.
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError>;
}
