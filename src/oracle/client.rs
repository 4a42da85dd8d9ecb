use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::OracleError;
use super::retry::RetryPolicy;
use super::{CompletionOracle, OracleRequest};
use crate::cache::{CacheStatus, ResponseCache};
use crate::hashing::key_to_hex;

/// Response text plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleReply {
    pub text: String,
    pub cache: CacheStatus,
    /// Provider calls made for this reply (0 on a cache hit).
    pub attempts: u32,
}

/// Caching, retrying wrapper around a [`CompletionOracle`].
pub struct OracleClient {
    oracle: Arc<dyn CompletionOracle>,
    cache: Option<Arc<ResponseCache>>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for OracleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleClient")
            .field("cache", &self.cache.is_some())
            .field("retry", &self.retry)
            .finish()
    }
}

impl OracleClient {
    pub fn new(oracle: Arc<dyn CompletionOracle>, retry: RetryPolicy) -> Self {
        Self {
            oracle,
            cache: None,
            retry,
        }
    }

    /// Attaches a cache handle owned by the caller.
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Answers from cache when possible, otherwise calls the oracle under the
    /// retry policy. Empty responses are errors and are never cached.
    pub async fn complete(&self, request: &OracleRequest) -> Result<OracleReply, OracleError> {
        let key = request.cache_key();

        if let Some(cache) = &self.cache {
            let (cached, status) = cache.lookup(&key);
            if let Some(text) = cached {
                debug!(key = %key_to_hex(&key), status = %status, "Oracle cache hit");
                return Ok(OracleReply {
                    text: text.to_string(),
                    cache: status,
                    attempts: 0,
                });
            }
        }

        info!(
            model = %request.settings.model,
            prompt_len = request.prompt.len(),
            "Calling reconstruction oracle"
        );

        let oracle = Arc::clone(&self.oracle);
        let (text, attempts) = self
            .retry
            .run(|_| {
                let oracle = Arc::clone(&oracle);
                async move { oracle.complete(request).await }
            })
            .await?;

        if text.trim().is_empty() {
            warn!(model = %request.settings.model, "Oracle returned an empty response");
            return Err(OracleError::EmptyResponse);
        }

        info!(response_len = text.len(), attempts, "Oracle response received");

        if let Some(cache) = &self.cache
            && let Err(e) = cache.store(key, &request.settings.model, &text)
        {
            warn!(error = %e, "Failed to persist oracle response");
        }

        Ok(OracleReply {
            text,
            cache: CacheStatus::Miss,
            attempts,
        })
    }
}
