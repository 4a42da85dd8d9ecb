//! Scripted oracle for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::OracleError;
use super::{CompletionOracle, OracleRequest};

type Responder = Box<dyn Fn(&OracleRequest) -> Result<String, OracleError> + Send + Sync>;

/// Replays queued results in order, then falls back to a responder function.
#[derive(Default)]
pub struct MockOracle {
    script: Mutex<VecDeque<Result<String, OracleError>>>,
    responder: Option<Responder>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle that answers every request with `f(request)`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&OracleRequest) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(f)),
            ..Self::default()
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Ok(text.into()));
        self
    }

    pub fn with_error(self, error: OracleError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl std::fmt::Debug for MockOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockOracle")
            .field("queued", &self.script.lock().len())
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl CompletionOracle for MockOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.prompt.clone());

        if let Some(next) = self.script.lock().pop_front() {
            return next;
        }
        match &self.responder {
            Some(responder) => responder(request),
            None => Err(OracleError::Permanent("mock oracle script exhausted".into())),
        }
    }
}
