//! Production oracle backed by the `genai` multi-provider client.
//!
//! The provider is picked by `genai` from the model name; API keys come from
//! the provider's usual environment variables (e.g. `GEMINI_API_KEY`).

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatResponseFormat};

use super::error::OracleError;
use super::{CompletionOracle, OracleRequest, ResponseFormat};

#[derive(Clone, Default)]
pub struct GenaiOracle {
    client: Client,
}

impl GenaiOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for GenaiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiOracle").finish()
    }
}

#[async_trait]
impl CompletionOracle for GenaiOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let chat_req = ChatRequest::new(vec![ChatMessage::user(request.prompt.clone())]);

        let mut options = ChatOptions::default().with_temperature(request.settings.temperature);
        if request.settings.response_format == ResponseFormat::Json {
            options = options.with_response_format(ChatResponseFormat::JsonMode);
        }

        let response = self
            .client
            .exec_chat(&request.settings.model, chat_req, Some(&options))
            .await
            .map_err(|e| OracleError::classify(&e.to_string()))?;

        Ok(response.first_text().unwrap_or_default().to_string())
    }
}
