//! OpenAI-compatible [`LlmClient`]: wraps openai-client with a model name and sampling params.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::CompletionParams;
use prompt::ChatMessage;
use tracing::instrument;

use super::{chat_message_to_openai, LlmClient, LlmSettings};

#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
    params: CompletionParams,
}

impl OpenAILlmClient {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            model: "deepseek-chat".to_string(),
            params: CompletionParams::default(),
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self::with_base_url(settings.api_key.clone(), settings.base_url.clone())
            .with_model(settings.model.clone())
            .with_params(settings.params)
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn get_llm_response_with_messages(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>>>()?;
        self.client
            .chat_completion(&self.model, openai_messages, self.params)
            .await
    }
}
